// src/env/mod.rs

//! The accessor bundle a lifecycle invocation hands to the bridge.
//!
//! An [`Environment`] is built once per invocation by [`EnvironmentBuilder`]
//! and owns everything the bridge and the workflow runner need: storage
//! handles, the plugin manager, the host's logger sink and the tenant's
//! working directory. Nothing here is cached process-wide.

pub mod csar;
pub mod storage;
pub mod workdir;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::PathsSection;
use crate::errors::{BridgeError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::model::Service;
use crate::sink::CtxLogger;

pub use csar::CsarSource;
pub use storage::{DirectoryResourceStorage, ModelStorage, PluginManager, ResourceStorage};
pub use workdir::Workdir;

/// Identity of the host node instance being driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    pub tenant: String,
    pub deployment_id: String,
    pub blueprint_id: String,
}

impl HostContext {
    pub fn new(
        tenant: impl Into<String>,
        deployment_id: impl Into<String>,
        blueprint_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            deployment_id: deployment_id.into(),
            blueprint_id: blueprint_id.into(),
        }
    }
}

#[derive(Debug)]
pub struct Environment {
    host: HostContext,
    paths: PathsSection,
    workdir: Workdir,
    fs: Arc<dyn FileSystem>,
    model_storage: Arc<dyn ModelStorage>,
    resource_storage: Arc<dyn ResourceStorage>,
    plugin_manager: Arc<dyn PluginManager>,
    ctx_logger: Arc<dyn CtxLogger>,
}

impl Environment {
    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn workdir(&self) -> &Workdir {
        &self.workdir
    }

    pub fn model_storage(&self) -> &Arc<dyn ModelStorage> {
        &self.model_storage
    }

    pub fn resource_storage(&self) -> &Arc<dyn ResourceStorage> {
        &self.resource_storage
    }

    pub fn plugin_manager(&self) -> &Arc<dyn PluginManager> {
        &self.plugin_manager
    }

    pub fn ctx_logger(&self) -> &Arc<dyn CtxLogger> {
        &self.ctx_logger
    }

    /// `<blueprints_root>/<tenant>/<blueprint_id>`
    pub fn blueprint_dir(&self) -> PathBuf {
        self.paths
            .blueprints_root
            .join(&self.host.tenant)
            .join(&self.host.blueprint_id)
    }

    /// Resolve the node's `csar_path` property.
    pub fn csar_source(&self, csar_path: &str) -> CsarSource {
        CsarSource::resolve(csar_path, &self.blueprint_dir())
    }

    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Install the requested plugins from an extracted archive's `plugins/`
    /// directory, then report whatever was left unused.
    pub fn install_archive_plugins<S: AsRef<str>>(
        &self,
        archive_dir: &Path,
        requested: &[S],
    ) -> Result<Vec<PathBuf>> {
        let sources_dir = archive_dir.join(crate::plugins::ARCHIVE_PLUGINS_DIR);
        self.ctx_logger.info(&format!(
            "Installing required plugins: {}",
            requested
                .iter()
                .map(|name| name.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
        let installed = crate::plugins::install_plugins(
            self.fs.as_ref(),
            self.plugin_manager.as_ref(),
            &sources_dir,
            requested,
        )?;
        self.ctx_logger.info("Successfully installed required plugins")?;
        crate::plugins::log_unused_plugins(
            self.fs.as_ref(),
            self.ctx_logger.as_ref(),
            &sources_dir,
            requested,
        )?;
        Ok(installed)
    }

    /// Service templates are named `<tenant>-<deployment_id>`.
    pub fn service_template_name(&self) -> String {
        format!("{}-{}", self.host.tenant, self.host.deployment_id)
    }

    /// Resolve the service created from this deployment's template.
    pub fn service(&self) -> Result<Service> {
        let template = self.service_template_name();
        let services = self.model_storage.list_services(&template)?;
        services
            .into_iter()
            .next()
            .ok_or(BridgeError::MissingService(template))
    }

    /// Remove the working directory once no service template references it.
    ///
    /// Returns `true` if the directory was removed.
    pub fn rm_working_dir(&self) -> Result<bool> {
        let remaining = self.model_storage.service_template_count()?;
        if remaining > 0 {
            debug!(
                tenant = %self.host.tenant,
                remaining,
                "service templates remain; keeping working directory"
            );
            return Ok(false);
        }
        self.workdir.remove(self.fs.as_ref())
    }
}

/// Builds an [`Environment`], creating the tenant working directory on the
/// way.
///
/// Model storage and plugin manager come from the inner orchestrator and
/// must be supplied. Resource storage defaults to the workdir's
/// `resources/` directory; the logger defaults to
/// [`TracingLogger`](crate::sink::TracingLogger).
#[derive(Debug)]
pub struct EnvironmentBuilder {
    host: HostContext,
    paths: PathsSection,
    fs: Arc<dyn FileSystem>,
    model_storage: Option<Arc<dyn ModelStorage>>,
    resource_storage: Option<Arc<dyn ResourceStorage>>,
    plugin_manager: Option<Arc<dyn PluginManager>>,
    ctx_logger: Option<Arc<dyn CtxLogger>>,
}

impl EnvironmentBuilder {
    pub fn new(host: HostContext, paths: PathsSection) -> Self {
        Self {
            host,
            paths,
            fs: Arc::new(RealFileSystem),
            model_storage: None,
            resource_storage: None,
            plugin_manager: None,
            ctx_logger: None,
        }
    }

    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn model_storage(mut self, storage: Arc<dyn ModelStorage>) -> Self {
        self.model_storage = Some(storage);
        self
    }

    pub fn resource_storage(mut self, storage: Arc<dyn ResourceStorage>) -> Self {
        self.resource_storage = Some(storage);
        self
    }

    pub fn plugin_manager(mut self, manager: Arc<dyn PluginManager>) -> Self {
        self.plugin_manager = Some(manager);
        self
    }

    pub fn ctx_logger(mut self, logger: Arc<dyn CtxLogger>) -> Self {
        self.ctx_logger = Some(logger);
        self
    }

    /// The workdir this builder will create, before any storage is wired.
    pub fn workdir(&self) -> Workdir {
        Workdir::for_tenant(&self.paths.plugins_root, &self.host.tenant)
    }

    pub fn build(self) -> Result<Environment> {
        let workdir = self.workdir();
        workdir.ensure(self.fs.as_ref())?;

        let model_storage = self.model_storage.ok_or_else(|| {
            BridgeError::Config("environment requires a model storage".to_string())
        })?;
        let plugin_manager = self.plugin_manager.ok_or_else(|| {
            BridgeError::Config("environment requires a plugin manager".to_string())
        })?;
        let resource_storage = self.resource_storage.unwrap_or_else(|| {
            Arc::new(DirectoryResourceStorage::new(workdir.resources_dir()))
        });
        let ctx_logger = self.ctx_logger.unwrap_or_else(|| {
            Arc::new(crate::sink::TracingLogger::for_node(format!(
                "{}-{}",
                self.host.tenant, self.host.deployment_id
            )))
        });

        info!(
            tenant = %self.host.tenant,
            deployment = %self.host.deployment_id,
            workdir = ?workdir.root(),
            "environment ready"
        );

        Ok(Environment {
            host: self.host,
            paths: self.paths,
            workdir,
            fs: self.fs,
            model_storage,
            resource_storage,
            plugin_manager,
            ctx_logger,
        })
    }
}
