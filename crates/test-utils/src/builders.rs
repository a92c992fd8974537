#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use nodebridge::config::PathsSection;
use nodebridge::fs::mock::MockFileSystem;
use nodebridge::model::{LogRecord, Service};
use nodebridge::types::Severity;
use nodebridge::{Environment, EnvironmentBuilder, HostContext};

use crate::fake_storage::{FakeModelStorage, FakePluginManager, LogFeed};
use crate::recording_logger::RecordingLogger;

pub const TENANT: &str = "tenant_name";
pub const DEPLOYMENT: &str = "deployment_id";
pub const BLUEPRINT: &str = "blueprint_id";
pub const TEMPLATE_NAME: &str = "tenant_name-deployment_id";
pub const SERVICE_ID: &str = "service_id";

pub fn host() -> HostContext {
    HostContext::new(TENANT, DEPLOYMENT, BLUEPRINT)
}

pub fn test_paths() -> PathsSection {
    PathsSection {
        plugins_root: PathBuf::from("/resources/plugins"),
        blueprints_root: PathBuf::from("/resources/blueprints"),
    }
}

pub fn test_service() -> Service {
    Service::new(SERVICE_ID, "service", TEMPLATE_NAME)
}

/// Shorthand for a record without traceback.
pub fn record(level: Severity, message: &str) -> LogRecord {
    LogRecord::new(level, message)
}

/// A fully wired in-memory environment plus handles to inspect its fakes.
#[derive(Debug)]
pub struct TestBed {
    pub feed: LogFeed,
    pub storage: FakeModelStorage,
    pub logger: RecordingLogger,
    pub fs: MockFileSystem,
    pub plugins: FakePluginManager,
    pub env: Environment,
}

pub struct TestBedBuilder {
    logger: RecordingLogger,
    service: Option<Service>,
    rejected_plugins: Vec<(String, String)>,
}

impl TestBedBuilder {
    pub fn new() -> Self {
        Self {
            logger: RecordingLogger::new(),
            service: Some(test_service()),
            rejected_plugins: Vec::new(),
        }
    }

    pub fn service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Make the plugin manager refuse to validate `file_name`.
    pub fn reject_plugin(mut self, file_name: &str, reason: &str) -> Self {
        self.rejected_plugins
            .push((file_name.to_string(), reason.to_string()));
        self
    }

    pub fn logger(mut self, logger: RecordingLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn without_service(mut self) -> Self {
        self.service = None;
        self
    }

    pub fn build(self) -> TestBed {
        let feed = LogFeed::new();
        let mut storage = FakeModelStorage::new(feed.clone());
        if let Some(service) = self.service {
            storage = storage.with_service(service);
        }
        let fs = MockFileSystem::new();

        let builder = EnvironmentBuilder::new(host(), test_paths());
        let mut plugins = FakePluginManager::new(builder.workdir().plugins_dir());
        for (file_name, reason) in &self.rejected_plugins {
            plugins = plugins.reject(file_name, reason);
        }
        let env = builder
            .filesystem(Arc::new(fs.clone()))
            .model_storage(Arc::new(storage.clone()))
            .plugin_manager(Arc::new(plugins.clone()))
            .ctx_logger(Arc::new(self.logger.clone()))
            .build()
            .expect("Failed to build test environment");

        TestBed {
            feed,
            storage,
            logger: self.logger,
            fs,
            plugins,
            env,
        }
    }
}

impl Default for TestBedBuilder {
    fn default() -> Self {
        Self::new()
    }
}
