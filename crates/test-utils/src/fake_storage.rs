use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use nodebridge::env::{ModelStorage, PluginManager};
use nodebridge::exec::LogIterator;
use nodebridge::model::{ExecutionId, LogRecord, Service};

/// Append-only log stream shared between a fake workflow job (writer) and
/// the bridge's log iterator (reader).
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    pending: Arc<Mutex<VecDeque<LogRecord>>>,
    drains: Arc<AtomicUsize>,
    taken: Arc<Mutex<Vec<(String, usize)>>>,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: LogRecord) {
        self.pending.lock().unwrap().push_back(record);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// How many times the iterator has been drained so far.
    pub fn drain_calls(&self) -> usize {
        self.drains.load(Ordering::SeqCst)
    }

    /// The 1-based drain call that took the record with `message`.
    pub fn drain_index_of(&self, message: &str) -> Option<usize> {
        self.taken
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m == message)
            .map(|(_, idx)| *idx)
    }

    /// Block the calling (worker) thread until `cond` holds, or panic after
    /// five seconds.
    pub fn wait_until(&self, what: &str, cond: impl Fn(&LogFeed) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond(self) {
            if Instant::now() > deadline {
                panic!("timed out waiting for {what}");
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn take_all(&self) -> Vec<LogRecord> {
        let mut pending = self.pending.lock().unwrap();
        let batch: Vec<LogRecord> = pending.drain(..).collect();
        let idx = self.drains.fetch_add(1, Ordering::SeqCst) + 1;
        self.taken
            .lock()
            .unwrap()
            .extend(batch.iter().map(|r| (r.message.clone(), idx)));
        batch
    }
}

#[derive(Debug)]
pub struct FeedIterator {
    feed: LogFeed,
    fail: bool,
}

impl LogIterator for FeedIterator {
    fn drain(&mut self) -> Result<Vec<LogRecord>> {
        if self.fail {
            return Err(anyhow!("log storage unavailable"));
        }
        Ok(self.feed.take_all())
    }
}

/// In-memory model storage with a single shared log feed.
#[derive(Debug, Clone)]
pub struct FakeModelStorage {
    base_dir: PathBuf,
    services: Arc<Mutex<Vec<Service>>>,
    templates: Arc<AtomicUsize>,
    feed: LogFeed,
    failing_logs: Arc<AtomicBool>,
    opened: Arc<Mutex<Vec<ExecutionId>>>,
    listed: Arc<Mutex<Vec<String>>>,
}

impl FakeModelStorage {
    pub fn new(feed: LogFeed) -> Self {
        Self {
            base_dir: PathBuf::from("models"),
            services: Arc::new(Mutex::new(Vec::new())),
            templates: Arc::new(AtomicUsize::new(0)),
            feed,
            failing_logs: Arc::new(AtomicBool::new(false)),
            opened: Arc::new(Mutex::new(Vec::new())),
            listed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_service(self, service: Service) -> Self {
        self.services.lock().unwrap().push(service);
        self.templates.fetch_add(1, Ordering::SeqCst);
        self
    }

    pub fn set_template_count(&self, count: usize) {
        self.templates.store(count, Ordering::SeqCst);
    }

    /// Set an output on every stored service, the way an install workflow
    /// publishes them.
    pub fn publish_output(&self, key: &str, value: &str) {
        for service in self.services.lock().unwrap().iter_mut() {
            service.outputs.insert(key.to_string(), value.to_string());
        }
    }

    /// Make every iterator opened from now on fail on drain.
    pub fn fail_logs(&self) {
        self.failing_logs.store(true, Ordering::SeqCst);
    }

    /// Execution ids for which a log iterator was opened.
    pub fn opened_iterators(&self) -> Vec<ExecutionId> {
        self.opened.lock().unwrap().clone()
    }

    /// Template names passed to `list_services`.
    pub fn listed_templates(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

impl ModelStorage for FakeModelStorage {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn list_services(&self, service_template_name: &str) -> Result<Vec<Service>> {
        self.listed
            .lock()
            .unwrap()
            .push(service_template_name.to_string());
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.service_template_name == service_template_name)
            .cloned()
            .collect())
    }

    fn service_template_count(&self) -> Result<usize> {
        Ok(self.templates.load(Ordering::SeqCst))
    }

    fn log_iterator(&self, execution_id: &ExecutionId) -> Result<Box<dyn LogIterator>> {
        self.opened.lock().unwrap().push(execution_id.clone());
        Ok(Box::new(FeedIterator {
            feed: self.feed.clone(),
            fail: self.failing_logs.load(Ordering::SeqCst),
        }))
    }
}

/// One call made on [`FakePluginManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginCall {
    Validate(PathBuf),
    Install(PathBuf),
}

/// Plugin manager that records every call and can be told to reject
/// specific plugin files.
#[derive(Debug, Clone)]
pub struct FakePluginManager {
    plugins_dir: PathBuf,
    calls: Arc<Mutex<Vec<PluginCall>>>,
    rejected: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakePluginManager {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            rejected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make `validate` fail for the plugin file named `file_name`.
    pub fn reject(self, file_name: &str, reason: &str) -> Self {
        self.rejected
            .lock()
            .unwrap()
            .push((file_name.to_string(), reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<PluginCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths passed to `install`, in call order.
    pub fn installed(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PluginCall::Install(path) => Some(path),
                PluginCall::Validate(_) => None,
            })
            .collect()
    }
}

impl PluginManager for FakePluginManager {
    fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    fn validate(&self, plugin_path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(PluginCall::Validate(plugin_path.to_path_buf()));
        let file_name = plugin_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rejected = self.rejected.lock().unwrap();
        match rejected.iter().find(|(name, _)| *name == file_name) {
            Some((_, reason)) => Err(anyhow!("{reason}")),
            None => Ok(()),
        }
    }

    fn install(&self, plugin_path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(PluginCall::Install(plugin_path.to_path_buf()));
        Ok(())
    }
}
