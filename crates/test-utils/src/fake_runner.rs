use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use nodebridge::exec::{PreparedRun, WorkflowRequest, WorkflowRunner};
use nodebridge::model::{ExecutionHandle, ExecutionId, LogRecord};
use nodebridge::types::ExecutionStatus;

use crate::fake_storage::{FakeModelStorage, LogFeed};

/// One thing the fake workflow job does, in order.
#[derive(Debug, Clone)]
pub enum Step {
    /// Append records to the log feed.
    Emit(Vec<LogRecord>),
    /// Wait until the bridge has drained the feed at least `n` times.
    AwaitDrains(usize),
    /// Wait until the bridge has consumed everything emitted so far.
    AwaitEmpty,
    Sleep(Duration),
    /// Publish a service output; needs [`ScriptedRunner::publishing_to`].
    Publish(String, String),
    Status(ExecutionStatus),
    Succeed,
    Fail(String),
    /// Return an error from the job without touching the status.
    ReturnError(String),
    Panic(String),
}

/// Fake workflow runner whose job plays back a fixed script.
///
/// Counts how often it prepared and how often a job actually ran, and keeps
/// the last request it was given.
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    feed: LogFeed,
    script: Vec<Step>,
    prepared: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<WorkflowRequest>>>,
    fail_prepare: Option<String>,
    storage: Option<FakeModelStorage>,
}

impl ScriptedRunner {
    pub fn new(feed: LogFeed, script: Vec<Step>) -> Self {
        Self {
            feed,
            script,
            prepared: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            fail_prepare: None,
            storage: None,
        }
    }

    /// Let `Step::Publish` write outputs into `storage`.
    pub fn publishing_to(mut self, storage: FakeModelStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// A runner whose `prepare` fails with the given message.
    pub fn failing_prepare(feed: LogFeed, message: &str) -> Self {
        let mut runner = Self::new(feed, Vec::new());
        runner.fail_prepare = Some(message.to_string());
        runner
    }

    pub fn prepare_calls(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    pub fn jobs_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<WorkflowRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl WorkflowRunner for ScriptedRunner {
    fn prepare(&self, request: WorkflowRequest) -> Result<PreparedRun> {
        let n = self.prepared.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(msg) = &self.fail_prepare {
            return Err(anyhow!(msg.clone()));
        }

        let execution = ExecutionHandle::new(
            ExecutionId::new(format!("exec-{n}")),
            request.workflow_name.clone(),
        );
        *self.last_request.lock().unwrap() = Some(request);

        let handle = execution.clone();
        let feed = self.feed.clone();
        let script = self.script.clone();
        let started = Arc::clone(&self.started);
        let storage = self.storage.clone();

        Ok(PreparedRun::new(execution, move || {
            started.fetch_add(1, Ordering::SeqCst);
            handle.set_status(ExecutionStatus::Running);
            play(&script, &handle, &feed, storage.as_ref())
        }))
    }
}

fn play(
    script: &[Step],
    execution: &ExecutionHandle,
    feed: &LogFeed,
    storage: Option<&FakeModelStorage>,
) -> Result<()> {
    for step in script {
        match step {
            Step::Emit(records) => {
                for record in records {
                    feed.push(record.clone());
                }
            }
            Step::AwaitDrains(n) => {
                let n = *n;
                feed.wait_until("bridge drains", |f| f.drain_calls() >= n);
            }
            Step::AwaitEmpty => {
                feed.wait_until("log feed to empty", |f| f.pending() == 0);
            }
            Step::Sleep(d) => std::thread::sleep(*d),
            Step::Publish(key, value) => match storage {
                Some(storage) => storage.publish_output(key, value),
                None => return Err(anyhow!("Step::Publish without a storage")),
            },
            Step::Status(status) => execution.set_status(*status),
            Step::Succeed => execution.succeed(),
            Step::Fail(msg) => execution.fail(msg.clone(), None),
            Step::ReturnError(msg) => return Err(anyhow!(msg.clone())),
            Step::Panic(msg) => panic!("{msg}"),
        }
    }
    Ok(())
}
