// src/model/execution.rs

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::types::ExecutionStatus;

/// Opaque execution identifier assigned by the inner orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time copy of an execution's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub traceback: Option<Vec<String>>,
}

/// Shared view of one execution.
///
/// Clones share the same status cell. The inner orchestrator's engine is the
/// only writer; the bridge only reads. Once a terminal status has been
/// written, further writes are ignored.
#[derive(Clone)]
pub struct ExecutionHandle {
    id: ExecutionId,
    workflow: String,
    state: Arc<RwLock<ExecutionSnapshot>>,
}

impl fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("id", &self.id)
            .field("workflow", &self.workflow)
            .field("state", &self.snapshot())
            .finish()
    }
}

impl ExecutionHandle {
    pub fn new(id: ExecutionId, workflow: impl Into<String>) -> Self {
        Self {
            id,
            workflow: workflow.into(),
            state: Arc::new(RwLock::new(ExecutionSnapshot::default())),
        }
    }

    pub fn id(&self) -> &ExecutionId {
        &self.id
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn status(&self) -> ExecutionStatus {
        self.read().status
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        self.read().clone()
    }

    pub fn set_status(&self, status: ExecutionStatus) {
        self.write(status, None, None);
    }

    pub fn succeed(&self) {
        self.write(ExecutionStatus::Succeeded, None, None);
    }

    pub fn fail(&self, error: impl Into<String>, traceback: Option<Vec<String>>) {
        self.write(ExecutionStatus::Failed, Some(error.into()), traceback);
    }

    pub fn cancel(&self) {
        self.write(ExecutionStatus::Cancelled, None, None);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ExecutionSnapshot> {
        // A panicking writer cannot leave the snapshot half-written.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
        status: ExecutionStatus,
        error: Option<String>,
        traceback: Option<Vec<String>>,
    ) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.status.is_terminal() {
            debug!(
                execution_id = %self.id,
                current = %state.status,
                ignored = %status,
                "execution already terminal; ignoring status write"
            );
            return;
        }
        state.status = status;
        if error.is_some() {
            state.error = error;
        }
        if traceback.is_some() {
            state.traceback = traceback;
        }
    }
}
