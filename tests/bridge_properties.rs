// tests/bridge_properties.rs

mod common;
use crate::common::{fast_options, init_tracing};

use std::time::Duration;

use proptest::prelude::*;

use nodebridge::exec::execute;
use nodebridge::model::LogRecord;
use nodebridge::types::{ExecutionStatus, Severity};
use nodebridge::BridgeError;
use nodebridge_test_utils::builders::TestBedBuilder;
use nodebridge_test_utils::fake_runner::{ScriptedRunner, Step};

const SEVERITIES: [Severity; 5] = [
    Severity::Debug,
    Severity::Info,
    Severity::Warning,
    Severity::Error,
    Severity::Critical,
];

const STATUSES: [ExecutionStatus; 5] = [
    ExecutionStatus::Pending,
    ExecutionStatus::Running,
    ExecutionStatus::Succeeded,
    ExecutionStatus::Failed,
    ExecutionStatus::Cancelled,
];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("building test runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Records emitted in any batching arrive exactly once, in emission
    /// order, and all before `execute` returns.
    #[test]
    fn every_record_is_forwarded_once_in_order(
        batches in proptest::collection::vec(
            proptest::collection::vec((0..5usize, "[a-z]{1,12}"), 0..8),
            0..6,
        ),
    ) {
        init_tracing();
        let bed = TestBedBuilder::new().build();

        let mut script = Vec::new();
        let mut expected = Vec::new();
        for batch in batches {
            let records: Vec<LogRecord> = batch
                .iter()
                .map(|(lvl, msg)| LogRecord::new(SEVERITIES[*lvl], msg.clone()))
                .collect();
            expected.extend(records.iter().map(|r| (r.level, r.message.clone())));
            script.push(Step::Emit(records));
            script.push(Step::Sleep(Duration::from_millis(1)));
        }
        script.push(Step::Succeed);

        let runner = ScriptedRunner::new(bed.feed.clone(), script);
        let result = runtime().block_on(execute(&bed.env, &runner, "install", &fast_options()));

        prop_assert!(result.is_ok(), "unexpected error: {:?}", result);
        prop_assert_eq!(bed.logger.calls(), expected);
        prop_assert_eq!(bed.feed.pending(), 0);
        prop_assert_eq!(runner.jobs_started(), 1);
    }

    /// Only `succeeded` maps to `Ok(())`; every other status is a
    /// `WorkflowError` naming the workflow and the status.
    #[test]
    fn only_succeeded_status_passes(idx in 0..5usize, workflow in "[a-z]{3,10}") {
        init_tracing();
        let status = STATUSES[idx];
        let bed = TestBedBuilder::new().build();
        let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Status(status)]);

        let result = runtime().block_on(execute(&bed.env, &runner, &workflow, &fast_options()));

        match result {
            Ok(()) => prop_assert_eq!(status, ExecutionStatus::Succeeded),
            Err(BridgeError::Workflow(err)) => {
                prop_assert_ne!(status, ExecutionStatus::Succeeded);
                let msg = err.to_string();
                prop_assert!(msg.contains(&workflow));
                prop_assert!(msg.contains(status.as_str()));
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }
}
