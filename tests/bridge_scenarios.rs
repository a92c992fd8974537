// tests/bridge_scenarios.rs

mod common;
use crate::common::{fast_options, init_tracing, slow_options, TestResult};

use std::path::Path;
use std::time::Duration;

use nodebridge::exec::{
    execute, BridgeOptions, INSTALL_WORKFLOW, MIN_POLL_INTERVAL, UNINSTALL_WORKFLOW,
};
use nodebridge::model::{ExecutionId, LogRecord, Service};
use nodebridge::types::{ExecutionStatus, Severity};
use nodebridge::{BridgeError, ExecutionBridge};
use nodebridge_test_utils::builders::{record, TestBedBuilder, SERVICE_ID, TEMPLATE_NAME};
use nodebridge_test_utils::fake_runner::{ScriptedRunner, Step};
use nodebridge_test_utils::recording_logger::RecordingLogger;
use nodebridge_test_utils::with_timeout;

#[tokio::test]
async fn install_with_no_logs_succeeds_silently() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Succeed]);

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;

    assert!(bed.logger.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_uninstall_forwards_logs_then_reports_status_and_message() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::Emit(vec![record(Severity::Info, "starting")]),
            Step::Fail("boom".to_string()),
        ],
    );

    let result = with_timeout(execute(&bed.env, &runner, UNINSTALL_WORKFLOW, &fast_options())).await;

    assert_eq!(
        bed.logger.calls(),
        vec![(Severity::Info, "starting".to_string())]
    );
    match result {
        Err(BridgeError::Workflow(err)) => {
            assert_eq!(err.workflow, "uninstall");
            assert_eq!(err.status, ExecutionStatus::Failed);
            let msg = err.to_string();
            assert!(msg.contains("uninstall"), "{msg}");
            assert!(msg.contains("failed"), "{msg}");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("expected WorkflowError, got {:?}", other),
    }
}

#[tokio::test]
async fn records_split_across_batches_arrive_in_order() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::AwaitDrains(1),
            Step::Emit(vec![
                record(Severity::Info, "one"),
                record(Severity::Debug, "two"),
            ]),
            Step::AwaitEmpty,
            Step::Emit(vec![record(Severity::Info, "three")]),
            Step::Succeed,
        ],
    );

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;

    assert_eq!(
        bed.logger.calls(),
        vec![
            (Severity::Info, "one".to_string()),
            (Severity::Debug, "two".to_string()),
            (Severity::Info, "three".to_string()),
        ]
    );
    let one = bed.feed.drain_index_of("one").expect("one was never drained");
    let two = bed.feed.drain_index_of("two").expect("two was never drained");
    let three = bed.feed.drain_index_of("three").expect("three was never drained");
    assert_eq!(one, two);
    assert!(one < three, "one drained at {one}, three at {three}");
    Ok(())
}

#[tokio::test]
async fn record_emitted_at_completion_is_flushed_by_final_drain() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    // The job waits for the first drain, so its record can only be seen by
    // the drain after the join. The 30s interval must not be waited out.
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::AwaitDrains(1),
            Step::Emit(vec![record(Severity::Warning, "last words")]),
            Step::Succeed,
        ],
    );

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &slow_options())).await?;

    assert_eq!(
        bed.logger.calls(),
        vec![(Severity::Warning, "last words".to_string())]
    );
    assert_eq!(bed.feed.drain_calls(), 2);
    assert_eq!(bed.feed.drain_index_of("last words"), Some(2));
    Ok(())
}

#[tokio::test]
async fn traceback_is_forwarded_as_second_call_at_same_severity() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::Emit(vec![
                LogRecord::parse("ERROR", "task crashed")?.with_traceback("Traceback: line 3"),
                LogRecord::parse("info", "no traceback here")?.with_traceback(""),
            ]),
            Step::Succeed,
        ],
    );

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;

    assert_eq!(
        bed.logger.calls(),
        vec![
            (Severity::Error, "task crashed".to_string()),
            (Severity::Error, "Traceback: line 3".to_string()),
            (Severity::Info, "no traceback here".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn each_severity_reaches_its_own_sink_method() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let levels = ["debug", "INFO", "Warning", "warn", "error", "CRITICAL"];
    let records = levels
        .iter()
        .map(|lvl| LogRecord::parse(lvl, *lvl))
        .collect::<Result<Vec<_>, _>>()?;
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Emit(records), Step::Succeed]);

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;

    let severities: Vec<Severity> = bed.logger.calls().into_iter().map(|(s, _)| s).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Warning,
            Severity::Error,
            Severity::Critical,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn one_background_job_per_call_regardless_of_log_volume() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();

    let mut script = Vec::new();
    for batch in 0..5 {
        let records = (0..10)
            .map(|i| record(Severity::Info, &format!("batch {batch} line {i}")))
            .collect();
        script.push(Step::Emit(records));
        script.push(Step::AwaitEmpty);
    }
    script.push(Step::Succeed);
    let runner = ScriptedRunner::new(bed.feed.clone(), script);

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;

    assert_eq!(bed.logger.calls().len(), 50);
    assert_eq!(runner.prepare_calls(), 1);
    assert_eq!(runner.jobs_started(), 1);
    assert_eq!(
        bed.storage.opened_iterators(),
        vec![ExecutionId::new("exec-1")]
    );
    Ok(())
}

#[tokio::test]
async fn runner_receives_environment_collaborators_and_resolved_service() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Succeed]);

    let bridge = ExecutionBridge::new(&bed.env, &runner, fast_options());
    with_timeout(bridge.execute("workflow_name")).await?;

    let request = runner.last_request().expect("runner was not prepared");
    assert_eq!(request.workflow_name, "workflow_name");
    assert_eq!(request.service.id, SERVICE_ID);
    assert_eq!(request.model_storage.base_dir(), Path::new("models"));
    assert_eq!(
        request.resource_storage.directory(),
        bed.env.workdir().resources_dir()
    );
    assert_eq!(
        request.plugin_manager.plugins_dir(),
        bed.env.workdir().plugins_dir()
    );
    assert_eq!(bed.storage.listed_templates(), vec![TEMPLATE_NAME.to_string()]);
    Ok(())
}

#[tokio::test]
async fn cancelled_execution_is_a_workflow_error() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![Step::Status(ExecutionStatus::Cancelled)],
    );

    let result = with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await;

    match result {
        Err(BridgeError::Workflow(err)) => {
            assert_eq!(err.status, ExecutionStatus::Cancelled);
            assert!(err.to_string().contains("cancelled"));
            assert!(err.to_string().contains("no error message"));
        }
        other => panic!("expected WorkflowError, got {:?}", other),
    }
}

#[tokio::test]
async fn job_error_is_not_returned_when_status_succeeded() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![Step::Succeed, Step::ReturnError("engine hiccup".to_string())],
    );

    with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await?;
    Ok(())
}

#[tokio::test]
async fn job_ending_without_terminal_status_fails_with_that_status() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::Emit(vec![record(Severity::Info, "about to break")]),
            Step::ReturnError("engine crashed".to_string()),
        ],
    );

    let result = with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await;

    match result {
        Err(BridgeError::Workflow(err)) => {
            assert_eq!(err.status, ExecutionStatus::Running);
            assert_eq!(err.message, None);
        }
        other => panic!("expected WorkflowError, got {:?}", other),
    }
    assert_eq!(bed.logger.messages(), vec!["about to break".to_string()]);
}

#[tokio::test]
async fn panicking_job_is_reported_through_status() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![Step::Panic("engine exploded".to_string())],
    );

    let result = with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await;

    match result {
        Err(BridgeError::Workflow(err)) => assert_eq!(err.status, ExecutionStatus::Running),
        other => panic!("expected WorkflowError, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_service_fails_before_anything_is_dispatched() {
    init_tracing();
    let bed = TestBedBuilder::new().without_service().build();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Succeed]);

    let result = execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options()).await;

    match result {
        Err(BridgeError::MissingService(name)) => assert_eq!(name, TEMPLATE_NAME),
        other => panic!("expected MissingService, got {:?}", other),
    }
    assert_eq!(runner.prepare_calls(), 0);
    assert_eq!(runner.jobs_started(), 0);
}

#[tokio::test]
async fn runner_prepare_error_propagates_unwrapped() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::failing_prepare(bed.feed.clone(), "no such workflow: heal");

    let result = execute(&bed.env, &runner, "heal", &fast_options()).await;

    match result {
        Err(BridgeError::Collaborator(err)) => {
            assert_eq!(err.to_string(), "no such workflow: heal")
        }
        other => panic!("expected collaborator error, got {:?}", other),
    }
    assert_eq!(runner.jobs_started(), 0);
}

#[tokio::test]
async fn log_iterator_failure_propagates() {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    bed.storage.fail_logs();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Succeed]);

    let result = with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await;

    match result {
        Err(BridgeError::Collaborator(err)) => {
            assert!(err.to_string().contains("log storage unavailable"))
        }
        other => panic!("expected collaborator error, got {:?}", other),
    }
}

#[tokio::test]
async fn sink_failure_aborts_forwarding() {
    init_tracing();
    let bed = TestBedBuilder::new()
        .logger(RecordingLogger::failing_on_call(2))
        .build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::Emit(vec![
                record(Severity::Info, "first"),
                record(Severity::Error, "second"),
                record(Severity::Info, "third"),
            ]),
            Step::Succeed,
        ],
    );

    let result = with_timeout(execute(&bed.env, &runner, INSTALL_WORKFLOW, &fast_options())).await;

    match result {
        Err(BridgeError::LogForwarding(err)) => assert_eq!(err.severity, Severity::Error),
        other => panic!("expected LogForwarding, got {:?}", other),
    }
    assert_eq!(bed.logger.messages(), vec!["first".to_string()]);
}

#[tokio::test]
async fn zero_poll_interval_is_raised_to_minimum() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![Step::Sleep(Duration::from_millis(200)), Step::Succeed],
    );
    let options = BridgeOptions {
        poll_interval: Duration::ZERO,
    };

    let bridge = ExecutionBridge::new(&bed.env, &runner, options);
    assert_eq!(bridge.options().poll_interval, MIN_POLL_INTERVAL);

    with_timeout(bridge.execute(INSTALL_WORKFLOW)).await?;

    // 200ms at a 10ms interval is about 20 live drains plus the final one.
    let drains = bed.feed.drain_calls();
    assert!(drains <= 40, "bridge drained {drains} times");
    Ok(())
}

#[tokio::test]
async fn install_returns_outputs_published_by_the_workflow() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new()
        .service(Service::new(SERVICE_ID, "service", TEMPLATE_NAME).with_output("port", "8080"))
        .build();
    let runner = ScriptedRunner::new(
        bed.feed.clone(),
        vec![
            Step::Publish("endpoint".to_string(), "10.0.0.7".to_string()),
            Step::Succeed,
        ],
    )
    .publishing_to(bed.storage.clone());

    let bridge = ExecutionBridge::new(&bed.env, &runner, fast_options());
    let outputs = with_timeout(bridge.install()).await?;

    assert_eq!(outputs.get("port").map(String::as_str), Some("8080"));
    assert_eq!(outputs.get("endpoint").map(String::as_str), Some("10.0.0.7"));
    assert_eq!(outputs.len(), 2);
    assert_eq!(
        runner.last_request().map(|r| r.workflow_name),
        Some(INSTALL_WORKFLOW.to_string())
    );
    Ok(())
}

#[tokio::test]
async fn failed_install_returns_no_outputs() {
    init_tracing();
    let bed = TestBedBuilder::new()
        .service(Service::new(SERVICE_ID, "service", TEMPLATE_NAME).with_output("port", "8080"))
        .build();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Fail("no quota".to_string())]);

    let bridge = ExecutionBridge::new(&bed.env, &runner, fast_options());
    let result = with_timeout(bridge.install()).await;

    match result {
        Err(BridgeError::Workflow(err)) => assert_eq!(err.message.as_deref(), Some("no quota")),
        other => panic!("expected WorkflowError, got {:?}", other),
    }
    assert_eq!(bed.storage.listed_templates().len(), 1);
}

#[tokio::test]
async fn uninstall_runs_the_uninstall_workflow() -> TestResult {
    init_tracing();
    let bed = TestBedBuilder::new().build();
    let runner = ScriptedRunner::new(bed.feed.clone(), vec![Step::Succeed]);

    with_timeout(ExecutionBridge::new(&bed.env, &runner, fast_options()).uninstall()).await?;

    assert_eq!(
        runner.last_request().map(|r| r.workflow_name),
        Some(UNINSTALL_WORKFLOW.to_string())
    );
    Ok(())
}
