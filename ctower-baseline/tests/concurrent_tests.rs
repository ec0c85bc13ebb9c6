//! Integration tests for concurrent workflows through the task registry
//!
//! Many instances run at once; they share no mutable state beyond the
//! registry, so one failing (or panicking) instance must not disturb the rest.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ctower_baseline::error::SourceError;
use ctower_baseline::models::characterization::fields;
use ctower_baseline::models::{BaselineRequest, RawCharacterization};
use ctower_baseline::range_table::RangeTable;
use ctower_baseline::services::CharacterizationSource;
use ctower_baseline::workflow::{BaselineEngine, TaskRegistry, TaskState, TaskStatus};
use ctower_common::config::CalculationMode;
use ctower_common::events::{EventBus, WorkflowEvent};
use tokio::task::JoinSet;
use uuid::Uuid;

const POLL: Duration = Duration::from_millis(5);

/// Behaviour is picked by the request's query text
struct ScriptedSource;

#[async_trait]
impl CharacterizationSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn characterize(&self, request: &BaselineRequest) -> Result<RawCharacterization, SourceError> {
        let query = request.user_query.as_str();
        if query.starts_with("panic") {
            panic!("source crashed on {}", query);
        }
        if query.starts_with("fail") {
            return Err(SourceError::InvalidResponse(format!("no characterization for {}", query)));
        }
        if query.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mut raw = RawCharacterization::new();
        if query.contains("simple") {
            raw.insert(fields::TASK_COMPLEXITY, "simple");
        }
        Ok(raw)
    }
}

fn registry(mode: CalculationMode) -> TaskRegistry {
    let engine = BaselineEngine::new(Arc::new(ScriptedSource), Arc::new(RangeTable::standard()), mode);
    TaskRegistry::new(Arc::new(engine), EventBus::new(256))
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_submissions_complete_independently() {
    let registry = registry(CalculationMode::Standard);
    let mut join_set = JoinSet::new();

    for i in 0..20 {
        let registry = registry.clone();
        join_set.spawn(async move {
            let query = if i % 2 == 0 {
                format!("simple agent {}", i)
            } else {
                format!("agent {}", i)
            };
            let task_id = registry.submit(BaselineRequest::new(query.clone())).await;
            let status = registry.wait(task_id, POLL).await;
            (task_id, query, status)
        });
    }

    let mut task_ids = HashSet::new();
    while let Some(result) = join_set.join_next().await {
        let (task_id, query, status) = result.expect("Task panicked");
        assert!(task_ids.insert(task_id), "duplicate task id {}", task_id);

        let TaskStatus::Completed(report) = status else {
            panic!("task {} did not complete: {:?}", task_id, status);
        };
        assert_eq!(report.user_query, query);
        let escalation = report
            .baseline_calculations
            .calculated_baselines
            .get(ctower_baseline::models::MetricName::TaskEscalationRate)
            .unwrap();
        if query.starts_with("simple") {
            assert_eq!(escalation.recommended, 7.5);
        } else {
            assert_eq!(escalation.recommended, 20.0);
        }
    }

    assert_eq!(task_ids.len(), 20);
    assert_eq!(registry.len().await, 20);
}

#[tokio::test]
async fn test_failure_is_isolated_to_its_task() {
    let registry = registry(CalculationMode::Standard);

    let ok_id = registry.submit(BaselineRequest::new("agent ok")).await;
    let fail_id = registry.submit(BaselineRequest::new("fail agent")).await;

    let ok = registry.wait(ok_id, POLL).await;
    let failed = registry.wait(fail_id, POLL).await;

    assert!(matches!(ok, TaskStatus::Completed(_)));
    match failed {
        TaskStatus::Failed(message) => {
            assert!(message.contains("analysis stage failed"));
            assert!(message.contains("no characterization for fail agent"));
        }
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test]
async fn test_panicking_workflow_recorded_as_failed() {
    let registry = registry(CalculationMode::Standard);

    let panic_id = registry.submit(BaselineRequest::new("panic agent")).await;
    let ok_id = registry.submit(BaselineRequest::new("agent")).await;

    match registry.wait(panic_id, POLL).await {
        TaskStatus::Failed(message) => assert!(message.contains("aborted")),
        other => panic!("unexpected status: {:?}", other),
    }
    assert!(matches!(registry.wait(ok_id, POLL).await, TaskStatus::Completed(_)));
}

#[tokio::test]
async fn test_status_is_not_terminal_while_running() {
    let registry = registry(CalculationMode::Standard);
    let task_id = registry.submit(BaselineRequest::new("slow agent")).await;

    let early = registry.status(task_id).await;
    assert!(
        matches!(early, TaskStatus::Started | TaskStatus::Running),
        "unexpected early status: {:?}",
        early
    );

    assert!(matches!(registry.wait(task_id, POLL).await, TaskStatus::Completed(_)));
    let listing = registry.list().await;
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].state, TaskState::Completed);
    assert!(listing[0].updated_at >= listing[0].started_at);
}

#[tokio::test]
async fn test_terminal_status_is_stable() {
    let registry = registry(CalculationMode::Extended);
    let task_id = registry.submit(BaselineRequest::new("agent")).await;

    let first = registry.wait(task_id, POLL).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = registry.status(task_id).await;
    assert_eq!(first, second);

    let TaskStatus::Completed(report) = second else {
        panic!("expected completion");
    };
    assert_eq!(report.summary.total_metrics_analyzed, 8);
}

// ============================================================================
// Registry bookkeeping and events
// ============================================================================

#[tokio::test]
async fn test_unknown_and_removed_tasks_are_not_found() {
    let registry = registry(CalculationMode::Standard);
    assert_eq!(registry.status(Uuid::new_v4()).await, TaskStatus::NotFound);

    let task_id = registry.submit(BaselineRequest::new("agent")).await;
    registry.wait(task_id, POLL).await;
    assert!(matches!(registry.remove(task_id).await, Ok(TaskStatus::Completed(_))));
    assert_eq!(registry.status(task_id).await, TaskStatus::NotFound);
}

#[tokio::test]
async fn test_events_follow_stage_order() {
    let registry = registry(CalculationMode::Standard);
    let mut rx = registry.subscribe();

    let task_id = registry.submit(BaselineRequest::new("agent")).await;

    let mut kinds = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timed out waiting for events")
            .expect("Event channel closed");
        assert_eq!(event.task_id(), task_id);
        match event {
            WorkflowEvent::TaskStarted { .. } => kinds.push("started".to_string()),
            WorkflowEvent::StageCompleted { stage, .. } => kinds.push(stage),
            WorkflowEvent::TaskCompleted { total_metrics, .. } => {
                assert_eq!(total_metrics, 7);
                kinds.push("completed".to_string());
                break;
            }
            WorkflowEvent::TaskFailed { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    assert_eq!(kinds, vec!["started", "analysis", "baseline", "insight", "completed"]);
}
