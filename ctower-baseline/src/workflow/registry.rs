//! Process-wide task registry
//!
//! Maps task identifiers to workflow state. Each submitted request runs on
//! its own tokio task; the registry is the only shared mutable resource and
//! is guarded by an async `RwLock`. Locks are held only for map updates,
//! never across stage execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ctower_common::events::{EventBus, WorkflowEvent};
use ctower_common::time;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::controller::{Advance, WorkflowController};
use super::engine::BaselineEngine;
use crate::error::{RegistryError, WorkflowError};
use crate::models::{BaselineRequest, FinalReport, Stage};

/// Lifecycle state of a registered task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Started,
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// Status query answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum TaskStatus {
    NotFound,
    Started,
    Running,
    Completed(Box<FinalReport>),
    Failed(String),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed(_) | TaskStatus::Failed(_))
    }
}

/// Listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub state: TaskState,
    pub user_query: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Seconds since submission
    pub elapsed_seconds: u64,
}

#[derive(Debug)]
struct TaskEntry {
    state: TaskState,
    user_query: String,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    result: Option<FinalReport>,
    error: Option<String>,
}

impl TaskEntry {
    fn status(&self) -> TaskStatus {
        match self.state {
            TaskState::Started => TaskStatus::Started,
            TaskState::Running => TaskStatus::Running,
            TaskState::Completed => match &self.result {
                Some(report) => TaskStatus::Completed(Box::new(report.clone())),
                None => TaskStatus::Failed("completed without a report".to_string()),
            },
            TaskState::Failed => TaskStatus::Failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
        }
    }
}

/// Shared registry of concurrently running workflows
#[derive(Clone)]
pub struct TaskRegistry {
    engine: Arc<BaselineEngine>,
    tasks: Arc<RwLock<HashMap<Uuid, TaskEntry>>>,
    event_bus: EventBus,
}

impl TaskRegistry {
    pub fn new(engine: Arc<BaselineEngine>, event_bus: EventBus) -> Self {
        Self {
            engine,
            tasks: Arc::new(RwLock::new(HashMap::new())),
            event_bus,
        }
    }

    pub fn engine(&self) -> &Arc<BaselineEngine> {
        &self.engine
    }

    /// Subscribe to workflow lifecycle events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<WorkflowEvent> {
        self.event_bus.subscribe()
    }

    /// Register a request and spawn its workflow
    ///
    /// Returns immediately with the new task identifier. A panic inside the
    /// workflow task is observed here and recorded as a failure.
    pub async fn submit(&self, request: BaselineRequest) -> Uuid {
        let task_id = Uuid::new_v4();
        let now = time::now();

        self.tasks.write().await.insert(
            task_id,
            TaskEntry {
                state: TaskState::Started,
                user_query: request.user_query.clone(),
                started_at: now,
                updated_at: now,
                result: None,
                error: None,
            },
        );

        self.event_bus.emit_lossy(WorkflowEvent::TaskStarted {
            task_id,
            user_query: request.user_query.clone(),
            timestamp: now,
        });

        tracing::info!(task_id = %task_id, "Task submitted");

        let registry = self.clone();
        tokio::spawn(async move {
            let worker = tokio::spawn(registry.clone().drive(task_id, request));
            if let Err(join_error) = worker.await {
                tracing::error!(task_id = %task_id, error = %join_error, "Workflow task aborted");
                registry
                    .mark_failed(task_id, format!("workflow task aborted: {}", join_error))
                    .await;
            }
        });

        task_id
    }

    /// Current status of a task
    pub async fn status(&self, task_id: Uuid) -> TaskStatus {
        match self.tasks.read().await.get(&task_id) {
            Some(entry) => entry.status(),
            None => {
                tracing::debug!(task_id = %task_id, "Status query for unknown task");
                TaskStatus::NotFound
            }
        }
    }

    /// Like [`status`](Self::status) but unknown ids are an error
    pub async fn lookup(&self, task_id: Uuid) -> Result<TaskStatus, RegistryError> {
        match self.status(task_id).await {
            TaskStatus::NotFound => Err(RegistryError::NotFound(task_id)),
            status => Ok(status),
        }
    }

    /// All registered tasks, oldest first
    pub async fn list(&self) -> Vec<TaskSummary> {
        let mut summaries: Vec<TaskSummary> = self
            .tasks
            .read()
            .await
            .iter()
            .map(|(task_id, entry)| TaskSummary {
                task_id: *task_id,
                state: entry.state,
                user_query: entry.user_query.clone(),
                started_at: entry.started_at,
                updated_at: entry.updated_at,
                elapsed_seconds: time::elapsed_seconds(entry.started_at),
            })
            .collect();
        summaries.sort_by_key(|s| (s.started_at, s.task_id));
        summaries
    }

    /// Drop a task's entry, returning its last status
    pub async fn remove(&self, task_id: Uuid) -> Result<TaskStatus, RegistryError> {
        self.tasks
            .write()
            .await
            .remove(&task_id)
            .map(|entry| entry.status())
            .ok_or(RegistryError::NotFound(task_id))
    }

    /// Poll until the task reaches a terminal status or disappears
    pub async fn wait(&self, task_id: Uuid, poll_interval: Duration) -> TaskStatus {
        loop {
            let status = self.status(task_id).await;
            if status.is_terminal() || status == TaskStatus::NotFound {
                return status;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Run a workflow inline without registering it
    pub async fn run_blocking(&self, request: BaselineRequest) -> Result<FinalReport, WorkflowError> {
        let mut controller = WorkflowController::new(Uuid::new_v4(), request, Arc::clone(&self.engine));
        controller.run_to_completion().await
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    async fn drive(self, task_id: Uuid, request: BaselineRequest) {
        let mut controller = WorkflowController::new(task_id, request, Arc::clone(&self.engine));
        self.set_state(task_id, TaskState::Running).await;

        for _ in 0..=Stage::ALL.len() {
            match controller.advance().await {
                Ok(Advance::Ran(stage)) => {
                    self.event_bus.emit_lossy(WorkflowEvent::StageCompleted {
                        task_id,
                        stage: stage.to_string(),
                        timestamp: time::now(),
                    });
                }
                Ok(Advance::Done) => {
                    self.mark_completed(task_id, controller.aggregate()).await;
                    return;
                }
                Err(e) => {
                    self.mark_failed(task_id, e.to_string()).await;
                    return;
                }
            }
        }

        let stalled = WorkflowError::Stalled(Stage::ALL.len() + 1);
        self.mark_failed(task_id, stalled.to_string()).await;
    }

    /// Apply an update unless the entry is gone or already terminal
    async fn update<F>(&self, task_id: Uuid, apply: F) -> bool
    where
        F: FnOnce(&mut TaskEntry),
    {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task_id) {
            Some(entry) if !entry.state.is_terminal() => {
                apply(entry);
                entry.updated_at = time::now();
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!(task_id = %task_id, "Update for removed task ignored");
                false
            }
        }
    }

    async fn set_state(&self, task_id: Uuid, state: TaskState) {
        self.update(task_id, |entry| entry.state = state).await;
    }

    async fn mark_completed(&self, task_id: Uuid, report: FinalReport) {
        let total_metrics = report.summary.total_metrics_analyzed;
        let updated = self
            .update(task_id, |entry| {
                entry.state = TaskState::Completed;
                entry.result = Some(report);
            })
            .await;

        if updated {
            tracing::info!(task_id = %task_id, total_metrics, "Task completed");
            self.event_bus.emit_lossy(WorkflowEvent::TaskCompleted {
                task_id,
                total_metrics,
                timestamp: time::now(),
            });
        }
    }

    async fn mark_failed(&self, task_id: Uuid, error: String) {
        let message = error.clone();
        let updated = self
            .update(task_id, |entry| {
                entry.state = TaskState::Failed;
                entry.error = Some(error);
            })
            .await;

        if updated {
            tracing::warn!(task_id = %task_id, error = %message, "Task failed");
            self.event_bus.emit_lossy(WorkflowEvent::TaskFailed {
                task_id,
                error: message,
                timestamp: time::now(),
            });
        }
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("engine", &self.engine)
            .field("event_capacity", &self.event_bus.capacity())
            .finish_non_exhaustive()
    }
}
