//! Workflow event types and the broadcast event bus
//!
//! Events are advisory: a subscriber that lags or is absent loses events,
//! and status polling through the task registry remains the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Workflow lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// A task was registered and its workflow spawned
    TaskStarted {
        task_id: Uuid,
        user_query: String,
        timestamp: DateTime<Utc>,
    },

    /// One stage recorded its authoritative result
    StageCompleted {
        task_id: Uuid,
        /// Stage name ("analysis", "baseline", "insight")
        stage: String,
        timestamp: DateTime<Utc>,
    },

    /// All stages finished and the report was aggregated
    TaskCompleted {
        task_id: Uuid,
        total_metrics: usize,
        timestamp: DateTime<Utc>,
    },

    /// The workflow halted on a fault
    TaskFailed {
        task_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// Task the event belongs to
    pub fn task_id(&self) -> Uuid {
        match self {
            WorkflowEvent::TaskStarted { task_id, .. }
            | WorkflowEvent::StageCompleted { task_id, .. }
            | WorkflowEvent::TaskCompleted { task_id, .. }
            | WorkflowEvent::TaskFailed { task_id, .. } => *task_id,
        }
    }
}

/// Broadcast bus for workflow events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WorkflowEvent,
    ) -> Result<usize, broadcast::error::SendError<WorkflowEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
