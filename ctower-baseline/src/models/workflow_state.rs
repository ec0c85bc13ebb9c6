//! Workflow state machine types
//!
//! A workflow progresses through three stages in fixed order:
//! ANALYSIS → BASELINE → INSIGHT
//!
//! Status moves Pending → Running → {Completed | Failed}; both terminal
//! states are absorbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::baseline::BaselineSet;
use super::characterization::CharacterizationRecord;
use super::insight::InsightReport;

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Characterize the request and normalize the record
    Analysis,
    /// Resolve the record against the range table
    Baseline,
    /// Synthesize insights, recommendations and readiness
    Insight,
}

impl Stage {
    /// Stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Analysis, Stage::Baseline, Stage::Insight];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Baseline => "baseline",
            Stage::Insight => "insight",
        }
    }

    /// Position in execution order
    pub(crate) fn index(self) -> usize {
        match self {
            Stage::Analysis => 0,
            Stage::Baseline => 1,
            Stage::Insight => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stages have recorded their result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTracker {
    completed: [bool; 3],
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed[stage.index()]
    }

    /// Record completion; returns false if the stage was already recorded
    pub fn mark_completed(&mut self, stage: Stage) -> bool {
        let slot = &mut self.completed[stage.index()];
        let first = !*slot;
        *slot = true;
        first
    }

    /// First stage in execution order without a result
    pub fn next_stage(&self) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| !self.is_completed(*stage))
    }

    pub fn all_completed(&self) -> bool {
        self.next_stage().is_none()
    }

    /// Completed stages in execution order
    pub fn completed(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.is_completed(*stage))
            .collect()
    }
}

/// Workflow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

/// Status transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub task_id: Uuid,
    pub old_status: WorkflowStatus,
    pub new_status: WorkflowStatus,
    pub transitioned_at: DateTime<Utc>,
}

/// Result of running one stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Analysis(CharacterizationRecord),
    Baseline(BaselineSet),
    Insight(InsightReport),
}

impl StageOutput {
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::Analysis(_) => Stage::Analysis,
            StageOutput::Baseline(_) => Stage::Baseline,
            StageOutput::Insight(_) => Stage::Insight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_walks_stages_in_order() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.next_stage(), Some(Stage::Analysis));

        assert!(tracker.mark_completed(Stage::Analysis));
        assert_eq!(tracker.next_stage(), Some(Stage::Baseline));

        assert!(tracker.mark_completed(Stage::Baseline));
        assert!(tracker.mark_completed(Stage::Insight));
        assert_eq!(tracker.next_stage(), None);
        assert!(tracker.all_completed());
    }

    #[test]
    fn test_tracker_records_first_completion_only() {
        let mut tracker = StageTracker::new();
        assert!(tracker.mark_completed(Stage::Baseline));
        assert!(!tracker.mark_completed(Stage::Baseline));
        assert_eq!(tracker.completed(), vec![Stage::Baseline]);
        // Analysis is still the next missing stage
        assert_eq!(tracker.next_stage(), Some(Stage::Analysis));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!WorkflowStatus::Pending.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Stage::Insight).unwrap(), "insight");
        assert_eq!(Stage::Baseline.to_string(), "baseline");
    }
}
