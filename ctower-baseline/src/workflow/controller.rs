//! Workflow controller
//!
//! Drives one workflow instance through its stages:
//! ANALYSIS → BASELINE → INSIGHT → COMPLETED
//!
//! Each stage runs at most once. A completed stage's result is cached and
//! returned on re-invocation. Requesting a stage whose predecessor has no
//! result runs the next missing stage instead. Any stage fault moves the
//! instance to Failed and halts it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::engine::BaselineEngine;
use crate::error::{StageError, WorkflowError};
use crate::models::{
    BaselineRequest, BaselineSet, CharacterizationRecord, FinalReport, InsightReport, Stage,
    StageOutput, StageTracker, StatusTransition, WorkflowStatus,
};

/// Outcome of one `advance()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Ran the named stage
    Ran(Stage),
    /// All stages present; report aggregated and status Completed
    Done,
}

pub struct WorkflowController {
    task_id: Uuid,
    request: BaselineRequest,
    engine: Arc<BaselineEngine>,
    status: WorkflowStatus,
    tracker: StageTracker,
    analysis: Option<CharacterizationRecord>,
    baselines: Option<BaselineSet>,
    insights: Option<InsightReport>,
    report: Option<FinalReport>,
    error: Option<String>,
    invocations: [u32; 3],
    transitions: Vec<StatusTransition>,
}

impl WorkflowController {
    pub fn new(task_id: Uuid, request: BaselineRequest, engine: Arc<BaselineEngine>) -> Self {
        Self {
            task_id,
            request,
            engine,
            status: WorkflowStatus::Pending,
            tracker: StageTracker::new(),
            analysis: None,
            baselines: None,
            insights: None,
            report: None,
            error: None,
            invocations: [0; 3],
            transitions: Vec::new(),
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn tracker(&self) -> &StageTracker {
        &self.tracker
    }

    /// Failure message once the instance is Failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// How many times a stage's logic actually executed
    pub fn invocation_count(&self, stage: Stage) -> u32 {
        self.invocations[stage.index()]
    }

    /// Status transitions in the order they happened
    pub fn transitions(&self) -> &[StatusTransition] {
        &self.transitions
    }

    /// Run `requested`, or the next missing stage if a predecessor is absent
    ///
    /// A stage that already completed returns its cached result without
    /// executing again, even after the instance reached a terminal status.
    pub async fn run_stage(&mut self, requested: Stage) -> Result<StageOutput, WorkflowError> {
        if let Some(cached) = self.cached_output(requested) {
            tracing::debug!(task_id = %self.task_id, stage = %requested, "Returning cached stage result");
            return Ok(cached);
        }
        self.ensure_not_failed()?;

        let next = self.tracker.next_stage().unwrap_or(requested);
        if next != requested {
            tracing::debug!(
                task_id = %self.task_id,
                requested = %requested,
                running = %next,
                "Predecessor missing, running next stage in order"
            );
        }
        self.execute(next).await
    }

    /// Take one step: run the next missing stage, or aggregate when all are present
    pub async fn advance(&mut self) -> Result<Advance, WorkflowError> {
        match self.status {
            WorkflowStatus::Failed => return Err(self.halted()),
            WorkflowStatus::Completed => return Ok(Advance::Done),
            WorkflowStatus::Pending | WorkflowStatus::Running => {}
        }

        match self.tracker.next_stage() {
            Some(stage) => {
                self.execute(stage).await?;
                Ok(Advance::Ran(stage))
            }
            None => {
                self.complete();
                Ok(Advance::Done)
            }
        }
    }

    /// Advance until Completed or Failed
    ///
    /// Bounded by the number of stages plus the final aggregation step.
    pub async fn run_to_completion(&mut self) -> Result<FinalReport, WorkflowError> {
        let bound = Stage::ALL.len() + 1;
        for _ in 0..bound {
            if self.advance().await? == Advance::Done {
                return Ok(self.aggregate());
            }
        }
        Err(WorkflowError::Stalled(bound))
    }

    /// Report from whatever stage outputs exist
    ///
    /// After completion this returns the report cached at completion time.
    /// Before that it returns a partial report with placeholders.
    pub fn aggregate(&self) -> FinalReport {
        match &self.report {
            Some(report) => report.clone(),
            None => FinalReport::assemble(
                &self.request.user_query,
                self.analysis.as_ref(),
                self.baselines.as_ref(),
                self.insights.as_ref(),
            ),
        }
    }

    fn cached_output(&self, stage: Stage) -> Option<StageOutput> {
        if !self.tracker.is_completed(stage) {
            return None;
        }
        match stage {
            Stage::Analysis => self.analysis.clone().map(StageOutput::Analysis),
            Stage::Baseline => self.baselines.clone().map(StageOutput::Baseline),
            Stage::Insight => self.insights.clone().map(StageOutput::Insight),
        }
    }

    fn ensure_not_failed(&self) -> Result<(), WorkflowError> {
        if self.status == WorkflowStatus::Failed {
            return Err(self.halted());
        }
        Ok(())
    }

    fn halted(&self) -> WorkflowError {
        WorkflowError::Halted(
            self.error
                .clone()
                .unwrap_or_else(|| "workflow failed".to_string()),
        )
    }

    async fn execute(&mut self, stage: Stage) -> Result<StageOutput, WorkflowError> {
        if self.status == WorkflowStatus::Pending {
            self.transition_to(WorkflowStatus::Running);
        }

        self.invocations[stage.index()] += 1;

        tracing::debug!(task_id = %self.task_id, stage = %stage, "Executing stage");

        match self.compute(stage).await {
            Ok(output) => {
                self.record(output.clone());
                tracing::info!(task_id = %self.task_id, stage = %stage, "Stage completed");
                Ok(output)
            }
            Err(source) => {
                let err = WorkflowError::StageFailed { stage, source };
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    async fn compute(&self, stage: Stage) -> Result<StageOutput, StageError> {
        match stage {
            Stage::Analysis => {
                let record = self.engine.analyze(&self.request).await?;
                Ok(StageOutput::Analysis(record))
            }
            Stage::Baseline => {
                let record = self.analysis.as_ref().ok_or(StageError::MissingInput {
                    stage,
                    missing: Stage::Analysis,
                })?;
                Ok(StageOutput::Baseline(self.engine.calculate(record)?))
            }
            Stage::Insight => {
                let record = self.analysis.as_ref().ok_or(StageError::MissingInput {
                    stage,
                    missing: Stage::Analysis,
                })?;
                let baselines = self.baselines.as_ref().ok_or(StageError::MissingInput {
                    stage,
                    missing: Stage::Baseline,
                })?;
                Ok(StageOutput::Insight(self.engine.synthesize(baselines, record)))
            }
        }
    }

    /// Store a stage result; only the first completion is kept
    fn record(&mut self, output: StageOutput) {
        if !self.tracker.mark_completed(output.stage()) {
            return;
        }
        match output {
            StageOutput::Analysis(record) => self.analysis = Some(record),
            StageOutput::Baseline(set) => self.baselines = Some(set),
            StageOutput::Insight(report) => self.insights = Some(report),
        }
    }

    fn complete(&mut self) {
        let report = FinalReport::assemble(
            &self.request.user_query,
            self.analysis.as_ref(),
            self.baselines.as_ref(),
            self.insights.as_ref(),
        );
        tracing::info!(
            task_id = %self.task_id,
            total_metrics = report.summary.total_metrics_analyzed,
            "Workflow completed"
        );
        self.report = Some(report);
        self.transition_to(WorkflowStatus::Completed);
    }

    fn fail(&mut self, message: String) {
        tracing::error!(task_id = %self.task_id, error = %message, "Workflow failed");
        self.error = Some(message);
        self.transition_to(WorkflowStatus::Failed);
    }

    fn transition_to(&mut self, new_status: WorkflowStatus) {
        if self.status.is_terminal() {
            return;
        }
        self.transitions.push(StatusTransition {
            task_id: self.task_id,
            old_status: self.status,
            new_status,
            transitioned_at: Utc::now(),
        });
        self.status = new_status;
    }
}
