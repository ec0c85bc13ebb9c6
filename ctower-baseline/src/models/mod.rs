//! Data models for baseline workflows

pub mod baseline;
pub mod characterization;
pub mod insight;
pub mod report;
pub mod request;
pub mod workflow_state;

pub use baseline::{BaselineSet, MetricBaseline, MetricCategory, MetricName};
pub use characterization::{
    AutomationPotential, CharacterizationRecord, ComplexityLevel, DomainType, RawCharacterization,
    ScenarioType, TaskComplexity, ToolMaturity,
};
pub use insight::{InsightReport, ReadinessAssessment, ReadinessLevel};
pub use report::FinalReport;
pub use request::BaselineRequest;
pub use workflow_state::{Stage, StageOutput, StageTracker, StatusTransition, WorkflowStatus};
