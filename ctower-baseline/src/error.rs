//! Error types for ctower-baseline
//!
//! Stage faults are fatal for their workflow instance and never retried.
//! Malformed numeric targets are not errors at this level; the normalizer
//! recovers from them by leaving the target absent.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Stage;

/// Fault raised while executing a single stage
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageError {
    /// Injected range table lacks a bucket the record selects
    #[error("Range table has no bucket '{bucket}' for {category}.{metric}")]
    MissingBucket {
        category: String,
        metric: String,
        bucket: String,
    },

    /// Resolved baseline violates min <= recommended <= max
    #[error("Baseline for {metric} is inconsistent: min={min}, recommended={recommended}, max={max}")]
    InconsistentBaseline {
        metric: String,
        min: f64,
        max: f64,
        recommended: f64,
    },

    /// Characterization source failed
    #[error("Characterization source '{provider}' failed: {message}")]
    Source { provider: String, message: String },

    /// Stage ran before the output it consumes existed
    #[error("{stage} stage requires the {missing} result")]
    MissingInput { stage: Stage, missing: Stage },
}

/// Workflow-level error surfaced by the controller
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    /// A stage faulted; the instance is now Failed
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// Instance already Failed; no further transitions
    #[error("Workflow halted: {0}")]
    Halted(String),

    /// Run loop exhausted its bound without reaching a terminal status
    #[error("Workflow did not complete within {0} transitions")]
    Stalled(usize),
}

/// Characterization producer failure
#[derive(Debug, Error)]
pub enum SourceError {
    /// Producer could not be reached or produced nothing
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Producer answered with something other than a characterization
    #[error("Invalid characterization: {0}")]
    InvalidResponse(String),
}

/// Task registry lookup failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Task not found: {0}")]
    NotFound(Uuid),
}
