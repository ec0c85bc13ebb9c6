//! ctower-baseline library interface
//!
//! Computes domain-specific performance baselines for an operational agent
//! from a categorical characterization of its use case, and packages them
//! into a structured report.

pub mod error;
pub mod models;
pub mod range_table;
pub mod services;
pub mod workflow;

pub use crate::error::{RegistryError, SourceError, StageError, WorkflowError};
pub use crate::range_table::RangeTable;
pub use crate::workflow::{BaselineEngine, TaskRegistry, TaskStatus, WorkflowController};

use std::sync::Arc;

use ctower_common::config::TomlConfig;
use ctower_common::events::EventBus;
use services::CharacterizationSource;

/// Build the shared registry from bootstrap configuration
///
/// Rejects a zero event capacity, which the broadcast channel cannot hold.
pub fn build_registry(
    config: &TomlConfig,
    source: Arc<dyn CharacterizationSource>,
) -> ctower_common::Result<TaskRegistry> {
    if config.engine.event_capacity == 0 {
        return Err(ctower_common::Error::Config(
            "engine.event_capacity must be greater than zero".to_string(),
        ));
    }

    let engine = BaselineEngine::from_config(config, source)?;
    tracing::info!(
        mode = ?engine.mode(),
        source = engine.source_name(),
        "Baseline engine initialized"
    );
    Ok(TaskRegistry::new(
        Arc::new(engine),
        EventBus::new(config.engine.event_capacity),
    ))
}
