//! Workflow orchestration
//!
//! `BaselineEngine` holds the shared stage services, `WorkflowController`
//! drives one instance through its stages, and `TaskRegistry` runs many
//! instances concurrently keyed by task id.

pub mod controller;
pub mod engine;
pub mod registry;

pub use controller::{Advance, WorkflowController};
pub use engine::BaselineEngine;
pub use registry::{TaskRegistry, TaskState, TaskStatus, TaskSummary};
