//! # Control Tower Common Library
//!
//! Shared code for the control tower crates:
//! - Error type and result alias
//! - TOML configuration loading and resolution
//! - Workflow event types and the broadcast event bus
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
