//! Core utilities for the Glacier engine.
//!
//! This crate provides foundational types and utilities used across the engine:
//! - Error types and result aliases
//! - Logging initialization
//! - Timer utilities
//! - Deferred GPU resource teardown (`DeletionQueue`)

mod deletion_queue;
mod error;
mod logging;
mod timer;

pub use deletion_queue::DeletionQueue;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
