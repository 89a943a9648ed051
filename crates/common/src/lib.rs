//! ServeCoach Common Utilities
//!
//! Shared infrastructure for all ServeCoach crates:
//! - Error types and result aliases
//! - Frame clock for converting frame indices to time at a fixed frame rate
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
