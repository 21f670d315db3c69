//! Inkstroke Common Utilities
//!
//! Shared infrastructure for the Inkstroke tools:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Tool configuration loading

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
