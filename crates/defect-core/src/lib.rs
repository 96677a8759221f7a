//! Core types and utilities for defect dataset preparation.
//!
//! This crate provides the error type, the keyword-based class definitions,
//! processor configuration and logging helpers shared by the dataset crate
//! and the command-line tool.

pub mod cli;
pub mod config;
pub mod error;
pub mod types;

pub use cli::*;
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::cli::*;
    pub use crate::config::*;
    pub use crate::error::{Error, Result};
    pub use crate::types::*;
}
