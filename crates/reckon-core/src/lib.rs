//! Core types, configuration, and error handling for reckon.
//!
//! This crate provides the shared foundation used by all other reckon crates:
//! - [`ReckonError`] — unified error type using `thiserror`
//! - [`ReckonConfig`] — configuration loaded from `.reckon.toml`
//! - Shared types: [`Role`], [`FileRecord`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{EngineerConfig, GitConfig, ReckonConfig, ScanConfig};
pub use error::ReckonError;
pub use types::{FileRecord, OutputFormat, Role};

/// A convenience `Result` type for reckon operations.
pub type Result<T> = std::result::Result<T, ReckonError>;
