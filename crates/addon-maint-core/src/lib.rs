//! Core library for addon-maint.
//!
//! This crate provides the text transformations and file updates behind the
//! `addon-maint` CLI, usable on their own by other tools.
//!
//! # Modules
//!
//! - [`reflow`] - Markdown line-length reflow
//! - [`version`] - Version bumping across add-on files
//! - [`release`] - Release tag existence check
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use addon_maint_core::reflow::reflow_line;
//!
//! let lines = reflow_line("- **Path**: located at /very/long/path/that/exceeds/the/limit", 40);
//! assert_eq!(lines[0], "- **Path**: located at");
//! assert_eq!(lines[1], "  /very/long/path/that/exceeds/the/limit");
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod reflow;
pub mod release;
pub mod version;

pub use config::{Config, ConfigLoader, ConfigSources, LogLevel, ReleaseConfig};
pub use error::{BumpError, BumpResult, ConfigError, ConfigResult, ReleaseError, ReleaseResult};
pub use reflow::{
    DEFAULT_MAX_LINE_LENGTH, DocumentReport, LongLine, ReflowMode, ReflowSettings, reflow_document,
    reflow_line, reflow_text,
};

/// Default maximum input size in bytes (5 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
