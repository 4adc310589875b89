//! Error types for addon-maint-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that stop a version bump before any file is touched.
#[derive(Error, Debug)]
pub enum BumpError {
    /// The requested version is not `X.Y.Z`.
    #[error("invalid version format: {0} (expected X.Y.Z, e.g. 1.7.2)")]
    InvalidVersion(String),

    /// The add-on directory does not exist.
    #[error("add-on directory not found: {0}")]
    AddonNotFound(Utf8PathBuf),

    /// The directory exists but has no `config.yaml`.
    #[error("not a valid add-on directory (no config.yaml): {0}")]
    NotAnAddon(Utf8PathBuf),
}

/// Result type alias using [`BumpError`].
pub type BumpResult<T> = Result<T, BumpError>;

/// Errors that can occur while preparing a release check.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias using [`ReleaseError`].
pub type ReleaseResult<T> = Result<T, ReleaseError>;
