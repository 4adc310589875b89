//! Release tag existence check.
//!
//! Before bumping an add-on, the operator can ask whether the matching
//! GitHub release tag (`v<version>`) already exists. The check is a single
//! `HEAD` request with a timeout; it is never retried.

use std::time::Duration;

use serde::Serialize;

use crate::config::ReleaseConfig;
use crate::error::ReleaseResult;

/// Build the URL of the release tag page for an add-on version.
pub fn release_tag_url(base_url: &str, owner: &str, addon: &str, version: &str) -> String {
    format!(
        "{}/{owner}/{addon}/releases/tag/v{version}",
        base_url.trim_end_matches('/')
    )
}

/// Outcome of a release check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ReleaseStatus {
    /// The tag page answered `200 OK`.
    Found,
    /// The server answered with another status.
    NotFound {
        /// HTTP status code received.
        http_status: u16,
    },
    /// The request failed (DNS, connect, timeout, TLS).
    Unreachable {
        /// Transport error message.
        reason: String,
    },
}

impl ReleaseStatus {
    /// Returns `true` if the release was confirmed to exist.
    pub const fn exists(&self) -> bool {
        matches!(self, Self::Found)
    }
}

/// Blocking HTTP client for release checks.
#[derive(Debug)]
pub struct ReleaseChecker {
    client: reqwest::blocking::Client,
    base_url: String,
    owner: String,
}

impl ReleaseChecker {
    /// Create a checker from release settings.
    pub fn new(config: &ReleaseConfig) -> ReleaseResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            owner: config.owner.clone(),
        })
    }

    /// URL that [`check`](Self::check) will request.
    pub fn url(&self, addon: &str, version: &str) -> String {
        release_tag_url(&self.base_url, &self.owner, addon, version)
    }

    /// Check whether the release tag for `addon` at `version` exists.
    #[tracing::instrument(skip(self))]
    pub fn check(&self, addon: &str, version: &str) -> ReleaseStatus {
        let url = self.url(addon, version);
        tracing::debug!(%url, "checking release");

        match self.client.head(&url).send() {
            Ok(response) if response.status() == reqwest::StatusCode::OK => ReleaseStatus::Found,
            Ok(response) => ReleaseStatus::NotFound {
                http_status: response.status().as_u16(),
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "release check failed");
                ReleaseStatus::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
