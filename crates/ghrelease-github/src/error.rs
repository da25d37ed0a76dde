//! Error types for the GitHub client

use ghrelease_core::ReleaseError;
use thiserror::Error;

/// Errors raised while talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Client setup is invalid (token, base URLs)
    #[error("invalid GitHub client configuration: {0}")]
    Config(String),

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status other than not-found
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Cancellation observed between requests
    #[error("operation cancelled")]
    Cancelled,

    /// Unexpected response body
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Http(err.to_string())
    }
}

impl GitHubError {
    /// Map into the domain error of the operation that failed.
    pub fn into_release_error(self, operation: &str, key: impl std::fmt::Display) -> ReleaseError {
        match self {
            GitHubError::Config(message) => ReleaseError::Configuration(message),
            GitHubError::Cancelled => ReleaseError::Cancelled,
            other => ReleaseError::remote(operation, key, other.to_string()),
        }
    }
}

impl From<GitHubError> for ReleaseError {
    fn from(err: GitHubError) -> Self {
        err.into_release_error("github", "-")
    }
}
