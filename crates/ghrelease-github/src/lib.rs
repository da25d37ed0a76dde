//! GitHub REST API backend for ghrelease.
//!
//! [`GitHubClient`] implements [`ghrelease_core::IssueTracker`] and
//! [`ghrelease_core::ReleaseApi`] for a single repository.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GitHubClient, GitHubConfig, DEFAULT_API_URL, DEFAULT_UPLOADS_URL};
pub use error::GitHubError;
