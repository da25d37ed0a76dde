//! Commit range selection for a release.

use regex::Regex;
use tracing::debug;

use crate::domain::error::{ReleaseError, Result};
use crate::git::LocalRepository;

/// Commits to scan: everything after `base` up to and including `head`,
/// plus `base` itself when `include_base` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub base: String,
    pub head: String,
    pub include_base: bool,
    /// Tag the base was taken from, if any.
    pub base_tag: Option<String>,
}

/// Resolve the range from the latest tag matching `tag_pattern` to HEAD.
///
/// Without a matching tag the range starts at the oldest commit and
/// includes it.
pub fn resolve_range<R: LocalRepository + ?Sized>(
    repo: &R,
    tag_pattern: Option<&Regex>,
) -> Result<CommitRange> {
    let head = repo
        .head_commit()?
        .ok_or_else(|| ReleaseError::InvalidState("repository has no commits".to_string()))?;

    if let Some(tag) = repo.latest_tag(tag_pattern)? {
        debug!(tag = %tag.name, base = %tag.target, head = %head, "range starts at tag");
        return Ok(CommitRange {
            base: tag.target,
            head,
            include_base: false,
            base_tag: Some(tag.name),
        });
    }

    let first = repo
        .first_commit()?
        .ok_or_else(|| ReleaseError::InvalidState("repository has no commits".to_string()))?;
    debug!(base = %first, head = %head, "no matching tag, range starts at first commit");
    Ok(CommitRange {
        base: first,
        head,
        include_base: true,
        base_tag: None,
    })
}
