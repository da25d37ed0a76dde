//! Remote tracker boundaries.
//!
//! - `IssueTracker`: commits between two references and issue metadata
//! - `ReleaseApi`: release and release asset records
//!
//! Both traits are async and backend-agnostic. In-memory implementations
//! live in [`crate::fakes`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::error::{ReleaseError, Result};
use crate::domain::{Commit, NewRelease, Release, ReleaseAsset, ReleaseChanges, RemoteIssue};
use crate::range::CommitRange;

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

/// Source of commits and issues for one repository.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Commits in `range`, oldest first. `head` is always included, `base`
    /// only when `range.include_base` is set.
    ///
    /// Paged implementations check `cancel` before each page.
    async fn list_commits(
        &self,
        range: &CommitRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Commit>>;

    /// Issue metadata, or `None` when the issue does not exist.
    async fn get_issue(&self, number: u64) -> Result<Option<RemoteIssue>>;
}

/// Fetch `numbers` one at a time, in order.
///
/// Missing issues are skipped. Any other failure aborts the batch.
/// Cancellation is checked before each request.
pub async fn fetch_issues<T: IssueTracker + ?Sized>(
    tracker: &T,
    numbers: &[u64],
    cancel: &CancellationToken,
) -> Result<Vec<RemoteIssue>> {
    let mut issues = Vec::with_capacity(numbers.len());
    for &number in numbers {
        if cancel.is_cancelled() {
            return Err(ReleaseError::Cancelled);
        }
        match tracker.get_issue(number).await? {
            Some(issue) => issues.push(issue),
            None => debug!(issue = number, "referenced issue not found, skipping"),
        }
    }
    Ok(issues)
}

// ---------------------------------------------------------------------------
// ReleaseApi
// ---------------------------------------------------------------------------

/// Release records of one repository.
///
/// Lookups return `None` (or `false`) for missing records. Callers decide
/// whether absence is an error. Calls are not cancellable once started;
/// callers check cancellation between them.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    async fn get_release(&self, id: u64) -> Result<Option<Release>>;

    async fn get_release_by_tag(&self, tag: &str) -> Result<Option<Release>>;

    /// All releases, newest first.
    async fn list_releases(&self) -> Result<Vec<Release>>;

    /// Create the release record. `release.assets` is ignored here.
    async fn create_release(&self, release: &NewRelease) -> Result<Release>;

    async fn update_release(&self, id: u64, changes: &ReleaseChanges) -> Result<Option<Release>>;

    async fn delete_release(&self, id: u64) -> Result<bool>;

    async fn list_assets(&self, release_id: u64) -> Result<Option<Vec<ReleaseAsset>>>;

    async fn upload_asset(&self, release: &Release, name: &str, data: Vec<u8>)
        -> Result<ReleaseAsset>;

    async fn delete_asset(&self, asset_id: u64) -> Result<bool>;
}
