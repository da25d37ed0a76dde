//! The release notes pipeline.

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use crate::config::ReleaseNotesConfig;
use crate::domain::error::{ReleaseError, Result};
use crate::extract::{distinct_issue_numbers, issue_references};
use crate::git::LocalRepository;
use crate::notes::ReleaseNotes;
use crate::obs;
use crate::policy::IssuePolicy;
use crate::range::resolve_range;
use crate::remote::GitHubRepository;
use crate::tracker::{fetch_issues, IssueTracker};

/// Builds release notes for one repository.
pub struct ReleaseNotesCreator<R: LocalRepository, T: IssueTracker> {
    local: R,
    repository: GitHubRepository,
    tracker: T,
    config: ReleaseNotesConfig,
}

impl<R: LocalRepository, T: IssueTracker> ReleaseNotesCreator<R, T> {
    /// Fails on an invalid configuration before any remote call.
    pub fn new(
        local: R,
        repository: GitHubRepository,
        tracker: T,
        config: ReleaseNotesConfig,
    ) -> Result<Self> {
        config.ensure_valid()?;
        Ok(Self {
            local,
            repository,
            tracker,
            config,
        })
    }

    /// Release notes for the issues closed by commits since the latest tag
    /// matching `tag_pattern`, or since the first commit without one.
    pub async fn create(
        &self,
        tag_pattern: Option<&Regex>,
        cancel: &CancellationToken,
    ) -> Result<ReleaseNotes> {
        let span = obs::notes_span(&self.repository.to_string());
        self.run(tag_pattern, cancel).instrument(span).await
    }

    async fn run(
        &self,
        tag_pattern: Option<&Regex>,
        cancel: &CancellationToken,
    ) -> Result<ReleaseNotes> {
        let range = resolve_range(&self.local, tag_pattern)?;
        obs::emit_range_resolved(
            &range.base,
            &range.head,
            range.base_tag.as_deref(),
            range.include_base,
        );

        if cancel.is_cancelled() {
            return Err(ReleaseError::Cancelled);
        }
        let commits = self.tracker.list_commits(&range, cancel).await?;
        if cancel.is_cancelled() {
            return Err(ReleaseError::Cancelled);
        }

        let references: Vec<_> = issue_references(&commits).collect();
        let numbers = distinct_issue_numbers(&references);
        debug!(commits = commits.len(), issues = ?numbers, "issue references extracted");

        let remote_issues = fetch_issues(&self.tracker, &numbers, cancel).await?;
        obs::emit_issues_fetched(commits.len(), numbers.len(), remote_issues.len());

        let policy = IssuePolicy {
            labels: &self.config.labels,
            repo_owner: &self.repository.owner,
            credit_repo_owner: self.config.credit_repo_owner,
        };
        let issues = policy.apply(remote_issues, &references);
        let notes = ReleaseNotes::new(issues, self.config.labels.clone());

        obs::emit_notes_generated(
            notes.issues().len(),
            notes.labels().len(),
            notes.contributors().len(),
        );
        Ok(notes)
    }
}
