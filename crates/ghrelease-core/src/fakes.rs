//! In-memory implementations of the repository and tracker traits.
//!
//! Provides `MemoryRepository`, `MemoryIssueTracker` and `MemoryReleaseApi`
//! for tests and dry runs. No process, network or disk access.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::error::{ReleaseError, Result};
use crate::domain::{Commit, NewRelease, Release, ReleaseAsset, ReleaseChanges, RemoteIssue};
use crate::git::{sort_tags, LocalRepository, Remote, Tag};
use crate::range::CommitRange;
use crate::tracker::{IssueTracker, ReleaseApi};

// ---------------------------------------------------------------------------
// MemoryRepository
// ---------------------------------------------------------------------------

/// Linear history with tags and remotes.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    /// Commit ids, oldest first. The last one is HEAD.
    commits: Vec<String>,
    tags: Vec<Tag>,
    remotes: Vec<Remote>,
}

impl MemoryRepository {
    pub fn with_commits<I, S>(commits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commits: commits.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn tagged(mut self, name: &str, target: &str, created_at: i64) -> Self {
        self.tags.push(Tag {
            name: name.to_string(),
            target: target.to_string(),
            created_at,
        });
        self
    }

    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(Remote {
            name: name.to_string(),
            url: url.to_string(),
        });
        self
    }
}

impl LocalRepository for MemoryRepository {
    fn head_commit(&self) -> Result<Option<String>> {
        Ok(self.commits.last().cloned())
    }

    fn first_commit(&self) -> Result<Option<String>> {
        Ok(self.commits.first().cloned())
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        Ok(self.remotes.clone())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let mut tags = self.tags.clone();
        sort_tags(&mut tags);
        Ok(tags)
    }
}

// ---------------------------------------------------------------------------
// MemoryIssueTracker
// ---------------------------------------------------------------------------

/// Tracker over a linear commit list and a map of issues.
#[derive(Debug, Default)]
pub struct MemoryIssueTracker {
    /// Full history, oldest first.
    commits: Vec<Commit>,
    issues: HashMap<u64, RemoteIssue>,
    failing: HashSet<u64>,
    commit_requests: AtomicUsize,
    issue_requests: AtomicUsize,
}

impl MemoryIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn with_issue(mut self, issue: RemoteIssue) -> Self {
        self.issues.insert(issue.number, issue);
        self
    }

    /// Make `get_issue(number)` fail with a remote error.
    pub fn failing_issue(mut self, number: u64) -> Self {
        self.failing.insert(number);
        self
    }

    pub fn commit_requests(&self) -> usize {
        self.commit_requests.load(Ordering::SeqCst)
    }

    pub fn issue_requests(&self) -> usize {
        self.issue_requests.load(Ordering::SeqCst)
    }

    fn position(&self, sha: &str) -> Result<usize> {
        self.commits
            .iter()
            .position(|c| c.sha == sha)
            .ok_or_else(|| ReleaseError::remote("list_commits", sha, "unknown commit"))
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    async fn list_commits(
        &self,
        range: &CommitRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Commit>> {
        if cancel.is_cancelled() {
            return Err(ReleaseError::Cancelled);
        }
        self.commit_requests.fetch_add(1, Ordering::SeqCst);
        let base = self.position(&range.base)?;
        let head = self.position(&range.head)?;
        let start = if range.include_base { base } else { base + 1 };
        if start > head {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=head].to_vec())
    }

    async fn get_issue(&self, number: u64) -> Result<Option<RemoteIssue>> {
        self.issue_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&number) {
            return Err(ReleaseError::remote("get_issue", number, "simulated failure"));
        }
        Ok(self.issues.get(&number).cloned())
    }
}

// ---------------------------------------------------------------------------
// MemoryReleaseApi
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ReleaseState {
    /// Oldest first.
    releases: Vec<Release>,
    contents: HashMap<u64, Vec<u8>>,
    next_id: u64,
}

impl Default for ReleaseState {
    fn default() -> Self {
        Self {
            releases: Vec::new(),
            contents: HashMap::new(),
            next_id: 1,
        }
    }
}

impl ReleaseState {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Release store that mirrors the tracker's conflict rules: one release per
/// tag and unique asset names per release.
#[derive(Debug, Default)]
pub struct MemoryReleaseApi {
    state: Mutex<ReleaseState>,
}

impl MemoryReleaseApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes uploaded for `asset_id`.
    pub fn asset_content(&self, asset_id: u64) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.contents.get(&asset_id).cloned()
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().unwrap().releases.len()
    }
}

#[async_trait]
impl ReleaseApi for MemoryReleaseApi {
    async fn get_release(&self, id: u64) -> Result<Option<Release>> {
        let state = self.state.lock().unwrap();
        Ok(state.releases.iter().find(|r| r.id == id).cloned())
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let state = self.state.lock().unwrap();
        Ok(state.releases.iter().find(|r| r.tag_name == tag).cloned())
    }

    async fn list_releases(&self) -> Result<Vec<Release>> {
        let state = self.state.lock().unwrap();
        Ok(state.releases.iter().rev().cloned().collect())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<Release> {
        let mut state = self.state.lock().unwrap();
        if state
            .releases
            .iter()
            .any(|r| r.tag_name == release.tag_name)
        {
            return Err(ReleaseError::remote(
                "create_release",
                &release.tag_name,
                "a release for this tag already exists",
            ));
        }
        let id = state.next_id();
        let now = Utc::now();
        let created = Release {
            id,
            name: release.name.clone(),
            tag_name: release.tag_name.clone(),
            target_commitish: release.target_commitish.clone(),
            body: release.body.clone(),
            draft: release.draft,
            prerelease: release.prerelease,
            html_url: format!("https://example.test/releases/tag/{}", release.tag_name),
            upload_url: format!("https://uploads.example.test/releases/{id}/assets"),
            created_at: now,
            published_at: (!release.draft).then_some(now),
            assets: Vec::new(),
        };
        state.releases.push(created.clone());
        Ok(created)
    }

    async fn update_release(&self, id: u64, changes: &ReleaseChanges) -> Result<Option<Release>> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.releases.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let mut updated = changes.apply_to(&state.releases[index]);
        if !updated.draft && updated.published_at.is_none() {
            updated.published_at = Some(Utc::now());
        }
        state.releases[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_release(&self, id: u64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.releases.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let removed = state.releases.remove(index);
        for asset in removed.assets {
            state.contents.remove(&asset.id);
        }
        Ok(true)
    }

    async fn list_assets(&self, release_id: u64) -> Result<Option<Vec<ReleaseAsset>>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .releases
            .iter()
            .find(|r| r.id == release_id)
            .map(|r| r.assets.clone()))
    }

    async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        data: Vec<u8>,
    ) -> Result<ReleaseAsset> {
        let mut state = self.state.lock().unwrap();
        let asset_id = state.next_id();
        let stored = state
            .releases
            .iter_mut()
            .find(|r| r.id == release.id)
            .ok_or_else(|| ReleaseError::remote("upload_asset", release.id, "release not found"))?;
        if stored.find_asset(name).is_some() {
            return Err(ReleaseError::remote(
                "upload_asset",
                name,
                "an asset with this name already exists",
            ));
        }
        let asset = ReleaseAsset {
            id: asset_id,
            name: name.to_string(),
            size: data.len() as u64,
            download_url: format!(
                "https://example.test/releases/download/{}/{}",
                stored.tag_name, name
            ),
        };
        stored.assets.push(asset.clone());
        state.contents.insert(asset_id, data);
        Ok(asset)
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let mut found = false;
        for release in state.releases.iter_mut() {
            let before = release.assets.len();
            release.assets.retain(|a| a.id != asset_id);
            found |= release.assets.len() != before;
        }
        state.contents.remove(&asset_id);
        Ok(found)
    }
}
