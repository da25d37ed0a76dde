//! Release notes for a local checkout, with per-repository caching.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::ReleaseNotesCache;
use crate::config::ConfigSource;
use crate::creator::ReleaseNotesCreator;
use crate::domain::error::Result;
use crate::git::{GitRepository, LocalRepository};
use crate::notes::ReleaseNotes;
use crate::remote::GitHubRepository;
use crate::tracker::IssueTracker;

/// One release notes request.
#[derive(Debug, Clone)]
pub struct NotesRequest {
    pub repository_dir: PathBuf,
    /// Only tags matching this pattern start the commit range.
    pub tag_pattern: Option<Regex>,
    /// Bypass the cache for this request. The result is not stored either.
    pub no_cache: bool,
    pub config: ConfigSource,
}

impl NotesRequest {
    pub fn new(repository_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository_dir: repository_dir.into(),
            tag_pattern: None,
            no_cache: false,
            config: ConfigSource::default(),
        }
    }
}

/// Opens the repository, resolves its GitHub identity and configuration,
/// and runs the pipeline through a [`ReleaseNotesCache`].
///
/// `tracker_factory` builds the tracker for the resolved repository.
pub struct ReleaseNotesService<F> {
    cache: ReleaseNotesCache,
    tracker_factory: F,
}

impl<F, T> ReleaseNotesService<F>
where
    F: Fn(&GitHubRepository) -> Result<T> + Send + Sync,
    T: IssueTracker,
{
    pub fn new(tracker_factory: F) -> Self {
        Self {
            cache: ReleaseNotesCache::new(),
            tracker_factory,
        }
    }

    pub fn cache(&self) -> &ReleaseNotesCache {
        &self.cache
    }

    pub async fn notes(
        &self,
        request: &NotesRequest,
        cancel: &CancellationToken,
    ) -> Result<Arc<ReleaseNotes>> {
        let root = std::path::absolute(&request.repository_dir)?;
        let compute = || self.compute(&root, request, cancel);
        if request.no_cache {
            debug!(root = %root.display(), "cache bypassed");
            return compute().await.map(Arc::new);
        }
        self.cache.get_or_compute(&root, compute).await
    }

    async fn compute(
        &self,
        root: &Path,
        request: &NotesRequest,
        cancel: &CancellationToken,
    ) -> Result<ReleaseNotes> {
        let local = GitRepository::open(root)?;
        let repository = GitHubRepository::find_by_remotes(&local.remotes()?)?;
        debug!(%repository, "resolved GitHub repository");
        let config = request.config.load(root)?;
        let tracker = (self.tracker_factory)(&repository)?;
        let creator = ReleaseNotesCreator::new(local, repository, tracker, config)?;
        creator.create(request.tag_pattern.as_ref(), cancel).await
    }
}
