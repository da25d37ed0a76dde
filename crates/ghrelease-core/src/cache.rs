//! Per-repository memoization of release notes.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::domain::error::Result;
use crate::notes::ReleaseNotes;

type Slot = Arc<tokio::sync::Mutex<Option<Arc<ReleaseNotes>>>>;

/// Release notes keyed by absolute repository path, compared
/// case-insensitively.
///
/// At most one computation runs per key. Callers racing on the same key
/// wait for it and share its result. Failed computations are not cached.
/// Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct ReleaseNotesCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ReleaseNotesCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &Path) -> Result<String> {
        let absolute = std::path::absolute(path)?;
        Ok(absolute.to_string_lossy().to_lowercase())
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Cached notes for `repo_path`, or the result of `factory`.
    pub async fn get_or_compute<F, Fut>(
        &self,
        repo_path: &Path,
        factory: F,
    ) -> Result<Arc<ReleaseNotes>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ReleaseNotes>>,
    {
        let key = Self::key(repo_path)?;
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;
        if let Some(notes) = guard.as_ref() {
            crate::obs::emit_cache_hit(&key);
            return Ok(Arc::clone(notes));
        }
        debug!(key = %key, "computing release notes");
        let notes = Arc::new(factory().await?);
        *guard = Some(Arc::clone(&notes));
        Ok(notes)
    }

    pub fn contains(&self, repo_path: &Path) -> bool {
        let Ok(key) = Self::key(repo_path) else {
            return false;
        };
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.get(&key).cloned()
        };
        slot.and_then(|s| s.try_lock().ok().map(|g| g.is_some()))
            .unwrap_or(false)
    }
}
