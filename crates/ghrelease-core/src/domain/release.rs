//! Remote release records and the requests that create or change them.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub download_url: String,
}

/// Current state of a remote release. Never mutated locally; updates go
/// through [`ReleaseChanges`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub name: String,
    pub tag_name: String,
    pub target_commitish: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    pub html_url: String,
    /// Endpoint for asset uploads, as advertised by the tracker.
    pub upload_url: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets
            .iter()
            .find(|asset| asset.name.to_lowercase() == name.to_lowercase())
    }
}

/// How a caller names an existing release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    Id(u64),
    Tag(String),
}

impl std::fmt::Display for ReleaseSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseSelector::Id(id) => write!(f, "id {}", id),
            ReleaseSelector::Tag(tag) => write!(f, "tag {}", tag),
        }
    }
}

/// Request to create a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    /// Target of the tag when it does not exist yet. Empty means the
    /// repository's default branch.
    pub target_commitish: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<PathBuf>,
}

impl NewRelease {
    /// A draft, non-prerelease release for `tag_name` without assets.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            name: String::new(),
            target_commitish: String::new(),
            body: String::new(),
            draft: true,
            prerelease: false,
            assets: Vec::new(),
        }
    }
}

/// Field changes applied to an existing release. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<bool>,
}

impl ReleaseChanges {
    pub fn is_empty(&self) -> bool {
        self == &ReleaseChanges::default()
    }

    /// The release as it looks after these changes are applied.
    pub fn apply_to(&self, release: &Release) -> Release {
        let mut updated = release.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(tag_name) = &self.tag_name {
            updated.tag_name = tag_name.clone();
        }
        if let Some(target) = &self.target_commitish {
            updated.target_commitish = target.clone();
        }
        if let Some(body) = &self.body {
            updated.body = body.clone();
        }
        if let Some(draft) = self.draft {
            updated.draft = draft;
        }
        if let Some(prerelease) = self.prerelease {
            updated.prerelease = prerelease;
        }
        updated
    }
}

/// Asset changes applied together with [`ReleaseChanges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChanges {
    pub add: Vec<PathBuf>,
    /// Delete every existing asset before uploading.
    pub clear_existing: bool,
    /// Replace an existing asset with the same name. Ignored when
    /// `clear_existing` is set.
    pub overwrite_existing: bool,
}

impl Default for AssetChanges {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            clear_existing: false,
            overwrite_existing: true,
        }
    }
}
