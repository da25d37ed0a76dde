//! Release management on top of a [`ReleaseApi`].

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::error::{ReleaseError, Result};
use crate::domain::{
    AssetChanges, NewRelease, Release, ReleaseAsset, ReleaseChanges, ReleaseSelector,
};
use crate::obs;
use crate::tracker::ReleaseApi;

/// Create, read, update and delete releases of one repository.
///
/// Requests are validated before any remote call. Releases named by the
/// caller must exist; absence is [`ReleaseError::NotFound`].
pub struct Releaser<A: ReleaseApi> {
    api: A,
}

impl<A: ReleaseApi> Releaser<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn get(&self, selector: &ReleaseSelector) -> Result<Release> {
        let release = match selector {
            ReleaseSelector::Id(id) => self.api.get_release(*id).await?,
            ReleaseSelector::Tag(tag) => self.api.get_release_by_tag(tag).await?,
        };
        release.ok_or_else(|| ReleaseError::not_found("release", selector))
    }

    /// All releases, newest first.
    pub async fn list(&self) -> Result<Vec<Release>> {
        self.api.list_releases().await
    }

    /// Create `new` and upload its assets in order.
    pub async fn create(&self, new: &NewRelease, cancel: &CancellationToken) -> Result<Release> {
        ensure_tag_name(&new.tag_name)?;
        ensure_assets_exist(&new.assets)?;

        let mut release = self.api.create_release(new).await?;
        info!(id = release.id, tag = %release.tag_name, "release created");

        for path in &new.assets {
            if cancel.is_cancelled() {
                return Err(ReleaseError::Cancelled);
            }
            let asset = self.upload(&release, path).await?;
            release.assets.push(asset);
        }
        Ok(release)
    }

    /// Apply `changes` to the selected release, then its asset changes.
    pub async fn update(
        &self,
        selector: &ReleaseSelector,
        changes: &ReleaseChanges,
        assets: &AssetChanges,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        if let Some(tag) = &changes.tag_name {
            ensure_tag_name(tag)?;
        }
        ensure_assets_exist(&assets.add)?;

        let current = self.get(selector).await?;
        let mut release = if changes.is_empty() {
            current
        } else {
            self.api
                .update_release(current.id, changes)
                .await?
                .ok_or_else(|| ReleaseError::not_found("release", selector))?
        };

        if assets.clear_existing {
            let existing = self
                .api
                .list_assets(release.id)
                .await?
                .unwrap_or_default();
            for asset in existing {
                if cancel.is_cancelled() {
                    return Err(ReleaseError::Cancelled);
                }
                self.api.delete_asset(asset.id).await?;
                debug!(asset = %asset.name, "asset deleted");
            }
            release.assets.clear();
        }

        for path in &assets.add {
            if cancel.is_cancelled() {
                return Err(ReleaseError::Cancelled);
            }
            if assets.overwrite_existing && !assets.clear_existing {
                let name = asset_name(path)?;
                if let Some(existing) = release.find_asset(&name).cloned() {
                    self.api.delete_asset(existing.id).await?;
                    release.assets.retain(|a| a.id != existing.id);
                    debug!(asset = %existing.name, "existing asset replaced");
                }
            }
            let asset = self.upload(&release, path).await?;
            release.assets.push(asset);
        }
        Ok(release)
    }

    pub async fn delete(&self, selector: &ReleaseSelector) -> Result<()> {
        let release = self.get(selector).await?;
        if !self.api.delete_release(release.id).await? {
            return Err(ReleaseError::not_found("release", selector));
        }
        info!(id = release.id, tag = %release.tag_name, "release deleted");
        Ok(())
    }

    async fn upload(&self, release: &Release, path: &Path) -> Result<ReleaseAsset> {
        let name = asset_name(path)?;
        let data = tokio::fs::read(path).await?;
        let asset = self.api.upload_asset(release, &name, data).await?;
        obs::emit_asset_uploaded(release.id, &asset.name, asset.size);
        Ok(asset)
    }
}

fn ensure_tag_name(tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(ReleaseError::Configuration(
            "tag name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_assets_exist(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if !path.is_file() {
            return Err(ReleaseError::Configuration(format!(
                "asset file {} does not exist",
                path.display()
            )));
        }
    }
    Ok(())
}

fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ReleaseError::Configuration(format!("{} has no file name", path.display()))
        })
}
