use std::path::PathBuf;

use ghrelease_core::fakes::MemoryReleaseApi;
use ghrelease_core::{
    AssetChanges, CancellationToken, NewRelease, ReleaseApi, ReleaseChanges, ReleaseError,
    ReleaseSelector, Releaser,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_asset(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write asset");
    path
}

fn new_release(tag: &str, assets: Vec<PathBuf>) -> NewRelease {
    NewRelease {
        name: format!("Release {tag}"),
        body: "notes".to_string(),
        assets,
        ..NewRelease::new(tag)
    }
}

// ---------------------------------------------------------------------------
// create / get / list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_uploads_assets_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let zip = write_asset(&dir, "app.zip", b"zip-bytes");
    let sum = write_asset(&dir, "SHA256SUMS", b"abc  app.zip\n");
    let releaser = Releaser::new(MemoryReleaseApi::new());

    let release = releaser
        .create(&new_release("v1.0.0", vec![zip, sum]), &CancellationToken::new())
        .await
        .expect("create");

    assert!(release.draft);
    assert_eq!(release.name, "Release v1.0.0");
    let names: Vec<_> = release.assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["app.zip", "SHA256SUMS"]);
    assert_eq!(release.assets[0].size, 9);
    assert_eq!(
        releaser.api().asset_content(release.assets[0].id),
        Some(b"zip-bytes".to_vec())
    );

    let fetched = releaser.get(&ReleaseSelector::Id(release.id)).await.unwrap();
    assert_eq!(fetched.assets.len(), 2);
    let by_tag = releaser
        .get(&ReleaseSelector::Tag("v1.0.0".to_string()))
        .await
        .unwrap();
    assert_eq!(by_tag.id, release.id);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    for tag in ["v1", "v2", "v3"] {
        releaser.create(&new_release(tag, vec![]), &cancel).await.unwrap();
    }
    let tags: Vec<_> = releaser
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.tag_name)
        .collect();
    assert_eq!(tags, vec!["v3", "v2", "v1"]);
}

#[tokio::test]
async fn get_missing_release_is_not_found() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let err = releaser
        .get(&ReleaseSelector::Tag("v9".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::NotFound { .. }));
    assert!(err.to_string().contains("v9"));
}

#[tokio::test]
async fn cancellation_stops_between_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_asset(&dir, "a.bin", b"a");
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = releaser
        .create(&new_release("v1", vec![a]), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());

    // The release record exists, its assets were never uploaded.
    let release = releaser
        .get(&ReleaseSelector::Tag("v1".to_string()))
        .await
        .unwrap();
    assert!(release.assets.is_empty());
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_changes_only_requested_fields() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    let created = releaser.create(&new_release("v1", vec![]), &cancel).await.unwrap();

    let changes = ReleaseChanges {
        body: Some("final notes".to_string()),
        draft: Some(false),
        ..Default::default()
    };
    let updated = releaser
        .update(
            &ReleaseSelector::Id(created.id),
            &changes,
            &AssetChanges::default(),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(updated.body, "final notes");
    assert!(!updated.draft);
    assert!(updated.published_at.is_some());
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.tag_name, "v1");
}

#[tokio::test]
async fn update_overwrites_asset_with_same_name() {
    let dir = tempfile::tempdir().unwrap();
    let v1 = write_asset(&dir, "app.zip", b"one");
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    let created = releaser
        .create(&new_release("v1", vec![v1]), &cancel)
        .await
        .unwrap();
    let old_id = created.assets[0].id;

    let other = tempfile::tempdir().unwrap();
    let v2 = write_asset(&other, "APP.zip", b"two!");
    let assets = AssetChanges {
        add: vec![v2],
        ..Default::default()
    };
    let updated = releaser
        .update(
            &ReleaseSelector::Tag("v1".to_string()),
            &ReleaseChanges::default(),
            &assets,
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(updated.assets.len(), 1);
    assert_eq!(updated.assets[0].name, "APP.zip");
    assert_eq!(updated.assets[0].size, 4);
    assert!(releaser.api().asset_content(old_id).is_none());
}

#[tokio::test]
async fn update_without_overwrite_conflicts_on_same_name() {
    let dir = tempfile::tempdir().unwrap();
    let zip = write_asset(&dir, "app.zip", b"one");
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    releaser
        .create(&new_release("v1", vec![zip.clone()]), &cancel)
        .await
        .unwrap();

    let assets = AssetChanges {
        add: vec![zip],
        clear_existing: false,
        overwrite_existing: false,
    };
    let err = releaser
        .update(
            &ReleaseSelector::Tag("v1".to_string()),
            &ReleaseChanges::default(),
            &assets,
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Remote { .. }));
}

#[tokio::test]
async fn update_can_clear_all_assets() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_asset(&dir, "a.bin", b"a");
    let b = write_asset(&dir, "b.bin", b"b");
    let c = write_asset(&dir, "c.bin", b"c");
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    let created = releaser
        .create(&new_release("v1", vec![a, b]), &cancel)
        .await
        .unwrap();

    let assets = AssetChanges {
        add: vec![c],
        clear_existing: true,
        overwrite_existing: true,
    };
    let updated = releaser
        .update(
            &ReleaseSelector::Id(created.id),
            &ReleaseChanges::default(),
            &assets,
            &cancel,
        )
        .await
        .unwrap();

    let names: Vec<_> = updated.assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["c.bin"]);
    let stored = releaser.api().list_assets(created.id).await.unwrap().unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn update_validates_before_remote_calls() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    releaser.create(&new_release("v1", vec![]), &cancel).await.unwrap();

    let blank_tag = ReleaseChanges {
        tag_name: Some(" ".to_string()),
        ..Default::default()
    };
    let err = releaser
        .update(
            &ReleaseSelector::Tag("v1".to_string()),
            &blank_tag,
            &AssetChanges::default(),
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Configuration(_)));

    let missing_asset = AssetChanges {
        add: vec![PathBuf::from("/nope/missing.zip")],
        ..Default::default()
    };
    let err = releaser
        .update(
            &ReleaseSelector::Tag("v1".to_string()),
            &ReleaseChanges::default(),
            &missing_asset,
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Configuration(_)));
}

#[tokio::test]
async fn update_missing_release_is_not_found() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let err = releaser
        .update(
            &ReleaseSelector::Id(404),
            &ReleaseChanges::default(),
            &AssetChanges::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_release() {
    let releaser = Releaser::new(MemoryReleaseApi::new());
    let cancel = CancellationToken::new();
    releaser.create(&new_release("v1", vec![]), &cancel).await.unwrap();

    releaser
        .delete(&ReleaseSelector::Tag("v1".to_string()))
        .await
        .expect("delete");
    assert_eq!(releaser.api().release_count(), 0);

    let err = releaser
        .delete(&ReleaseSelector::Tag("v1".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::NotFound { .. }));
}
