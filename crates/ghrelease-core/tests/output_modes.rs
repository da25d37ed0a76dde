use std::fs;

use ghrelease_core::{CancellationToken, FormattedReleaseNotes, OutputMode};

fn notes(s: &str) -> FormattedReleaseNotes {
    FormattedReleaseNotes::from(s.to_string())
}

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn prepend_puts_new_content_first_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.md");
    fs::write(&path, "OLD").unwrap();

    notes("NEW")
        .write_to_file(&path, OutputMode::Prepend, &CancellationToken::new())
        .expect("prepend");

    assert_eq!(fs::read_to_string(&path).unwrap(), "NEWOLD");
    assert_eq!(entries(dir.path()), vec!["notes.md"]);
}

#[test]
fn append_adds_at_the_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.md");
    fs::write(&path, "OLD").unwrap();

    notes("NEW")
        .write_to_file(&path, OutputMode::Append, &CancellationToken::new())
        .expect("append");

    assert_eq!(fs::read_to_string(&path).unwrap(), "OLDNEW");
}

#[test]
fn append_creates_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fresh.md");
    notes("NEW")
        .write_to_file(&path, OutputMode::Append, &CancellationToken::new())
        .expect("append");
    assert_eq!(fs::read_to_string(&path).unwrap(), "NEW");
}

#[test]
fn overwrite_replaces_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.md");
    fs::write(&path, "A much longer previous content").unwrap();

    notes("NEW")
        .write_to_file(&path, OutputMode::Overwrite, &CancellationToken::new())
        .expect("overwrite");

    assert_eq!(fs::read_to_string(&path).unwrap(), "NEW");
}

#[test]
fn repeated_prepends_stack_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("CHANGELOG.md");
    let cancel = CancellationToken::new();
    for version in ["v1\n", "v2\n", "v3\n"] {
        notes(version)
            .write_to_file(&path, OutputMode::Prepend, &cancel)
            .expect("prepend");
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "v3\nv2\nv1\n");
}

#[test]
fn writing_into_missing_directory_fails_with_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("notes.md");
    for mode in [OutputMode::Overwrite, OutputMode::Append, OutputMode::Prepend] {
        let err = notes("NEW")
            .write_to_file(&path, mode, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ghrelease_core::ReleaseError::Io(_)), "{mode}");
    }
}
