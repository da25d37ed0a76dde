//! ghrelease core library
//!
//! Release notes from git history and closed issues, plus release
//! management, behind tracker-agnostic traits.

pub mod cache;
pub mod config;
pub mod creator;
pub mod domain;
pub mod extract;
pub mod fakes;
pub mod format;
pub mod git;
pub mod notes;
pub mod obs;
pub mod output;
pub mod policy;
pub mod range;
pub mod releaser;
pub mod remote;
pub mod service;
pub mod telemetry;
pub mod tracker;

pub use domain::{
    AssetChanges, Commit, CommitAuthor, Contributor, Issue, IssueReference, LabelConfig,
    LabelsPolicy, NewRelease, Release, ReleaseAsset, ReleaseChanges, ReleaseError,
    ReleaseSelector, RemoteIssue, Result,
};

pub use cache::ReleaseNotesCache;
pub use config::{ConfigSource, ReleaseNotesConfig};
pub use creator::ReleaseNotesCreator;
pub use format::{
    FormattedReleaseNotes, MarkdownFormatter, PlainTextFormatter, ReleaseNotesFormat,
    ReleaseNotesFormatter,
};
pub use git::{is_git_repo, GitRepository, LocalRepository, Remote, Tag};
pub use notes::{LabelGroup, ReleaseNotes};
pub use output::OutputMode;
pub use range::{resolve_range, CommitRange};
pub use releaser::Releaser;
pub use remote::GitHubRepository;
pub use service::{NotesRequest, ReleaseNotesService};
pub use telemetry::init_tracing;
pub use tracker::{fetch_issues, IssueTracker, ReleaseApi};

/// Re-exported so callers can pass cancellation without depending on
/// `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
