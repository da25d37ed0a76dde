pub mod error;
pub mod issue;
pub mod label;
pub mod release;

pub use error::{ReleaseError, Result};
pub use issue::{Commit, CommitAuthor, Contributor, Issue, IssueReference, RemoteIssue};
pub use label::{LabelConfig, LabelsPolicy};
pub use release::{
    AssetChanges, NewRelease, Release, ReleaseAsset, ReleaseChanges, ReleaseSelector,
};
