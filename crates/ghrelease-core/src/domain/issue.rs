//! Commits, issues and contributors as seen by the release notes pipeline.

use serde::{Deserialize, Serialize};

use crate::domain::label::same_label;

/// Tracker account that authored a commit.
///
/// Absent on a [`Commit`] when the tracker cannot match the commit email
/// with an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub login: String,
    /// Profile page of the account.
    pub url: String,
}

/// A commit in the scanned range, in the order returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: Option<CommitAuthor>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, login: impl Into<String>, url: impl Into<String>) -> Self {
        self.author = Some(CommitAuthor {
            login: login.into(),
            url: url.into(),
        });
        self
    }
}

/// An issue number referenced by a closing keyword in a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueReference<'a> {
    pub commit: &'a Commit,
    pub issue_number: u64,
}

/// Issue metadata as returned by the tracker, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    pub url: String,
    /// Label names. The tracker does not guarantee an order.
    pub labels: Vec<String>,
}

/// The account credited with closing an issue.
///
/// Two contributors are the same when their logins are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub url: String,
}

impl PartialEq for Contributor {
    fn eq(&self, other: &Self) -> bool {
        self.login == other.login
    }
}

impl Eq for Contributor {}

impl std::hash::Hash for Contributor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.login.hash(state);
    }
}

impl From<&CommitAuthor> for Contributor {
    fn from(author: &CommitAuthor) -> Self {
        Contributor {
            login: author.login.clone(),
            url: author.url.clone(),
        }
    }
}

/// An issue included in release notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub url: String,
    /// Labels that passed the allow-list, in tracker order.
    pub labels: Vec<String>,
    /// `None` when no commit author qualified for credit.
    pub contributor: Option<Contributor>,
}

impl Issue {
    /// Whether the issue carries `label`, compared case-insensitively.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| same_label(l, label))
    }
}
