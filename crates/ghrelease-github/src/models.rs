//! Wire types of the GitHub REST API and their domain conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ghrelease_core::{Commit, CommitAuthor, NewRelease, Release, ReleaseAsset, RemoteIssue};

#[derive(Debug, Deserialize)]
pub struct AccountWire {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GitCommitWire {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitWire {
    pub sha: String,
    pub commit: GitCommitWire,
    /// `null` when the commit email is not linked to an account.
    #[serde(default)]
    pub author: Option<AccountWire>,
}

impl From<CommitWire> for Commit {
    fn from(wire: CommitWire) -> Self {
        Commit {
            sha: wire.sha,
            message: wire.commit.message,
            author: wire.author.map(|a| CommitAuthor {
                login: a.login,
                url: a.html_url,
            }),
        }
    }
}

/// `GET /repos/{owner}/{repo}/compare/{base}...{head}`
#[derive(Debug, Deserialize)]
pub struct CompareWire {
    pub base_commit: CommitWire,
    #[serde(default)]
    pub commits: Vec<CommitWire>,
    #[serde(default)]
    pub total_commits: usize,
}

#[derive(Debug, Deserialize)]
pub struct LabelWire {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueWire {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<LabelWire>,
}

impl From<IssueWire> for RemoteIssue {
    fn from(wire: IssueWire) -> Self {
        RemoteIssue {
            number: wire.number,
            title: wire.title,
            url: wire.html_url,
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetWire {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub browser_download_url: String,
}

impl From<AssetWire> for ReleaseAsset {
    fn from(wire: AssetWire) -> Self {
        ReleaseAsset {
            id: wire.id,
            name: wire.name,
            size: wire.size,
            download_url: wire.browser_download_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReleaseWire {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub target_commitish: String,
    #[serde(default)]
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    pub html_url: String,
    pub upload_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<AssetWire>,
}

impl From<ReleaseWire> for Release {
    fn from(wire: ReleaseWire) -> Self {
        Release {
            id: wire.id,
            name: wire.name.unwrap_or_default(),
            tag_name: wire.tag_name,
            target_commitish: wire.target_commitish,
            body: wire.body.unwrap_or_default(),
            draft: wire.draft,
            prerelease: wire.prerelease,
            html_url: wire.html_url,
            upload_url: wire.upload_url,
            created_at: wire.created_at,
            published_at: wire.published_at,
            assets: wire.assets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Serialize)]
pub struct CreateReleaseWire<'a> {
    pub tag_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub target_commitish: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

impl<'a> From<&'a NewRelease> for CreateReleaseWire<'a> {
    fn from(new: &'a NewRelease) -> Self {
        CreateReleaseWire {
            tag_name: &new.tag_name,
            name: &new.name,
            target_commitish: &new.target_commitish,
            body: &new.body,
            draft: new.draft,
            prerelease: new.prerelease,
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorWire {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl ApiErrorWire {
    pub fn describe(&self) -> String {
        let details: Vec<String> = self
            .errors
            .iter()
            .map(|e| match e.get("code").and_then(|c| c.as_str()) {
                Some(code) => code.to_string(),
                None => e.to_string(),
            })
            .collect();
        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_without_linked_account() {
        let wire: CommitWire = serde_json::from_str(
            r#"{"sha": "abc", "commit": {"message": "fixes #1"}, "author": null}"#,
        )
        .unwrap();
        let commit = Commit::from(wire);
        assert_eq!(commit.sha, "abc");
        assert!(commit.author.is_none());
    }

    #[test]
    fn compare_response() {
        let json = r#"{
            "base_commit": {"sha": "a", "commit": {"message": "base"}, "author": null},
            "commits": [
                {"sha": "b", "commit": {"message": "fixes #5"},
                 "author": {"login": "alice", "html_url": "https://github.com/alice", "id": 1}}
            ],
            "total_commits": 1,
            "status": "ahead"
        }"#;
        let wire: CompareWire = serde_json::from_str(json).unwrap();
        assert_eq!(wire.total_commits, 1);
        let commits: Vec<Commit> = wire.commits.into_iter().map(Into::into).collect();
        let author = commits[0].author.as_ref().unwrap();
        assert_eq!(author.login, "alice");
        assert_eq!(author.url, "https://github.com/alice");
    }

    #[test]
    fn issue_labels_are_names() {
        let json = r#"{
            "number": 5,
            "title": "Crash",
            "html_url": "https://github.com/o/r/issues/5",
            "labels": [{"id": 1, "name": "bug", "color": "f00"}, {"id": 2, "name": "ui"}],
            "state": "closed"
        }"#;
        let issue = RemoteIssue::from(serde_json::from_str::<IssueWire>(json).unwrap());
        assert_eq!(issue.labels, vec!["bug", "ui"]);
        assert_eq!(issue.url, "https://github.com/o/r/issues/5");
    }

    #[test]
    fn draft_release_with_nulls() {
        let json = r#"{
            "id": 7,
            "name": null,
            "tag_name": "v1.0.0",
            "target_commitish": "main",
            "body": null,
            "draft": true,
            "prerelease": false,
            "html_url": "https://github.com/o/r/releases/tag/untagged-1",
            "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
            "created_at": "2026-01-01T00:00:00Z",
            "published_at": null,
            "assets": [{"id": 3, "name": "app.zip", "size": 10,
                        "browser_download_url": "https://github.com/o/r/releases/download/v1.0.0/app.zip"}]
        }"#;
        let release = Release::from(serde_json::from_str::<ReleaseWire>(json).unwrap());
        assert_eq!(release.name, "");
        assert_eq!(release.body, "");
        assert!(release.published_at.is_none());
        assert_eq!(release.assets[0].name, "app.zip");
    }

    #[test]
    fn create_body_skips_empty_optional_fields() {
        let new = NewRelease::new("v1.0.0");
        let body = serde_json::to_value(CreateReleaseWire::from(&new)).unwrap();
        assert_eq!(body["tag_name"], "v1.0.0");
        assert_eq!(body["draft"], true);
        assert!(body.get("name").is_none());
        assert!(body.get("target_commitish").is_none());
    }

    #[test]
    fn api_error_details() {
        let wire: ApiErrorWire = serde_json::from_str(
            r#"{"message": "Validation Failed", "errors": [{"resource": "Release", "code": "already_exists", "field": "tag_name"}]}"#,
        )
        .unwrap();
        assert_eq!(wire.describe(), "Validation Failed (already_exists)");
    }
}
