//! GitHub repository identity derived from git remotes.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ReleaseError, Result};
use crate::git::Remote;

fn github_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)github\.com[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
            .expect("github url regex is valid")
    })
}

/// Owner and name of a repository hosted on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub owner: String,
    pub name: String,
}

impl GitHubRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(ReleaseError::Configuration(
                "repository owner must not be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(ReleaseError::Configuration(
                "repository name must not be empty".to_string(),
            ));
        }
        Ok(Self { owner, name })
    }

    /// Parse `https://github.com/o/r(.git)` or `git@github.com:o/r(.git)`.
    pub fn from_url(url: &str) -> Option<Self> {
        let caps = github_url_regex().captures(url.trim())?;
        Some(Self {
            owner: caps.get(1)?.as_str().to_string(),
            name: caps.get(2)?.as_str().to_string(),
        })
    }

    /// First GitHub repository among `remotes`, trying `origin` first and
    /// the rest by lower-cased name.
    pub fn find_by_remotes(remotes: &[Remote]) -> Result<Self> {
        let mut ordered: Vec<&Remote> = remotes.iter().collect();
        ordered.sort_by_key(|remote| {
            let name = remote.name.to_lowercase();
            (name != "origin", name)
        });
        ordered
            .into_iter()
            .find_map(|remote| Self::from_url(&remote.url))
            .ok_or_else(|| {
                ReleaseError::Configuration(
                    "no git remote points to a GitHub repository".to_string(),
                )
            })
    }
}

impl std::fmt::Display for GitHubRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, url: &str) -> Remote {
        Remote {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn parses_common_url_shapes() {
        for url in [
            "https://github.com/owner/name",
            "https://github.com/owner/name.git",
            "https://github.com/owner/name/",
            "git@github.com:owner/name.git",
            "ssh://git@github.com/owner/name.git",
            "HTTPS://GitHub.com/owner/name",
        ] {
            let repo = GitHubRepository::from_url(url).unwrap_or_else(|| panic!("{url}"));
            assert_eq!(repo.owner, "owner", "{url}");
            assert_eq!(repo.name, "name", "{url}");
        }
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(GitHubRepository::from_url("https://gitlab.com/owner/name.git").is_none());
        assert!(GitHubRepository::from_url("https://github.com/owner").is_none());
    }

    #[test]
    fn origin_wins_over_other_remotes() {
        let remotes = vec![
            remote("aaa", "https://github.com/fork/name.git"),
            remote("Origin", "git@github.com:owner/name.git"),
        ];
        let repo = GitHubRepository::find_by_remotes(&remotes).unwrap();
        assert_eq!(repo, GitHubRepository::new("owner", "name").unwrap());
    }

    #[test]
    fn non_github_origin_falls_through() {
        let remotes = vec![
            remote("origin", "https://gitlab.com/owner/name.git"),
            remote("Zeta", "https://github.com/zeta/name"),
            remote("beta", "https://github.com/beta/name"),
        ];
        let repo = GitHubRepository::find_by_remotes(&remotes).unwrap();
        assert_eq!(repo.owner, "beta");
    }

    #[test]
    fn no_matching_remote_is_configuration_error() {
        let err = GitHubRepository::find_by_remotes(&[]).unwrap_err();
        assert!(matches!(err, ReleaseError::Configuration(_)));
    }

    #[test]
    fn new_rejects_blank_parts() {
        assert!(GitHubRepository::new("", "name").is_err());
        assert!(GitHubRepository::new("owner", " ").is_err());
        assert_eq!(
            GitHubRepository::new("o", "r").unwrap().to_string(),
            "o/r"
        );
    }
}
