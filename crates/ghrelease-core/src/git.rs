//! Local git repository access.
//!
//! [`GitRepository`] runs the `git` binary. Tests and embedders can supply
//! their own [`LocalRepository`] instead.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use regex::Regex;
use tracing::debug;

use crate::domain::error::{ReleaseError, Result};

/// A configured remote of the local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// A tag and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Commit id the tag resolves to (annotated tags are peeled).
    pub target: String,
    /// Creator date as a unix timestamp: tagger date for annotated tags,
    /// committer date for lightweight tags.
    pub created_at: i64,
}

/// Orders tags newest first by creator date, then by name descending.
pub fn sort_tags(tags: &mut [Tag]) {
    tags.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    });
}

/// Read access to the local repository needed by the release notes pipeline.
pub trait LocalRepository: Send + Sync {
    /// Tip of the current branch, `None` for a repository without commits.
    fn head_commit(&self) -> Result<Option<String>>;

    /// Oldest commit reachable from HEAD in topological order.
    fn first_commit(&self) -> Result<Option<String>>;

    fn remotes(&self) -> Result<Vec<Remote>>;

    /// All tags, in the order defined by [`sort_tags`].
    fn tags(&self) -> Result<Vec<Tag>>;

    /// First tag in [`LocalRepository::tags`] order whose name matches
    /// `pattern` (any tag when `pattern` is `None`).
    fn latest_tag(&self, pattern: Option<&Regex>) -> Result<Option<Tag>> {
        Ok(self
            .tags()?
            .into_iter()
            .find(|tag| pattern.map_or(true, |re| re.is_match(&tag.name))))
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// [`LocalRepository`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `root`.
    ///
    /// Fails if `root` does not exist or is not inside a git work tree.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ReleaseError::Configuration(format!(
                "repository directory {} does not exist",
                root.display()
            )));
        }
        if !is_git_repo(root) {
            return Err(ReleaseError::Git(format!(
                "{} is not a git repository",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(?args, root = %self.root.display(), "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| ReleaseError::Git(format!("failed to run git: {e}")))
    }

    fn stdout(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl LocalRepository for GitRepository {
    fn head_commit(&self) -> Result<Option<String>> {
        // --quiet turns an unborn HEAD into a plain non-zero exit.
        let output = self.run(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!sha.is_empty()).then_some(sha))
    }

    fn first_commit(&self) -> Result<Option<String>> {
        if self.head_commit()?.is_none() {
            return Ok(None);
        }
        let out = self.stdout(&["rev-list", "--topo-order", "--reverse", "HEAD"])?;
        Ok(out.lines().next().map(|line| line.trim().to_string()))
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        let output = self.run(&["config", "--get-regexp", r"^remote\..*\.url$"])?;
        // Exit code 1 means no remote is configured.
        if output.status.code() == Some(1) {
            return Ok(Vec::new());
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::Git(format!(
                "failed to list remotes: {}",
                stderr.trim()
            )));
        }
        Ok(parse_remotes(&String::from_utf8_lossy(&output.stdout)))
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let out = self.stdout(&[
            "for-each-ref",
            "--format=%(refname:strip=2)%00%(objectname)%00%(*objectname)%00%(creatordate:unix)",
            "refs/tags",
        ])?;
        let mut tags = parse_tags(&out);
        sort_tags(&mut tags);
        Ok(tags)
    }
}

fn parse_remotes(out: &str) -> Vec<Remote> {
    out.lines()
        .filter_map(|line| {
            let (key, url) = line.split_once(char::is_whitespace)?;
            let name = key.strip_prefix("remote.")?.strip_suffix(".url")?;
            Some(Remote {
                name: name.to_string(),
                url: url.trim().to_string(),
            })
        })
        .collect()
}

fn parse_tags(out: &str) -> Vec<Tag> {
    out.lines()
        .filter_map(|line| {
            let mut fields = line.split('\0');
            let name = fields.next()?;
            let object = fields.next()?;
            let peeled = fields.next()?;
            let created_at = fields.next()?.trim().parse().unwrap_or(0);
            let target = if peeled.is_empty() { object } else { peeled };
            Some(Tag {
                name: name.to_string(),
                target: target.to_string(),
                created_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    const DAY: i64 = 86_400;
    const EPOCH: i64 = 1_767_225_600;

    fn run_git(repo_dir: &Path, args: &[&str], date: Option<i64>) -> String {
        let mut cmd = StdCommand::new("git");
        cmd.args(args).current_dir(repo_dir);
        if let Some(date) = date {
            let date = format!("{date} +0000");
            cmd.env("GIT_AUTHOR_DATE", &date)
                .env("GIT_COMMITTER_DATE", &date);
        }
        let output = cmd.output().unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn make_empty_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"], None);
        run_git(dir.path(), &["config", "user.name", "test-user"], None);
        run_git(dir.path(), &["config", "user.email", "test@example.com"], None);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"], None);
        run_git(dir.path(), &["config", "tag.gpgsign", "false"], None);
        dir
    }

    fn commit(repo_dir: &Path, message: &str, day: i64) -> String {
        run_git(
            repo_dir,
            &["commit", "--allow-empty", "-m", message],
            Some(EPOCH + day * DAY),
        );
        run_git(repo_dir, &["rev-parse", "HEAD"], None)
    }

    #[test]
    fn open_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitRepository::open(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::Git(_)));
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitRepository::open(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ReleaseError::Configuration(_)));
    }

    #[test]
    fn empty_repo_has_no_head_or_first_commit() {
        let dir = make_empty_repo();
        let repo = GitRepository::open(dir.path()).unwrap();
        assert_eq!(repo.head_commit().unwrap(), None);
        assert_eq!(repo.first_commit().unwrap(), None);
        assert!(repo.tags().unwrap().is_empty());
    }

    #[test]
    fn head_and_first_commit() {
        let dir = make_empty_repo();
        let first = commit(dir.path(), "initial", 0);
        commit(dir.path(), "second", 1);
        let third = commit(dir.path(), "third", 2);

        let repo = GitRepository::open(dir.path()).unwrap();
        let head = repo.head_commit().unwrap().unwrap();
        assert_eq!(head.len(), 40, "SHA should be 40 hex chars, got: {head}");
        assert_eq!(head, third);
        assert_eq!(repo.first_commit().unwrap(), Some(first));
    }

    #[test]
    fn remotes_are_listed() {
        let dir = make_empty_repo();
        let repo = GitRepository::open(dir.path()).unwrap();
        assert!(repo.remotes().unwrap().is_empty());

        run_git(
            dir.path(),
            &["remote", "add", "origin", "git@github.com:owner/name.git"],
            None,
        );
        run_git(
            dir.path(),
            &["remote", "add", "upstream", "https://github.com/other/name"],
            None,
        );

        let mut remotes = repo.remotes().unwrap();
        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            remotes,
            vec![
                Remote {
                    name: "origin".to_string(),
                    url: "git@github.com:owner/name.git".to_string(),
                },
                Remote {
                    name: "upstream".to_string(),
                    url: "https://github.com/other/name".to_string(),
                },
            ]
        );
    }

    #[test]
    fn tags_are_ordered_newest_first() {
        let dir = make_empty_repo();
        let a = commit(dir.path(), "a", 0);
        run_git(dir.path(), &["tag", "v1.10"], None);
        let b = commit(dir.path(), "b", 1);
        run_git(dir.path(), &["tag", "v1.9"], None);

        let repo = GitRepository::open(dir.path()).unwrap();
        let tags = repo.tags().unwrap();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        // Name order would put v1.9 last; creator date puts it first.
        assert_eq!(names, vec!["v1.9", "v1.10"]);
        assert_eq!(tags[0].target, b);
        assert_eq!(tags[1].target, a);
    }

    #[test]
    fn tags_with_equal_dates_are_ordered_by_name_descending() {
        let dir = make_empty_repo();
        commit(dir.path(), "a", 0);
        run_git(dir.path(), &["tag", "alpha"], None);
        run_git(dir.path(), &["tag", "beta"], None);

        let repo = GitRepository::open(dir.path()).unwrap();
        let names: Vec<_> = repo.tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
    }

    #[test]
    fn annotated_tags_resolve_to_their_commit() {
        let dir = make_empty_repo();
        let a = commit(dir.path(), "a", 0);
        run_git(
            dir.path(),
            &["tag", "-a", "v1.0", "-m", "release 1.0"],
            Some(EPOCH + DAY),
        );

        let repo = GitRepository::open(dir.path()).unwrap();
        let tag = repo.latest_tag(None).unwrap().unwrap();
        assert_eq!(tag.name, "v1.0");
        assert_eq!(tag.target, a);
        assert_eq!(tag.created_at, EPOCH + DAY);
    }

    #[test]
    fn latest_tag_honours_pattern() {
        let dir = make_empty_repo();
        let a = commit(dir.path(), "a", 0);
        run_git(dir.path(), &["tag", "v1.0.0"], None);
        commit(dir.path(), "b", 1);
        run_git(dir.path(), &["tag", "build-42"], None);

        let repo = GitRepository::open(dir.path()).unwrap();
        assert_eq!(repo.latest_tag(None).unwrap().unwrap().name, "build-42");

        let semver = Regex::new(r"^v\d+\.\d+\.\d+$").unwrap();
        let tag = repo.latest_tag(Some(&semver)).unwrap().unwrap();
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.target, a);

        let none = Regex::new("^release-").unwrap();
        assert!(repo.latest_tag(Some(&none)).unwrap().is_none());
    }

    #[test]
    fn parse_remotes_skips_malformed_lines() {
        let remotes = parse_remotes(
            "remote.origin.url https://github.com/o/r.git\ngarbage\nremote.fork.url git@github.com:f/r\n",
        );
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[1].name, "fork");
    }

    #[test]
    fn sort_tags_is_deterministic() {
        let mut tags = vec![
            Tag {
                name: "a".to_string(),
                target: "1".to_string(),
                created_at: 10,
            },
            Tag {
                name: "c".to_string(),
                target: "2".to_string(),
                created_at: 20,
            },
            Tag {
                name: "b".to_string(),
                target: "3".to_string(),
                created_at: 10,
            },
        ];
        sort_tags(&mut tags);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }
}
