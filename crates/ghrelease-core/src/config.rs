//! Release notes configuration files.
//!
//! `ghrelease.json`, `ghrelease.jsonc`, `ghrelease.yml` or `ghrelease.yaml`.
//! JSON files may contain `//` and `/* */` comments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{ReleaseError, Result};
use crate::domain::LabelsPolicy;

const FILE_STEM: &str = "ghrelease";
const EXTENSIONS: [&str; 4] = ["json", "jsonc", "yml", "yaml"];

fn default_true() -> bool {
    true
}

/// Options of one release notes run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotesConfig {
    #[serde(default, alias = "Labels")]
    pub labels: LabelsPolicy,

    /// Credit the repository owner for issues they closed.
    #[serde(default = "default_true", alias = "CreditRepoOwner")]
    pub credit_repo_owner: bool,
}

impl Default for ReleaseNotesConfig {
    fn default() -> Self {
        Self {
            labels: LabelsPolicy::default(),
            credit_repo_owner: true,
        }
    }
}

impl ReleaseNotesConfig {
    pub fn ensure_valid(&self) -> Result<()> {
        self.labels.ensure_valid()
    }

    /// Load `path`, choosing JSON or YAML by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReleaseError::Configuration(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        let parsed = match extension.as_str() {
            "json" | "jsonc" => Self::from_json(&content),
            "yml" | "yaml" => Self::from_yaml(&content),
            _ => {
                return Err(ReleaseError::Configuration(format!(
                    "unsupported configuration file extension '{}': expected .json, .jsonc, .yml or .yaml",
                    extension
                )))
            }
        };
        parsed.map_err(|e| match e {
            ReleaseError::Configuration(msg) => {
                ReleaseError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(&strip_json_comments(content))
            .map_err(|e| ReleaseError::Configuration(format!("invalid JSON: {e}")))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| ReleaseError::Configuration(format!("invalid YAML: {e}")))
    }

    /// Path of the configuration file in `dir`, if any.
    pub fn file_in_directory(dir: &Path) -> Result<Option<PathBuf>> {
        if !dir.is_dir() {
            return Err(ReleaseError::Configuration(format!(
                "directory {} does not exist",
                dir.display()
            )));
        }
        Ok(EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{FILE_STEM}.{ext}")))
            .find(|candidate| candidate.is_file()))
    }

    /// Load the configuration file in `dir`, if any.
    pub fn find_in_directory(dir: &Path) -> Result<Option<Self>> {
        match Self::file_in_directory(dir)? {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Configuration from the repository root, then the current directory,
    /// else defaults.
    pub fn discover(repo_root: &Path) -> Result<Self> {
        if let Some(config) = Self::find_in_directory(repo_root)? {
            return Ok(config);
        }
        let cwd = std::env::current_dir()?;
        Ok(Self::find_in_directory(&cwd)?.unwrap_or_default())
    }
}

/// Where a run gets its configuration from.
#[derive(Debug, Clone, Default)]
pub enum ConfigSource {
    /// [`ReleaseNotesConfig::discover`] from the repository root.
    #[default]
    Discover,
    File(PathBuf),
    Inline(ReleaseNotesConfig),
}

impl ConfigSource {
    pub fn load(&self, repo_root: &Path) -> Result<ReleaseNotesConfig> {
        match self {
            ConfigSource::Discover => ReleaseNotesConfig::discover(repo_root),
            ConfigSource::File(path) => ReleaseNotesConfig::from_file(path),
            ConfigSource::Inline(config) => Ok(config.clone()),
        }
    }
}

/// Remove `//` line comments and `/* */` block comments outside of strings.
pub fn strip_json_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}
