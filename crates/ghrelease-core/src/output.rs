//! Writing formatted release notes to files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::error::{ReleaseError, Result};
use crate::format::FormattedReleaseNotes;

/// How release notes are written to an existing file. Every mode creates
/// the file when it does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Overwrite,
    Append,
    /// New notes go before the existing content. The file is replaced
    /// atomically through a temporary file in the same directory.
    Prepend,
}

impl OutputMode {
    /// Default markdown heading level: a whole document gets `#`, a
    /// section added to an existing changelog gets `##`.
    pub fn markdown_heading_level(self) -> usize {
        match self {
            OutputMode::Overwrite => 1,
            OutputMode::Append | OutputMode::Prepend => 2,
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputMode::Overwrite => "overwrite",
            OutputMode::Append => "append",
            OutputMode::Prepend => "prepend",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OutputMode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(OutputMode::Overwrite),
            "append" => Ok(OutputMode::Append),
            "prepend" => Ok(OutputMode::Prepend),
            other => Err(ReleaseError::Configuration(format!(
                "unknown output mode: {other}"
            ))),
        }
    }
}

impl FormattedReleaseNotes {
    /// Write the notes to `path` using `mode`.
    pub fn write_to_file(
        &self,
        path: &Path,
        mode: OutputMode,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(ReleaseError::Cancelled);
        }
        debug!(path = %path.display(), %mode, "writing release notes");
        match mode {
            OutputMode::Overwrite => fs::write(path, self.as_str())?,
            OutputMode::Append => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(self.as_str().as_bytes())?;
                file.flush()?;
            }
            OutputMode::Prepend => prepend(path, self.as_str().as_bytes(), cancel)?,
        }
        Ok(())
    }
}

fn prepend(path: &Path, content: &[u8], cancel: &CancellationToken) -> Result<()> {
    let existing = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    if cancel.is_cancelled() {
        return Err(ReleaseError::Cancelled);
    }
    tmp.write_all(&existing)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
