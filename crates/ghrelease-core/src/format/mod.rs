//! Rendering release notes to text.

mod markdown;
mod plain;

pub use markdown::MarkdownFormatter;
pub use plain::PlainTextFormatter;

use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::notes::ReleaseNotes;
use crate::output::OutputMode;

/// Renders a [`ReleaseNotes`] aggregate.
pub trait ReleaseNotesFormatter: Send + Sync {
    /// `header` is omitted when `None` or empty.
    fn format(&self, header: Option<&str>, notes: &ReleaseNotes) -> FormattedReleaseNotes;
}

/// Rendered release notes text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedReleaseNotes(String);

impl FormattedReleaseNotes {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for FormattedReleaseNotes {
    fn from(s: String) -> Self {
        FormattedReleaseNotes(s)
    }
}

impl From<FormattedReleaseNotes> for String {
    fn from(notes: FormattedReleaseNotes) -> Self {
        notes.0
    }
}

impl std::fmt::Display for FormattedReleaseNotes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseNotesFormat {
    #[default]
    Markdown,
    PlainText,
}

impl ReleaseNotesFormat {
    /// Built-in formatter for this format. Markdown headings start at the
    /// level suited to `mode`.
    pub fn formatter(self, mode: OutputMode) -> Result<Box<dyn ReleaseNotesFormatter>> {
        Ok(match self {
            ReleaseNotesFormat::Markdown => {
                Box::new(MarkdownFormatter::new(mode.markdown_heading_level())?)
            }
            ReleaseNotesFormat::PlainText => Box::new(PlainTextFormatter),
        })
    }
}

fn non_empty(header: Option<&str>) -> Option<&str> {
    header.filter(|h| !h.is_empty())
}
