use std::fmt::Write as _;

use crate::domain::error::{ReleaseError, Result};
use crate::notes::ReleaseNotes;

use super::{non_empty, FormattedReleaseNotes, ReleaseNotesFormatter};

/// Markdown with one section per label and links to issues and
/// contributors.
///
/// The header uses the configured heading level. Label sections go one
/// level deeper, never above `##`. An issue with several labels is listed
/// in each of their sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownFormatter {
    heading_level: usize,
}

impl MarkdownFormatter {
    pub const MIN_HEADING_LEVEL: usize = 1;
    pub const MAX_HEADING_LEVEL: usize = 5;

    pub fn new(heading_level: usize) -> Result<Self> {
        if !(Self::MIN_HEADING_LEVEL..=Self::MAX_HEADING_LEVEL).contains(&heading_level) {
            return Err(ReleaseError::ArgumentOutOfRange {
                name: "heading_level".to_string(),
                value: i64::try_from(heading_level).unwrap_or(i64::MAX),
                message: format!(
                    "heading level must be between {} and {}",
                    Self::MIN_HEADING_LEVEL,
                    Self::MAX_HEADING_LEVEL
                ),
            });
        }
        Ok(Self { heading_level })
    }

    pub fn heading_level(&self) -> usize {
        self.heading_level
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self { heading_level: 1 }
    }
}

impl ReleaseNotesFormatter for MarkdownFormatter {
    fn format(&self, header: Option<&str>, notes: &ReleaseNotes) -> FormattedReleaseNotes {
        let mut out = String::new();
        let mut level = self.heading_level;

        if let Some(header) = non_empty(header) {
            let _ = writeln!(out, "{} {}\n", "#".repeat(level), header);
            level += 1;
        }
        let level = level.max(2);

        for group in notes.issues_by_label() {
            let _ = writeln!(out, "{} {}\n", "#".repeat(level), group.label.display_name());
            for issue in group.issues {
                let _ = write!(out, "- [#{}]({}) {}", issue.number, issue.url, issue.title);
                if let Some(contributor) = &issue.contributor {
                    let _ = write!(out, " ([@{}]({}))", contributor.login, contributor.url);
                }
                out.push('\n');
            }
        }
        out.push('\n');

        FormattedReleaseNotes::from(out)
    }
}
