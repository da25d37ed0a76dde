use std::fmt::Write as _;

use crate::notes::ReleaseNotes;

use super::{non_empty, FormattedReleaseNotes, ReleaseNotesFormatter};

/// Plain text grouped by label, for consumers without markdown support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainTextFormatter;

impl ReleaseNotesFormatter for PlainTextFormatter {
    fn format(&self, header: Option<&str>, notes: &ReleaseNotes) -> FormattedReleaseNotes {
        let mut out = String::new();

        if let Some(header) = non_empty(header) {
            let _ = writeln!(out, "{header}\n");
        }

        for group in notes.issues_by_label() {
            let _ = writeln!(out, "{}:", group.label.display_name());
            for issue in group.issues {
                let _ = write!(out, "- #{} {}", issue.number, issue.title);
                if let Some(contributor) = &issue.contributor {
                    let _ = write!(out, " (@{})", contributor.login);
                }
                out.push('\n');
            }
        }

        FormattedReleaseNotes::from(out)
    }
}
