//! Issue references in commit messages.
//!
//! A reference is a closing keyword (`close`, `fix`, `resolve` and their
//! `-s`/`-d` forms, any case), an optional colon, horizontal whitespace and
//! `#<number>`, e.g. `Fixes #12` or `closed: #7`.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{Commit, IssueReference};

fn issue_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:close[sd]?|fix(?:es|ed)?|resolve[sd]?):?[^\S\r\n]+#(\d+)")
            .expect("issue link regex is valid")
    })
}

/// Issue numbers referenced in `message`, in order of appearance.
///
/// Duplicates are kept; callers deduplicate when they need distinct numbers.
pub fn issue_numbers(message: &str) -> impl Iterator<Item = u64> + '_ {
    issue_link_regex()
        .captures_iter(message)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Every (commit, issue number) pair in `commits`, preserving commit order.
pub fn issue_references(commits: &[Commit]) -> impl Iterator<Item = IssueReference<'_>> {
    commits.iter().flat_map(|commit| {
        issue_numbers(&commit.message).map(move |issue_number| IssueReference {
            commit,
            issue_number,
        })
    })
}

/// Distinct issue numbers in first-seen order.
pub fn distinct_issue_numbers<'a, 'c: 'a>(
    references: impl IntoIterator<Item = &'a IssueReference<'c>>,
) -> Vec<u64> {
    let mut seen = std::collections::HashSet::new();
    references
        .into_iter()
        .map(|r| r.issue_number)
        .filter(|n| seen.insert(*n))
        .collect()
}
