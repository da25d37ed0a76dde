//! The release notes aggregate.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::label::same_label;
use crate::domain::{Contributor, Issue, LabelConfig, LabelsPolicy};

/// Issues of one label, in issue order.
#[derive(Debug, Clone, Serialize)]
pub struct LabelGroup<'a> {
    pub label: LabelConfig,
    pub issues: Vec<&'a Issue>,
}

/// Immutable result of one release notes run.
///
/// Every view is derived from `issues` on read. Labels and contributors
/// appear in first-seen order.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseNotes {
    issues: Vec<Issue>,
    labels: LabelsPolicy,
}

impl ReleaseNotes {
    pub fn new(issues: Vec<Issue>, labels: LabelsPolicy) -> Self {
        Self { issues, labels }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Distinct labels across all issues, resolved against the label
    /// configuration.
    pub fn labels(&self) -> Vec<LabelConfig> {
        let mut seen: Vec<&str> = Vec::new();
        for label in self.issues.iter().flat_map(|i| i.labels.iter()) {
            if !seen.iter().any(|s| same_label(s, label)) {
                seen.push(label);
            }
        }
        seen.into_iter().map(|l| self.labels.resolve(l)).collect()
    }

    pub fn issues_with_label(&self, label: &str) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.has_label(label)).collect()
    }

    pub fn issues_by_label(&self) -> Vec<LabelGroup<'_>> {
        self.labels()
            .into_iter()
            .map(|label| {
                let issues = self.issues_with_label(&label.name);
                LabelGroup { label, issues }
            })
            .collect()
    }

    /// Distinct credited contributors.
    pub fn contributors(&self) -> Vec<&Contributor> {
        let mut seen = HashSet::new();
        self.issues
            .iter()
            .filter_map(|i| i.contributor.as_ref())
            .filter(|c| seen.insert(c.login.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64, labels: &[&str], login: Option<&str>) -> Issue {
        Issue {
            number,
            title: format!("issue {number}"),
            url: format!("https://github.com/o/r/issues/{number}"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            contributor: login.map(|l| Contributor {
                login: l.to_string(),
                url: format!("https://github.com/{l}"),
            }),
        }
    }

    fn notes() -> ReleaseNotes {
        ReleaseNotes::new(
            vec![
                issue(1, &["bug"], Some("alice")),
                issue(2, &["enhancement", "Bug"], Some("carol")),
                issue(3, &["docs"], Some("alice")),
            ],
            LabelsPolicy {
                include: vec![],
                configs: vec![LabelConfig::new("bug").with_display_name("Bug fixes")],
            },
        )
    }

    #[test]
    fn labels_are_distinct_in_first_seen_order() {
        let labels = notes().labels();
        let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["bug", "enhancement", "docs"]);
        assert_eq!(labels[0].display_name(), "Bug fixes");
        assert_eq!(labels[1].display_name(), "enhancement");
    }

    #[test]
    fn issue_can_appear_under_several_labels() {
        let notes = notes();
        let groups = notes.issues_by_label();
        assert_eq!(groups.len(), 3);
        let bug: Vec<_> = groups[0].issues.iter().map(|i| i.number).collect();
        assert_eq!(bug, vec![1, 2]);
        let enhancement: Vec<_> = groups[1].issues.iter().map(|i| i.number).collect();
        assert_eq!(enhancement, vec![2]);
        assert_eq!(notes.issues().len(), 3);
    }

    #[test]
    fn issues_with_label_ignores_case() {
        let notes = notes();
        assert_eq!(notes.issues_with_label("BUG").len(), 2);
        assert!(notes.issues_with_label("missing").is_empty());
    }

    #[test]
    fn contributors_are_distinct_by_login() {
        let notes = notes();
        let logins: Vec<_> = notes.contributors().iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, vec!["alice", "carol"]);
    }

    #[test]
    fn empty_notes_have_no_views() {
        let notes = ReleaseNotes::new(vec![], LabelsPolicy::default());
        assert!(notes.is_empty());
        assert!(notes.labels().is_empty());
        assert!(notes.issues_by_label().is_empty());
        assert!(notes.contributors().is_empty());
    }
}
