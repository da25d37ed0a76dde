//! Label filtering and contributor credit for fetched issues.

use crate::domain::{Contributor, Issue, IssueReference, LabelsPolicy, RemoteIssue};

/// Rules that turn tracker issues into release notes issues.
#[derive(Debug, Clone, Copy)]
pub struct IssuePolicy<'a> {
    pub labels: &'a LabelsPolicy,
    /// Login of the repository owner.
    pub repo_owner: &'a str,
    /// Whether commits by the repository owner earn credit.
    pub credit_repo_owner: bool,
}

impl<'a> IssuePolicy<'a> {
    /// Labels of `issue` passing the allow-list, in tracker order.
    pub fn retained_labels(&self, issue: &RemoteIssue) -> Vec<String> {
        issue
            .labels
            .iter()
            .filter(|label| self.labels.should_include(label))
            .cloned()
            .collect()
    }

    /// Author of the first referencing commit that qualifies for credit.
    pub fn contributor(
        &self,
        issue_number: u64,
        references: &[IssueReference<'_>],
    ) -> Option<Contributor> {
        references
            .iter()
            .filter(|r| r.issue_number == issue_number)
            .filter_map(|r| r.commit.author.as_ref())
            .find(|author| {
                self.credit_repo_owner
                    || author.login.to_lowercase() != self.repo_owner.to_lowercase()
            })
            .map(Contributor::from)
    }

    /// `None` when no label survives the allow-list.
    pub fn to_issue(&self, issue: RemoteIssue, references: &[IssueReference<'_>]) -> Option<Issue> {
        let labels = self.retained_labels(&issue);
        if labels.is_empty() {
            return None;
        }
        let contributor = self.contributor(issue.number, references);
        Some(Issue {
            number: issue.number,
            title: issue.title,
            url: issue.url,
            labels,
            contributor,
        })
    }

    /// Apply the policy to every issue, keeping input order.
    pub fn apply(
        &self,
        issues: Vec<RemoteIssue>,
        references: &[IssueReference<'_>],
    ) -> Vec<Issue> {
        issues
            .into_iter()
            .filter_map(|issue| self.to_issue(issue, references))
            .collect()
    }
}
