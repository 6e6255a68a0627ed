use time::Date;

use crate::schema::{CommunityEvent, Issue, IssueStatus};

/// Issue counters shown on a corporator's ward panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WardIssueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl WardIssueStats {
    pub fn for_ward(issues: &[Issue], ward_number: u32) -> Self {
        issues
            .iter()
            .filter(|issue| issue.ward_number == ward_number)
            .fold(Self::default(), |mut stats, issue| {
                stats.total += 1;
                match issue.status {
                    IssueStatus::Pending => stats.pending += 1,
                    IssueStatus::InProgress => stats.in_progress += 1,
                    IssueStatus::Resolved => stats.resolved += 1,
                }
                stats
            })
    }

    /// Share of resolved issues, rounded to a whole percent. 0 when empty.
    pub fn resolution_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.resolved as f64 / self.total as f64) * 100.0).round() as u32
    }
}

pub fn issues_for_ward(issues: &[Issue], ward_number: u32, status: Option<IssueStatus>) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|issue| issue.ward_number == ward_number)
        .filter(|issue| status.is_none_or(|status| issue.status == status))
        .collect()
}

pub fn upcoming_events(events: &[CommunityEvent], today: Date) -> Vec<&CommunityEvent> {
    events.iter().filter(|event| event.is_upcoming(today)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IssueCategory;

    fn issue(ward_number: u32, status: IssueStatus) -> Issue {
        Issue {
            id: format!("{ward_number}-{status}"),
            title: String::new(),
            description: String::new(),
            category: IssueCategory::Garbage,
            status,
            ward_number,
            location: String::new(),
            latitude: None,
            longitude: None,
            image_urls: Vec::new(),
            user_name: String::new(),
            user_email: String::new(),
            upvotes: 0,
            created_at: String::new(),
            updated_at: String::new(),
            resolved_at: None,
            corporator_response: None,
            resolved_image_urls: None,
        }
    }

    #[test]
    fn counts_only_the_requested_ward() {
        let issues = vec![
            issue(32, IssueStatus::Pending),
            issue(32, IssueStatus::Resolved),
            issue(32, IssueStatus::Resolved),
            issue(32, IssueStatus::InProgress),
            issue(33, IssueStatus::Resolved),
        ];
        let stats = WardIssueStats::for_ward(&issues, 32);
        assert_eq!(
            stats,
            WardIssueStats {
                total: 4,
                pending: 1,
                in_progress: 1,
                resolved: 2,
            }
        );
        assert_eq!(stats.resolution_percent(), 50);
        assert_eq!(issues_for_ward(&issues, 32, Some(IssueStatus::Resolved)).len(), 2);
        assert_eq!(issues_for_ward(&issues, 32, None).len(), 4);
    }

    #[test]
    fn empty_ward_resolves_nothing() {
        assert_eq!(WardIssueStats::for_ward(&[], 49).resolution_percent(), 0);
    }

    #[test]
    fn one_of_three_rounds_to_thirty_three() {
        let issues = vec![
            issue(48, IssueStatus::Resolved),
            issue(48, IssueStatus::Pending),
            issue(48, IssueStatus::Pending),
        ];
        assert_eq!(WardIssueStats::for_ward(&issues, 48).resolution_percent(), 33);
    }
}
