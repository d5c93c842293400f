//! Read-only figures derived from the candidate collection.
//!
//! Everything here is recomputed from scratch on each render.

use chrono::{DateTime, Utc};

use crate::models::{Candidate, Status};

pub const RECENT_LIMIT: usize = 5;
pub const ATTENTION_DISPLAY_LIMIT: usize = 5;
/// Days without contact after which an active candidate needs attention.
pub const STALE_AFTER_DAYS: i64 = 3;

/// Stages shown in the pipeline overview, in display order.
pub const PIPELINE_STAGES: [Status; 4] = [
    Status::Screening,
    Status::Interview,
    Status::Offer,
    Status::Hired,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub new: usize,
    pub screening: usize,
    pub interview: usize,
    pub offer: usize,
    pub hired: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn of(candidates: &[Candidate]) -> Self {
        let mut counts = Self {
            total: candidates.len(),
            ..Self::default()
        };
        for c in candidates {
            match c.status {
                Status::New => counts.new += 1,
                Status::Screening => counts.screening += 1,
                Status::Interview => counts.interview += 1,
                Status::Offer => counts.offer += 1,
                Status::Hired => counts.hired += 1,
                Status::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::New => self.new,
            Status::Screening => self.screening,
            Status::Interview => self.interview,
            Status::Offer => self.offer,
            Status::Hired => self.hired,
            Status::Rejected => self.rejected,
        }
    }

    /// Share of all candidates at `status`, in percent. Zero when empty.
    pub fn percentage(&self, status: Status) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.get(status) as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageShare {
    pub status: Status,
    pub count: usize,
    pub percentage: f64,
}

pub fn pipeline(counts: &StatusCounts) -> Vec<StageShare> {
    PIPELINE_STAGES
        .iter()
        .map(|&status| StageShare {
            status,
            count: counts.get(status),
            percentage: counts.percentage(status),
        })
        .collect()
}

/// Newest applications first; equal dates keep collection order.
pub fn recent_applications(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    // stable, so ties stay in insertion order
    sorted.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

pub fn needs_attention_at(candidate: &Candidate, now: DateTime<Utc>) -> bool {
    if candidate.status.is_terminal() {
        return false;
    }
    match candidate.last_contact {
        None => true,
        Some(last) => (now - last).num_days() > STALE_AFTER_DAYS,
    }
}

/// Active candidates never contacted or not contacted for more than
/// [`STALE_AFTER_DAYS`] whole days, in collection order and uncapped.
pub fn needs_attention(candidates: &[Candidate], now: DateTime<Utc>) -> Vec<&Candidate> {
    candidates
        .iter()
        .filter(|c| needs_attention_at(c, now))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttentionItem<'a> {
    pub candidate: &'a Candidate,
    pub days_since_contact: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary<'a> {
    pub counts: StatusCounts,
    pub pipeline: Vec<StageShare>,
    pub recent: Vec<&'a Candidate>,
    pub attention: Vec<AttentionItem<'a>>,
}

impl<'a> DashboardSummary<'a> {
    pub fn build(candidates: &'a [Candidate], now: DateTime<Utc>) -> Self {
        let counts = StatusCounts::of(candidates);
        let attention = needs_attention(candidates, now)
            .into_iter()
            .take(ATTENTION_DISPLAY_LIMIT)
            .map(|candidate| AttentionItem {
                candidate,
                days_since_contact: candidate.days_since_contact(now),
            })
            .collect();

        Self {
            counts,
            pipeline: pipeline(&counts),
            recent: recent_applications(candidates),
            attention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn candidate(id: &str, status: Status, applied_days_ago: i64, contact_days_ago: Option<i64>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Candidate {}", id),
            email: String::new(),
            phone: String::new(),
            position: "Engineer".to_string(),
            status,
            experience: String::new(),
            skills: Vec::new(),
            notes: String::new(),
            resume_url: None,
            applied_date: now() - Duration::days(applied_days_ago),
            last_contact: contact_days_ago.map(|d| now() - Duration::days(d)),
        }
    }

    fn ids<'a>(list: impl IntoIterator<Item = &'a Candidate>) -> Vec<&'a str> {
        list.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_status_counts() {
        let list = vec![
            candidate("1", Status::New, 1, None),
            candidate("2", Status::Screening, 1, None),
            candidate("3", Status::Interview, 1, None),
            candidate("4", Status::Interview, 1, None),
            candidate("5", Status::Rejected, 1, None),
        ];
        let counts = StatusCounts::of(&list);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.interview, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.offer, 0);
        assert!((counts.percentage(Status::Interview) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pipeline_on_empty_collection_is_zero() {
        let shares = pipeline(&StatusCounts::of(&[]));
        assert_eq!(shares.len(), 4);
        for share in shares {
            assert_eq!(share.count, 0);
            assert_eq!(share.percentage, 0.0);
            assert!(!share.percentage.is_nan());
        }
    }

    #[test]
    fn test_recent_is_newest_first_capped_and_stable() {
        let list = vec![
            candidate("a", Status::New, 10, None),
            candidate("b", Status::New, 2, None),
            candidate("c", Status::New, 2, None),
            candidate("d", Status::New, 7, None),
            candidate("e", Status::New, 1, None),
            candidate("f", Status::New, 30, None),
            candidate("g", Status::New, 2, None),
        ];
        assert_eq!(ids(recent_applications(&list)), vec!["e", "b", "c", "g", "d"]);
    }

    #[test]
    fn test_needs_attention_membership() {
        let never_contacted = candidate("1", Status::New, 0, None);
        let contacted_now = candidate("2", Status::Screening, 10, Some(0));
        let four_days = candidate("3", Status::Screening, 10, Some(4));
        let exactly_three = candidate("4", Status::Interview, 10, Some(3));
        let hired_stale = candidate("5", Status::Hired, 30, Some(20));
        let rejected_never = candidate("6", Status::Rejected, 30, None);

        assert!(needs_attention_at(&never_contacted, now()));
        assert!(!needs_attention_at(&contacted_now, now()));
        assert!(needs_attention_at(&four_days, now()));
        assert!(!needs_attention_at(&exactly_three, now()));
        assert!(!needs_attention_at(&hired_stale, now()));
        assert!(!needs_attention_at(&rejected_never, now()));
    }

    #[test]
    fn test_partial_days_are_truncated() {
        let mut c = candidate("1", Status::Offer, 10, None);
        c.last_contact = Some(now() - Duration::days(3) - Duration::hours(23));
        assert!(!needs_attention_at(&c, now()));
        c.last_contact = Some(now() - Duration::days(4));
        assert!(needs_attention_at(&c, now()));
    }

    #[test]
    fn test_summary_caps_attention_and_reports_days() {
        let list: Vec<Candidate> = (0..7)
            .map(|i| candidate(&i.to_string(), Status::New, 6 + i, None))
            .chain(std::iter::once(candidate("x", Status::Screening, 20, Some(9))))
            .collect();

        let summary = DashboardSummary::build(&list, now());
        assert_eq!(needs_attention(&list, now()).len(), 8);
        assert_eq!(summary.attention.len(), ATTENTION_DISPLAY_LIMIT);
        assert_eq!(ids(summary.attention.iter().map(|a| a.candidate)), vec!["0", "1", "2", "3", "4"]);
        // never contacted: counted from the application date
        assert_eq!(summary.attention[0].days_since_contact, 6);
        assert_eq!(summary.counts.total, 8);
        assert_eq!(summary.recent.len(), RECENT_LIMIT);
    }
}
