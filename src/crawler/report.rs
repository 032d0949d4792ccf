//! Aggregated result of a crawler run

use crate::artifact::ArtifactKey;
use crate::catalog::LinkRecord;
use crate::crawler::ArchiveOutcome;
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of one input record
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// Position of the record in the input sequence
    pub index: usize,
    pub record: LinkRecord,
    pub key: ArtifactKey,
    pub outcome: ArchiveOutcome,
}

impl ItemOutcome {
    /// Short human-readable description of the outcome
    pub fn describe(&self) -> String {
        match &self.outcome {
            ArchiveOutcome::Skipped(reason) => reason.to_string(),
            ArchiveOutcome::Archived { bytes, attempts } => {
                format!("{} bytes after {} attempt(s)", bytes, attempts)
            }
            ArchiveOutcome::Failed(reason) => reason.to_string(),
        }
    }
}

/// Everything a caller needs to know about a crawler run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One entry per considered record, in input order
    pub outcomes: Vec<ItemOutcome>,
    /// Number of records handed to the crawler
    pub records_total: usize,
    /// Records never looked at because the cap was reached
    pub not_considered: usize,
    /// Effective download cap, None when unlimited
    pub cap: Option<usize>,
    /// Fetch tasks dispatched
    pub fetch_tasks: usize,
    /// Batches dispatched
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of outcomes in the given terminal state
    pub fn count(&self, state: TaskState) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.state() == state)
            .count()
    }

    pub fn archived_count(&self) -> usize {
        self.count(TaskState::Archived)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(TaskState::Skipped)
    }

    pub fn failed_count(&self) -> usize {
        self.count(TaskState::Failed)
    }

    /// Counts per terminal state, only states that occurred
    pub fn counts_by_state(&self) -> BTreeMap<TaskState, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.outcome.state()).or_insert(0) += 1;
        }
        counts
    }

    /// Records that ended in `Failed`
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.state() == TaskState::Failed)
    }

    /// True if the cap stopped the run before the input was exhausted
    pub fn cap_reached(&self) -> bool {
        self.not_considered > 0
    }

    /// True if every record is now archived (freshly or previously)
    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0 && !self.cap_reached()
    }

    /// Percentage of dispatched fetches that ended archived
    pub fn fetch_success_rate(&self) -> f64 {
        if self.fetch_tasks == 0 {
            return 100.0;
        }
        (self.archived_count() as f64 / self.fetch_tasks as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::artifact_key;
    use crate::crawler::{AttemptError, FailureReason, SkipReason};

    fn item(index: usize, outcome: ArchiveOutcome) -> ItemOutcome {
        let url = format!("https://kb.example.com/{}", index);
        ItemOutcome {
            index,
            key: artifact_key(&url),
            record: LinkRecord::new(format!("Doc {}", index), url),
            outcome,
        }
    }

    fn sample_report() -> CrawlReport {
        CrawlReport {
            outcomes: vec![
                item(
                    0,
                    ArchiveOutcome::Archived {
                        bytes: 10,
                        attempts: 1,
                    },
                ),
                item(1, ArchiveOutcome::Skipped(SkipReason::AlreadyArchived)),
                item(
                    2,
                    ArchiveOutcome::Failed(FailureReason::RetriesExhausted {
                        attempts: 5,
                        last_error: AttemptError::Status(500),
                    }),
                ),
            ],
            records_total: 4,
            not_considered: 1,
            cap: Some(3),
            fetch_tasks: 2,
            batches: 1,
            started_at: Utc::now(),
            elapsed: Duration::from_millis(120),
        }
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.archived_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.counts_by_state().len(), 3);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_describe() {
        let report = sample_report();
        assert_eq!(report.outcomes[0].describe(), "10 bytes after 1 attempt(s)");
        assert_eq!(report.outcomes[1].describe(), "already archived");
        assert_eq!(
            report.outcomes[2].describe(),
            "gave up after 5 attempts, last error: HTTP 500"
        );
    }

    #[test]
    fn test_completeness() {
        let report = sample_report();
        assert!(report.cap_reached());
        assert!(!report.is_complete());
        assert!((report.fetch_success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_without_fetches() {
        let mut report = sample_report();
        report.fetch_tasks = 0;
        assert!((report.fetch_success_rate() - 100.0).abs() < f64::EPSILON);
    }
}
