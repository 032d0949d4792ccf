//! Fetch-and-archive crawler
//!
//! This module contains the bronze stage of the pipeline:
//! - Per-record dispatch decisions (cap, duplicates, already archived)
//! - Batched concurrent fetching with per-record retries
//! - Writing fetched bodies to the content store
//! - Aggregating per-record outcomes into a run report

mod coordinator;
mod fetcher;
mod report;
mod scheduler;

pub use coordinator::{crawl_catalog, Crawler, CrawlerSettings};
pub use fetcher::{build_http_client, fetch_and_archive};
pub use report::{CrawlReport, ItemOutcome};
pub use scheduler::{Decision, Scheduler};

use crate::state::TaskState;
use std::fmt;
use thiserror::Error;

/// Final result of one archive task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// No request was made
    Skipped(SkipReason),

    /// Body fetched and written
    Archived {
        /// Size of the archived body
        bytes: usize,
        /// Attempts used, including the successful one
        attempts: u32,
    },

    /// Nothing was written; the run carries on
    Failed(FailureReason),
}

impl ArchiveOutcome {
    /// The terminal task state this outcome corresponds to
    pub fn state(&self) -> TaskState {
        match self {
            Self::Skipped(_) => TaskState::Skipped,
            Self::Archived { .. } => TaskState::Archived,
            Self::Failed(_) => TaskState::Failed,
        }
    }
}

/// Why a record was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// An entry already exists in the content store
    AlreadyArchived,
    /// An earlier record in this run produced the same artifact key
    DuplicateInRun,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyArchived => write!(f, "already archived"),
            Self::DuplicateInRun => write!(f, "duplicate key in this run"),
        }
    }
}

/// Why a record could not be archived
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("gave up after {attempts} attempts, last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: AttemptError },

    #[error("store error: {0}")]
    Store(String),

    #[error("URL has no characters usable in an artifact key")]
    InvalidKey,

    #[error("task aborted: {0}")]
    Task(String),
}

/// Error from a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}
