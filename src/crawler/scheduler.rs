//! Dispatch decisions for the crawler
//!
//! The scheduler owns the global download cap and the set of keys already
//! handled in this run. It is only ever touched by the dispatching loop,
//! never by fetch tasks, so the cap cannot race.

use crate::artifact::ArtifactKey;
use crate::crawler::{FailureReason, SkipReason};
use crate::storage::ContentStore;
use std::collections::HashSet;

/// What the dispatcher should do with one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Do not fetch; the record is finished
    Skip(SkipReason),
    /// Queue a fetch task
    Fetch,
    /// The record cannot be handled; no request is made
    Fail(FailureReason),
}

/// Single-owner dispatch state for one crawl run
#[derive(Debug)]
pub struct Scheduler {
    cap: Option<usize>,
    considered: usize,
    seen: HashSet<ArtifactKey>,
}

impl Scheduler {
    /// Creates a scheduler for a run
    ///
    /// # Arguments
    ///
    /// * `max_downloads` - Cap on records considered; zero or negative is unlimited
    pub fn new(max_downloads: i64) -> Self {
        let cap = usize::try_from(max_downloads).ok().filter(|cap| *cap > 0);
        Self {
            cap,
            considered: 0,
            seen: HashSet::new(),
        }
    }

    /// The effective cap, if any
    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// Number of records admitted so far (fetched, skipped or failed)
    pub fn considered(&self) -> usize {
        self.considered
    }

    /// Returns true once no further record may be considered
    pub fn cap_reached(&self) -> bool {
        matches!(self.cap, Some(cap) if self.considered >= cap)
    }

    /// Decides what to do with the next record and counts it against the cap
    ///
    /// Checks, in order: empty key, key already handled in this run, entry
    /// already present in the store. A failed existence check fails only this
    /// record.
    pub fn admit(&mut self, key: &ArtifactKey, store: &dyn ContentStore) -> Decision {
        self.considered += 1;

        if key.is_empty() {
            return Decision::Fail(FailureReason::InvalidKey);
        }

        if !self.seen.insert(key.clone()) {
            return Decision::Skip(SkipReason::DuplicateInRun);
        }

        match store.exists(&key.bronze_path()) {
            Ok(true) => Decision::Skip(SkipReason::AlreadyArchived),
            Ok(false) => Decision::Fetch,
            Err(e) => Decision::Fail(FailureReason::Store(e.to_string())),
        }
    }
}
