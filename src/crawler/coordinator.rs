//! Crawler coordinator - batch dispatch for the bronze stage
//!
//! Records are admitted one at a time, in input order, on a single control
//! path. Admitted fetches are collected into batches; each batch is spawned
//! onto the runtime and fully joined before the next batch is dispatched.

use crate::artifact::{artifact_key, ArtifactKey};
use crate::catalog::{fetch_catalog, LinkRecord};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::report::{CrawlReport, ItemOutcome};
use crate::crawler::scheduler::{Decision, Scheduler};
use crate::crawler::{build_http_client, fetch_and_archive, ArchiveOutcome, FailureReason};
use crate::storage::{open_store, ContentStore};
use crate::KbError;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Tunables for one crawler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerSettings {
    /// Cap on records considered; zero or negative is unlimited
    pub max_downloads: i64,
    /// Fetch tasks per batch
    pub batch_size: usize,
    /// Attempts per record
    pub max_attempts: u32,
}

impl From<&CrawlerConfig> for CrawlerSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_downloads: config.max_downloads,
            batch_size: config.batch_size,
            max_attempts: config.max_attempts,
        }
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// A record waiting for its batch to be dispatched
#[derive(Debug)]
struct PendingFetch {
    index: usize,
    record: LinkRecord,
    key: ArtifactKey,
}

/// Main crawler structure
pub struct Crawler {
    settings: CrawlerSettings,
    client: Client,
    store: Arc<dyn ContentStore>,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `settings` - Cap, batch size and attempt limit
    /// * `client` - HTTP client, normally from `build_http_client`
    /// * `store` - Content store shared by all fetch tasks
    pub fn new(settings: CrawlerSettings, client: Client, store: Arc<dyn ContentStore>) -> Self {
        Self {
            settings,
            client,
            store,
        }
    }

    /// Returns the settings this crawler runs with
    pub fn settings(&self) -> &CrawlerSettings {
        &self.settings
    }

    /// Archives every record not already in the store
    ///
    /// For each record, in order:
    /// 1. Stop if the download cap has been reached
    /// 2. Derive the artifact key
    /// 3. Skip if the key was seen this run or is already archived
    /// 4. Otherwise queue a fetch; dispatch and join once the batch is full
    ///
    /// Per-record failures never abort the run; they are reported in the
    /// returned report, in input order.
    pub async fn run(&self, records: Vec<LinkRecord>) -> CrawlReport {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let records_total = records.len();
        let batch_size = self.settings.batch_size.max(1);
        let mut scheduler = Scheduler::new(self.settings.max_downloads);

        let mut outcomes = Vec::with_capacity(records_total);
        let mut pending = Vec::with_capacity(batch_size);
        let mut batches = 0;
        let mut fetch_tasks = 0;
        let mut not_considered = 0;

        tracing::info!(
            "Starting crawl of {} records (batch size {}, {} attempts each)",
            records_total,
            batch_size,
            self.settings.max_attempts
        );

        for (index, record) in records.into_iter().enumerate() {
            if scheduler.cap_reached() {
                not_considered = records_total - index;
                tracing::info!(
                    "Download limit of {} reached, leaving {} records for a later run",
                    scheduler.considered(),
                    not_considered
                );
                break;
            }

            let key = artifact_key(&record.url);

            match scheduler.admit(&key, self.store.as_ref()) {
                Decision::Skip(reason) => {
                    tracing::info!("Skipping {} ({})", key, reason);
                    outcomes.push(ItemOutcome {
                        index,
                        record,
                        key,
                        outcome: ArchiveOutcome::Skipped(reason),
                    });
                }
                Decision::Fail(reason) => {
                    tracing::warn!("Not fetching {}: {}", record.url, reason);
                    outcomes.push(ItemOutcome {
                        index,
                        record,
                        key,
                        outcome: ArchiveOutcome::Failed(reason),
                    });
                }
                Decision::Fetch => {
                    pending.push(PendingFetch { index, record, key });
                    fetch_tasks += 1;

                    if pending.len() >= batch_size {
                        batches += 1;
                        let batch = std::mem::replace(&mut pending, Vec::with_capacity(batch_size));
                        outcomes.extend(self.run_batch(batch, batches).await);
                    }
                }
            }
        }

        if !pending.is_empty() {
            batches += 1;
            outcomes.extend(self.run_batch(pending, batches).await);
        }

        outcomes.sort_by_key(|o| o.index);

        let report = CrawlReport {
            outcomes,
            records_total,
            not_considered,
            cap: scheduler.cap(),
            fetch_tasks,
            batches,
            started_at,
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawl finished in {:?}: {} archived, {} skipped, {} failed",
            report.elapsed,
            report.archived_count(),
            report.skipped_count(),
            report.failed_count()
        );

        report
    }

    /// Spawns every fetch in the batch and waits for all of them
    async fn run_batch(&self, batch: Vec<PendingFetch>, number: usize) -> Vec<ItemOutcome> {
        tracing::debug!("Dispatching batch {} with {} tasks", number, batch.len());

        let handles = batch
            .iter()
            .map(|item| {
                let client = self.client.clone();
                let store = Arc::clone(&self.store);
                let url = item.record.url.clone();
                let key = item.key.clone();
                let max_attempts = self.settings.max_attempts;

                tokio::spawn(async move {
                    fetch_and_archive(&client, store.as_ref(), &url, &key, max_attempts).await
                })
            })
            .collect::<Vec<_>>();

        let results = join_all(handles).await;

        batch
            .into_iter()
            .zip(results)
            .map(|(item, result)| {
                let outcome = result.unwrap_or_else(|e| {
                    tracing::error!("Fetch task for {} aborted: {}", item.record.url, e);
                    ArchiveOutcome::Failed(FailureReason::Task(e.to_string()))
                });

                ItemOutcome {
                    index: item.index,
                    record: item.record,
                    key: item.key,
                    outcome,
                }
            })
            .collect()
    }
}

/// Runs the bronze stage end to end
///
/// 1. Open the configured content store
/// 2. Build the HTTP client
/// 3. List the catalog
/// 4. Archive every listed document
///
/// Only setup failures (store, client, catalog listing) are errors; the
/// crawl itself always produces a report.
///
/// # Example
///
/// ```no_run
/// use kb_archiver::config::load_config;
/// use kb_archiver::crawler::crawl_catalog;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = crawl_catalog(&config).await?;
/// println!("{} archived", report.archived_count());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_catalog(config: &Config) -> Result<CrawlReport, KbError> {
    let store = open_store(&config.store)?;
    let client = build_http_client(&config.user_agent.value)?;

    let entries = fetch_catalog(&client, &config.catalog.index_url).await?;
    let records = entries.iter().map(|e| e.to_link_record()).collect();

    let crawler = Crawler::new(CrawlerSettings::from(&config.crawler), client, store);
    Ok(crawler.run(records).await)
}
