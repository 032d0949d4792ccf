//! Integration tests for the fetch-and-archive crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the crawler
//! end-to-end against real content stores.

use kb_archiver::artifact::artifact_key;
use kb_archiver::catalog::LinkRecord;
use kb_archiver::config::DEFAULT_USER_AGENT;
use kb_archiver::crawler::{
    build_http_client, ArchiveOutcome, AttemptError, Crawler, CrawlerSettings, FailureReason,
    SkipReason,
};
use kb_archiver::storage::{ContentStore, FsStore, MemoryStore, StoreError, StoreResult};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler over the given store
fn create_crawler(store: Arc<dyn ContentStore>, max_downloads: i64, batch_size: usize) -> Crawler {
    let settings = CrawlerSettings {
        max_downloads,
        batch_size,
        max_attempts: 5,
    };
    let client = build_http_client(DEFAULT_USER_AGENT).expect("Failed to build client");
    Crawler::new(settings, client, store)
}

/// Records for `/doc0 .. /doc{n-1}` on the mock server
fn records_for(base_url: &str, n: usize) -> Vec<LinkRecord> {
    (0..n)
        .map(|i| LinkRecord::new(format!("Doc {}", i), format!("{}/doc{}", base_url, i)))
        .collect()
}

/// Which store call a `BrokenStore` rejects
#[derive(Clone, Copy)]
enum BrokenCall {
    Exists,
    Put,
}

/// Content store whose existence check or write always errors
struct BrokenStore {
    broken: BrokenCall,
}

impl BrokenStore {
    fn failing(broken: BrokenCall) -> Arc<Self> {
        Arc::new(Self { broken })
    }

    fn error() -> StoreError {
        StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk unavailable"))
    }
}

impl ContentStore for BrokenStore {
    fn exists(&self, _key: &str) -> StoreResult<bool> {
        match self.broken {
            BrokenCall::Exists => Err(Self::error()),
            BrokenCall::Put => Ok(false),
        }
    }

    fn put(&self, _key: &str, _content: &[u8], _content_type: &str) -> StoreResult<()> {
        Err(Self::error())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        Err(StoreError::NotFound(key.to_string()))
    }

    fn list(&self, _prefix: &str) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_archived_records_make_no_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let records = records_for(&base_url, 3);
    for record in &records {
        let key = artifact_key(&record.url);
        store
            .put(&key.bronze_path(), b"archived earlier", "text/html")
            .expect("Failed to seed store");
    }

    let crawler = create_crawler(store.clone(), 0, 50);
    let report = crawler.run(records).await;

    assert_eq!(report.skipped_count(), 3);
    assert_eq!(report.fetch_tasks, 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.outcome == ArchiveOutcome::Skipped(SkipReason::AlreadyArchived)));
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_archived_content_matches_body_exactly() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Deliberately not valid UTF-8 to prove nothing is re-encoded
    let body: Vec<u8> = b"<html><body>Ol\xe1 \xff\xfe</body></html>".to_vec();

    Mock::given(method("GET"))
        .and(path("/doc0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let records = records_for(&base_url, 1);
    let key = artifact_key(&records[0].url);

    let crawler = create_crawler(store.clone(), 0, 50);
    let report = crawler.run(records).await;

    assert_eq!(
        report.outcomes[0].outcome,
        ArchiveOutcome::Archived {
            bytes: body.len(),
            attempts: 1
        }
    );
    assert_eq!(store.get(&key.bronze_path()).expect("Entry missing"), body);
    assert_eq!(
        store.content_type(&key.bronze_path()).as_deref(),
        Some("text/html")
    );
}

#[tokio::test]
async fn test_cap_limits_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>doc</html>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let crawler = create_crawler(store.clone(), 2, 50);
    let report = crawler.run(records_for(&base_url, 5)).await;

    assert_eq!(report.fetch_tasks, 2);
    assert_eq!(report.archived_count(), 2);
    assert_eq!(report.not_considered, 3);
    assert!(report.cap_reached());
    assert!(store.len() <= 2);

    // The first two records in input order are the ones fetched
    assert_eq!(report.outcomes[0].record.title, "Doc 0");
    assert_eq!(report.outcomes[1].record.title, "Doc 1");
}

#[tokio::test]
async fn test_persistent_server_error_exhausts_attempts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/doc0"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let crawler = create_crawler(store.clone(), 0, 50);
    let report = crawler.run(records_for(&base_url, 1)).await;

    assert_eq!(
        report.outcomes[0].outcome,
        ArchiveOutcome::Failed(FailureReason::RetriesExhausted {
            attempts: 5,
            last_error: AttemptError::Status(500),
        })
    );
    assert!(store.is_empty());
    assert_eq!(request_count(&mock_server).await, 5);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Mounted first, so it answers the first two requests
    Mock::given(method("GET"))
        .and(path("/doc0"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doc0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let records = records_for(&base_url, 1);
    let key = artifact_key(&records[0].url);

    let crawler = create_crawler(store.clone(), 0, 50);
    let report = crawler.run(records).await;

    assert_eq!(
        report.outcomes[0].outcome,
        ArchiveOutcome::Archived {
            bytes: 7,
            attempts: 3
        }
    );
    assert_eq!(
        store.get_as_text(&key.bronze_path(), "utf-8").expect("Entry missing"),
        "finally"
    );
}

#[tokio::test]
async fn test_one_failure_does_not_abort_the_batch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let crawler = create_crawler(store.clone(), 0, 50);
    let report = crawler.run(records_for(&base_url, 3)).await;

    assert_eq!(report.archived_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failures().next().map(|o| o.index), Some(1));
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_records_are_dispatched_in_batches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("doc"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let crawler = create_crawler(store.clone(), 0, 2);
    let report = crawler.run(records_for(&base_url, 5)).await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.archived_count(), 5);

    let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_second_run_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>kb</html>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let records = records_for(&base_url, 4);

    {
        let store = Arc::new(FsStore::new(dir.path()).expect("Failed to open store"));
        let report = create_crawler(store, 0, 50).run(records.clone()).await;
        assert_eq!(report.archived_count(), 4);
    }
    let after_first_run = request_count(&mock_server).await;
    assert_eq!(after_first_run, 4);

    let store = Arc::new(FsStore::new(dir.path()).expect("Failed to reopen store"));
    let report = create_crawler(store, 0, 50).run(records).await;

    assert_eq!(report.skipped_count(), 4);
    assert_eq!(report.fetch_tasks, 0);
    assert_eq!(request_count(&mock_server).await, after_first_run);
}

#[tokio::test]
async fn test_colliding_urls_fetch_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("doc"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = vec![
        LinkRecord::new("Nested", format!("{}/a/b", base_url)),
        LinkRecord::new("Flat", format!("{}/ab", base_url)),
    ];

    let store = Arc::new(MemoryStore::new());
    let report = create_crawler(store.clone(), 0, 50).run(records).await;

    assert_eq!(report.archived_count(), 1);
    assert_eq!(
        report.outcomes[1].outcome,
        ArchiveOutcome::Skipped(SkipReason::DuplicateInRun)
    );
    assert_eq!(store.put_count(), 1);
}

#[tokio::test]
async fn test_requests_carry_fixed_user_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("doc"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let report = create_crawler(store, 0, 50)
        .run(records_for(&base_url, 1))
        .await;

    assert_eq!(report.archived_count(), 1);
}

#[tokio::test]
async fn test_store_write_failure_does_not_abort_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // One request per record: store failures are not retried
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("doc"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(BrokenStore::failing(BrokenCall::Put), 0, 2);
    let report = crawler.run(records_for(&base_url, 3)).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.batches, 2);
    assert_eq!(report.failed_count(), 3);
    for item in &report.outcomes {
        assert!(
            matches!(item.outcome, ArchiveOutcome::Failed(FailureReason::Store(_))),
            "unexpected outcome: {:?}",
            item.outcome
        );
    }
}

#[tokio::test]
async fn test_store_lookup_failure_fails_without_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("doc"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(BrokenStore::failing(BrokenCall::Exists), 0, 50);
    let report = crawler.run(records_for(&base_url, 3)).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.fetch_tasks, 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.outcome, ArchiveOutcome::Failed(FailureReason::Store(_)))));
}

#[tokio::test]
async fn test_batches_run_concurrently_and_in_sequence() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let delay = Duration::from_millis(300);

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(delay),
        )
        .expect(6)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let crawler = create_crawler(store, 0, 3);

    let start = Instant::now();
    let report = crawler.run(records_for(&base_url, 6)).await;
    let elapsed = start.elapsed();

    assert_eq!(report.archived_count(), 6);
    assert_eq!(report.batches, 2);

    // Two batches back to back: each waits for its slowest task, and tasks
    // within a batch overlap rather than running one after another.
    assert!(elapsed >= delay * 2, "batches overlapped: {:?}", elapsed);
    assert!(elapsed < delay * 5, "tasks ran sequentially: {:?}", elapsed);
}
