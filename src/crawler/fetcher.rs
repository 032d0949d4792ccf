//! HTTP fetcher for archive tasks
//!
//! This module handles the network side of a single archive task:
//! - Building the HTTP client with the fixed user agent
//! - GET with immediate retry on any non-200 answer
//! - Writing the body to the content store on success

use crate::artifact::{ArtifactKey, HTML_CONTENT_TYPE};
use crate::crawler::{ArchiveOutcome, AttemptError, FailureReason};
use crate::storage::ContentStore;
use reqwest::{Client, StatusCode};

/// Builds the HTTP client shared by every fetch task
///
/// No request timeout is set: a dispatched batch always runs to completion.
///
/// # Arguments
///
/// * `user_agent` - Literal `User-Agent` header value
///
/// # Example
///
/// ```no_run
/// use kb_archiver::config::DEFAULT_USER_AGENT;
/// use kb_archiver::crawler::build_http_client;
///
/// let client = build_http_client(DEFAULT_USER_AGENT).unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches `url` and archives the body under the key's bronze path
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Write body, → Archived |
/// | Any other status | Retry immediately |
/// | Transport error (connect, body read) | Retry immediately |
/// | `max_attempts` reached | → Failed(RetriesExhausted) |
/// | Store write error | → Failed(Store), no retry |
///
/// Never returns an error: every way this can go wrong is an outcome.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `store` - Destination content store
/// * `url` - The URL to fetch
/// * `key` - Artifact key derived from `url`
/// * `max_attempts` - Attempts before giving up (values below 1 act as 1)
pub async fn fetch_and_archive(
    client: &Client,
    store: &dyn ContentStore,
    url: &str,
    key: &ArtifactKey,
    max_attempts: u32,
) -> ArchiveOutcome {
    let max_attempts = max_attempts.max(1);
    let path = key.bronze_path();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match fetch_once(client, url).await {
            Ok(body) => {
                return match store.put(&path, &body, HTML_CONTENT_TYPE) {
                    Ok(()) => {
                        tracing::info!("Archived {} ({} bytes)", path, body.len());
                        ArchiveOutcome::Archived {
                            bytes: body.len(),
                            attempts: attempt,
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to write {}: {}", path, e);
                        ArchiveOutcome::Failed(FailureReason::Store(e.to_string()))
                    }
                };
            }
            Err(error) => error,
        };

        tracing::warn!(
            "Attempt {}/{} for {} failed: {}",
            attempt,
            max_attempts,
            url,
            error
        );

        if attempt >= max_attempts {
            tracing::error!("Giving up on {} after {} attempts", url, attempt);
            return ArchiveOutcome::Failed(FailureReason::RetriesExhausted {
                attempts: attempt,
                last_error: error,
            });
        }
    }
}

/// Issues one GET and returns the body of a 200 response
async fn fetch_once(client: &Client, url: &str) -> Result<Vec<u8>, AttemptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AttemptError::Transport(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(AttemptError::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AttemptError::Transport(e.to_string()))?;

    Ok(body.to_vec())
}
