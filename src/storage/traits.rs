//! Content store trait and error types
//!
//! This module defines the interface every archive backend implements and
//! the errors those backends report.

use thiserror::Error;

/// Errors that can occur during content store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Entry {key} is not valid UTF-8: {source}")]
    Decode {
        key: String,
        source: std::string::FromUtf8Error,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for content store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value blob store addressed by string path
///
/// Keys use `/` as the segment separator. Entries are written once by the
/// crawler; a second `put` on the same key replaces the content (last write
/// wins) and no locking across callers is performed.
///
/// Implementations must be shareable between concurrent fetch tasks.
pub trait ContentStore: Send + Sync {
    /// Checks whether an entry exists at `key`
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Writes `content` at `key`
    ///
    /// # Arguments
    ///
    /// * `key` - The store path
    /// * `content` - Raw entry bytes
    /// * `content_type` - MIME type of the content (backends without a
    ///   metadata slot may ignore it)
    fn put(&self, key: &str, content: &[u8], content_type: &str) -> StoreResult<()>;

    /// Reads the raw bytes stored at `key`
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Lists every key starting with `prefix`, sorted
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Reads the entry at `key` decoded as text
    ///
    /// Only UTF-8 is supported.
    fn get_as_text(&self, key: &str, encoding: &str) -> StoreResult<String> {
        if !is_utf8_label(encoding) {
            return Err(StoreError::UnsupportedEncoding(encoding.to_string()));
        }

        let bytes = self.get(key)?;
        String::from_utf8(bytes).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }
}

fn is_utf8_label(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

/// Rejects keys that could escape a store root or address nothing
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }

    if key.starts_with('/') {
        return Err(StoreError::InvalidKey(format!(
            "key cannot be absolute: '{}'",
            key
        )));
    }

    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StoreError::InvalidKey(format!(
            "key has an empty or relative segment: '{}'",
            key
        )));
    }

    Ok(())
}
