//! Catalog listing for the knowledge base
//!
//! The index page of the knowledge base lists every article as an
//! `li.Article` element nested inside its sub-category and main category.
//! This module fetches that page and turns it into [`LinkRecord`]s for the
//! crawler.

mod parser;

pub use parser::{parse_catalog, resolve_link};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

/// Errors that can occur while listing the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid index URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

/// A document to archive: the input unit of the crawler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub title: String,
    pub url: String,
}

impl LinkRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// One article listed on the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Top-level category name (empty if the page structure lacks one)
    pub main_category: String,
    /// Sub-category name (empty if the page structure lacks one)
    pub sub_category: String,
    /// Article title as shown in the listing
    pub title: String,
    /// Absolute article URL
    pub url: String,
}

impl CatalogEntry {
    /// Drops the category columns, keeping what the crawler needs
    pub fn to_link_record(&self) -> LinkRecord {
        LinkRecord::new(self.title.clone(), self.url.clone())
    }
}

/// Fetches the index page and parses every listed article
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `index_url` - Page listing every article
///
/// # Returns
///
/// * `Ok(Vec<CatalogEntry>)` - Articles in page order
/// * `Err(CatalogError)` - The page could not be fetched or returned non-200
pub async fn fetch_catalog(client: &Client, index_url: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let base = Url::parse(index_url).map_err(|source| CatalogError::InvalidUrl {
        url: index_url.to_string(),
        source,
    })?;

    tracing::debug!("Fetching catalog index {}", base);

    let response = client
        .get(base.as_str())
        .send()
        .await
        .map_err(|source| CatalogError::Http {
            url: index_url.to_string(),
            source,
        })?;

    if response.status() != StatusCode::OK {
        return Err(CatalogError::Status {
            url: index_url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| CatalogError::Http {
        url: index_url.to_string(),
        source,
    })?;

    let entries = parse_catalog(&body, &base)?;
    tracing::info!("Catalog lists {} documents", entries.len());
    Ok(entries)
}
