//! Silver stage: plain-text extraction from archived HTML
//!
//! Every archived page carries the article body in `article#kb-article`,
//! followed by a rating widget that is not part of the content. This module
//! pulls the text out of that element and stores it next to the archive.

use crate::artifact::{silver_path_for, BRONZE_PREFIX, TEXT_CONTENT_TYPE};
use crate::config::Config;
use crate::storage::{open_store, ContentStore, StoreError};
use crate::KbError;
use scraper::{ElementRef, Html, Node, Selector};

/// Element holding the article body
const ARTICLE_SELECTOR: &str = "article#kb-article";

/// Widgets inside the article that are dropped from the text
const EXCLUDED_SELECTOR: &str = "div.rating-box-form";

/// Summary of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Text entries written
    pub converted: usize,
    /// Entries whose text already existed
    pub skipped: usize,
    /// Written entries whose page had no article body
    pub empty: usize,
    /// (html key, error) for every entry that could not be converted
    pub failed: Vec<(String, String)>,
}

/// Extracts the article text from a knowledge-base page
///
/// Returns the concatenated text of `article#kb-article` with every
/// `div.rating-box-form` removed, or an empty string if the page has no
/// such article.
pub fn html_to_text(html: &str) -> String {
    let (Ok(article_selector), Ok(excluded)) = (
        Selector::parse(ARTICLE_SELECTOR),
        Selector::parse(EXCLUDED_SELECTOR),
    ) else {
        return String::new();
    };

    let document = Html::parse_document(html);
    let Some(article) = document.select(&article_selector).next() else {
        return String::new();
    };

    let mut text = String::new();
    collect_text(article, &excluded, &mut text);
    text
}

fn collect_text(element: ElementRef<'_>, excluded: &Selector, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !excluded.matches(&child_element) {
                        collect_text(child_element, excluded, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Converts every archived HTML entry under `bronze_prefix` to text
///
/// Entries whose text already exists are skipped. A failure on one entry is
/// recorded in the report and the pass continues.
///
/// # Returns
///
/// * `Ok(ExtractReport)` - Counts for the pass
/// * `Err(StoreError)` - The archive could not be listed
pub fn convert_archive(
    store: &dyn ContentStore,
    bronze_prefix: &str,
) -> Result<ExtractReport, StoreError> {
    let mut report = ExtractReport::default();

    for html_key in store.list(bronze_prefix)? {
        let Some(text_key) = silver_path_for(&html_key) else {
            continue;
        };

        match convert_entry(store, &html_key, &text_key) {
            Ok(EntryResult::Skipped) => {
                tracing::info!("Skipping {} (already exists)", text_key);
                report.skipped += 1;
            }
            Ok(EntryResult::Written { empty }) => {
                tracing::info!("Created {}", text_key);
                report.converted += 1;
                if empty {
                    tracing::warn!("No article body found in {}", html_key);
                    report.empty += 1;
                }
            }
            Err(e) => {
                tracing::error!("Failed to convert {}: {}", html_key, e);
                report.failed.push((html_key, e.to_string()));
            }
        }
    }

    Ok(report)
}

enum EntryResult {
    Skipped,
    Written { empty: bool },
}

fn convert_entry(
    store: &dyn ContentStore,
    html_key: &str,
    text_key: &str,
) -> Result<EntryResult, StoreError> {
    if store.exists(text_key)? {
        return Ok(EntryResult::Skipped);
    }

    let html = store.get_as_text(html_key, "utf-8")?;
    let text = html_to_text(&html);
    store.put(text_key, text.as_bytes(), TEXT_CONTENT_TYPE)?;

    Ok(EntryResult::Written {
        empty: text.is_empty(),
    })
}

/// Runs the silver stage against the configured store
pub fn extract_archive(config: &Config) -> Result<ExtractReport, KbError> {
    let store = open_store(&config.store)?;
    let report = convert_archive(store.as_ref(), BRONZE_PREFIX)?;

    tracing::info!(
        "Extraction finished: {} converted, {} skipped, {} failed",
        report.converted,
        report.skipped,
        report.failed.len()
    );

    Ok(report)
}
