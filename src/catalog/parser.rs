//! HTML parser for the knowledge-base index page

use crate::catalog::{CatalogEntry, CatalogError};
use scraper::{ElementRef, Selector};
use url::Url;

/// Selector for one listed article
const ARTICLE_SELECTOR: &str = "li.Article";

/// Ancestor holding the sub-category link, counted from the article
const SUB_CATEGORY_DEPTH: usize = 2;

/// Ancestor holding the main category link, counted from the article
const MAIN_CATEGORY_DEPTH: usize = 4;

/// Parses the index page into catalog entries
///
/// # Layout
///
/// ```text
/// <li>                      4th ancestor: first <a> is the main category
///   <ul>
///     <li>                  2nd ancestor: first <a> is the sub-category
///       <ul>
///         <li class="Article"><a href="...">Title</a></li>
/// ```
///
/// Articles without a usable link are dropped. Missing category levels yield
/// empty strings rather than failing the whole listing.
///
/// # Arguments
///
/// * `html` - The index page
/// * `base_url` - The URL the page was fetched from, for relative links
pub fn parse_catalog(html: &str, base_url: &Url) -> Result<Vec<CatalogEntry>, CatalogError> {
    let document = scraper::Html::parse_document(html);
    let article_selector = selector(ARTICLE_SELECTOR)?;
    let link_selector = selector("a[href]")?;
    let anchor_selector = selector("a")?;

    let mut entries = Vec::new();

    for article in document.select(&article_selector) {
        let href = match article
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => href,
            None => {
                tracing::debug!("Skipping catalog article without a link");
                continue;
            }
        };

        let url = match resolve_link(href, base_url) {
            Some(url) => url,
            None => {
                tracing::debug!("Skipping catalog article with unusable link {}", href);
                continue;
            }
        };

        entries.push(CatalogEntry {
            main_category: category_text(article, MAIN_CATEGORY_DEPTH, &anchor_selector),
            sub_category: category_text(article, SUB_CATEGORY_DEPTH, &anchor_selector),
            title: article.text().collect::<String>().trim().to_string(),
            url,
        });
    }

    Ok(entries)
}

/// Text of the first `<a>` below the `depth`-th ancestor element
fn category_text(article: ElementRef<'_>, depth: usize, anchor: &Selector) -> String {
    article
        .ancestors()
        .filter_map(ElementRef::wrap)
        .nth(depth - 1)
        .and_then(|ancestor| ancestor.select(anchor).next())
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn selector(css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css).map_err(|e| CatalogError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Resolves a link href to an absolute URL and validates it
///
/// Absolute http(s) hrefs are returned unchanged; relative ones are joined
/// onto `base_url`.
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Absolute links are kept as written: artifact keys derive from the raw
    // href, and Url serialization would percent-encode or normalize it.
    if let Ok(absolute_url) = Url::parse(href) {
        return is_http(&absolute_url).then(|| href.to_string());
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if is_http(&absolute_url) {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
