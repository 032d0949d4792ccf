//! Artifact naming for archived documents
//!
//! Every source URL maps to an [`ArtifactKey`], which is both the
//! de-duplication identifier and the path segment used in the content store.

use std::fmt;

/// Prefix under which raw HTML entries are archived
pub const BRONZE_PREFIX: &str = "bronze";

/// Prefix under which extracted text entries are written
pub const SILVER_PREFIX: &str = "silver";

/// Content type attached to archived HTML
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Content type attached to extracted text
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Canonical name of an archived document
///
/// Derived from a URL by keeping only alphanumeric characters, `-` and `_`.
/// Distinct URLs can reduce to the same key; the crawler treats a repeated
/// key within one run as a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the source URL had no usable characters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Store path of the raw HTML entry: `bronze/{key}/{key}.html`
    pub fn bronze_path(&self) -> String {
        format!("{}/{}/{}.html", BRONZE_PREFIX, self.0, self.0)
    }

    /// Store path of the extracted text entry: `silver/{key}.txt`
    pub fn silver_path(&self) -> String {
        format!("{}/{}.txt", SILVER_PREFIX, self.0)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the artifact key for a URL
///
/// # Example
///
/// ```
/// use kb_archiver::artifact_key;
///
/// assert_eq!(artifact_key("https://x.com/a?b=1").as_str(), "httpsxcomab1");
/// ```
pub fn artifact_key(url: &str) -> ArtifactKey {
    ArtifactKey(url.chars().filter(|c| is_key_char(*c)).collect())
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Maps an archived HTML path back to the silver path for the same document
///
/// Uses the file stem of the last path segment, so both
/// `bronze/foo/foo.html` and `bronze/knowledge_base/foo/foo.HTML` map to
/// `silver/foo.txt`. Returns None for paths that do not end in `.html`.
pub fn silver_path_for(html_path: &str) -> Option<String> {
    let file_name = html_path.rsplit('/').next()?;
    if file_name.len() < 5 || !file_name.is_char_boundary(file_name.len() - 5) {
        return None;
    }

    let (stem, ext) = file_name.split_at(file_name.len() - 5);
    if !ext.eq_ignore_ascii_case(".html") {
        return None;
    }

    Some(format!("{}/{}.txt", SILVER_PREFIX, stem))
}
