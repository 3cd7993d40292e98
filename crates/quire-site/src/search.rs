//! Search records and plain-text excerpts.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Output path of the search page.
pub const SEARCH_PAGE_PATH: &str = "search.html";

/// Output path of the search index, relative to the site root.
pub const SEARCH_INDEX_PATH: &str = "assets/search_index.json";

/// Most results the search page lists.
pub const MAX_RESULTS: usize = 20;

/// Characters of context shown before the first match.
pub const CONTEXT_BEFORE: usize = 50;

/// Characters of context shown after the start of the first match.
pub const CONTEXT_AFTER: usize = 150;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").unwrap());
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]\([^)]*\)").unwrap());
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*_>\-]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One entry of the search index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub title: String,
    /// Percent-encoded output path relative to the site root, no leading slash.
    pub path: String,
    pub text: String,
}

/// Reduce markdown source to searchable plain text.
///
/// ```
/// use quire_site::excerpt;
///
/// assert_eq!(excerpt("# Setup\n\nRun `make` then see [[intro]]."), "Setup Run then see intro.");
/// ```
#[must_use]
pub fn excerpt(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = REFERENCE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = PUNCTUATION.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

/// Serialize records as the JSON array the search page loads.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn search_index_json(records: &[SearchRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}
