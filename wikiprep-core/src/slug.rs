//! Slug generation for page titles.

use regex::Regex;
use std::sync::OnceLock;

static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn separator_regex() -> &'static Regex {
    SEPARATOR_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Convert a page title to a filesystem-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace every run of characters outside `[a-z0-9]` with one hyphen
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use wikiprep_core::slugify;
///
/// assert_eq!(slugify("System Architecture"), "system-architecture");
/// assert_eq!(slugify("HTML to Markdown Conversion"), "html-to-markdown-conversion");
/// assert_eq!(slugify("C++ & Rust"), "c-rust");
/// ```
pub fn slugify(title: &str) -> String {
    let lowercased = title.to_lowercase();
    let hyphenated = separator_regex().replace_all(&lowercased, "-");
    hyphenated.trim_matches('-').to_string()
}
