//! Section numbering and output path resolution.
//!
//! Scraped wiki pages carry a hierarchical number such as `"3"` or `"5.2"`.
//! The overview page holds slot `1`, so every other top-level section is
//! shifted down by one when it becomes a file prefix. Subsections are grouped
//! under a `section-<N>` directory named after their parent.
//!
//! A subsection of the overview (`"1.q"`) keeps its first component as `1`
//! instead of being shifted to `0`. Downstream book layouts depend on that
//! exact mapping, so it is preserved here even though it is asymmetric with
//! the other sections.

use crate::slug::slugify;
use thiserror::Error;

/// The raw number that identifies the overview page
const OVERVIEW_NUMBER: &str = "1";

/// Maximum supported nesting depth (section and subsection)
const MAX_DEPTH: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Invalid section number {raw:?}: {reason}")]
    InvalidNumber { raw: String, reason: &'static str },
}

impl NumberingError {
    fn invalid(raw: &str, reason: &'static str) -> Self {
        NumberingError::InvalidNumber {
            raw: raw.to_string(),
            reason,
        }
    }
}

/// Normalized number components of a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumberParts {
    /// The overview page; no numeric prefix
    Overview,
    /// A top-level section
    Section(String),
    /// A subsection nested under a top-level section
    Subsection(String, String),
}

impl NumberParts {
    /// The components as an ordered sequence (empty for the overview)
    pub fn parts(&self) -> Vec<&str> {
        match self {
            NumberParts::Overview => Vec::new(),
            NumberParts::Section(p0) => vec![p0.as_str()],
            NumberParts::Subsection(p0, p1) => vec![p0.as_str(), p1.as_str()],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NumberParts::Overview => 0,
            NumberParts::Section(_) => 1,
            NumberParts::Subsection(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NumberParts::Overview)
    }
}

/// File name and optional section directory for a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    pub filename: String,
    pub section_group: Option<String>,
}

impl ResolvedPath {
    /// Relative target path, `section-<N>/<file>` or just `<file>`
    pub fn target_path(&self) -> String {
        match &self.section_group {
            Some(group) => format!("{}/{}", group, self.filename),
            None => self.filename.clone(),
        }
    }
}

/// Normalize a raw section number into path components
///
/// # Examples
///
/// ```
/// use wikiprep_core::normalized_number_parts;
///
/// assert!(normalized_number_parts("1").unwrap().parts().is_empty());
/// assert_eq!(normalized_number_parts("4").unwrap().parts(), vec!["3"]);
/// assert_eq!(normalized_number_parts("4.2").unwrap().parts(), vec!["3", "2"]);
/// assert_eq!(normalized_number_parts("1.3").unwrap().parts(), vec!["1", "3"]);
/// ```
pub fn normalized_number_parts(raw: &str) -> Result<NumberParts, NumberingError> {
    if raw == OVERVIEW_NUMBER {
        return Ok(NumberParts::Overview);
    }

    let components: Vec<&str> = raw.split('.').collect();
    if components.len() > MAX_DEPTH {
        return Err(NumberingError::invalid(
            raw,
            "only two levels of nesting are supported",
        ));
    }

    for component in &components {
        validate_component(raw, component)?;
    }

    let first = shift_top_level(raw, components[0])?;
    match components.get(1) {
        Some(second) => Ok(NumberParts::Subsection(first, second.to_string())),
        None => Ok(NumberParts::Section(first)),
    }
}

fn validate_component(raw: &str, component: &str) -> Result<(), NumberingError> {
    if component.is_empty() {
        return Err(NumberingError::invalid(raw, "empty number component"));
    }
    if !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NumberingError::invalid(
            raw,
            "number components must be non-negative integers",
        ));
    }
    Ok(())
}

/// Shift the first component down by one to account for the overview slot.
/// A value of 1 (or 0) keeps its original text.
fn shift_top_level(raw: &str, component: &str) -> Result<String, NumberingError> {
    let value: u64 = component
        .parse()
        .map_err(|_| NumberingError::invalid(raw, "number component out of range"))?;

    if value > 1 {
        Ok((value - 1).to_string())
    } else {
        Ok(component.to_string())
    }
}

/// Resolve the output file name and section directory for a page
///
/// # Examples
///
/// ```
/// use wikiprep_core::resolve_output_path;
///
/// let resolved = resolve_output_path("5.2", "HTML to Markdown Conversion").unwrap();
/// assert_eq!(resolved.filename, "4-2-html-to-markdown-conversion.md");
/// assert_eq!(resolved.section_group.as_deref(), Some("section-4"));
/// ```
pub fn resolve_output_path(raw: &str, title: &str) -> Result<ResolvedPath, NumberingError> {
    let slug = slugify(title);

    let resolved = match normalized_number_parts(raw)? {
        NumberParts::Overview => ResolvedPath {
            filename: format!("{}.md", slug),
            section_group: None,
        },
        NumberParts::Section(p0) => ResolvedPath {
            filename: format!("{}-{}.md", p0, slug),
            section_group: None,
        },
        NumberParts::Subsection(p0, p1) => ResolvedPath {
            filename: format!("{}-{}-{}.md", p0, p1, slug),
            section_group: Some(format!("section-{}", p0)),
        },
    };

    Ok(resolved)
}

/// Build the relative path a page should be written to
///
/// This is the only supported way to derive page paths; it keeps section
/// grouping and file naming consistent.
///
/// # Examples
///
/// ```
/// use wikiprep_core::build_target_path;
///
/// assert_eq!(
///     build_target_path("6.2", "Diagram Extraction").unwrap(),
///     "section-5/5-2-diagram-extraction.md"
/// );
/// ```
pub fn build_target_path(raw: &str, title: &str) -> Result<String, NumberingError> {
    resolve_output_path(raw, title).map(|resolved| resolved.target_path())
}
