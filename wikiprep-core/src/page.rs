//! Page assembly for scraped wiki pages.
//!
//! Ties the individual transforms together: a page's section number and title
//! decide where it is written, its markdown body gets its mermaid blocks
//! repaired, and the final content is wrapped in rendered header and footer
//! templates.

use crate::mermaid::normalize_mermaid_blocks;
use crate::numbering::{build_target_path, NumberingError};
use crate::template::{process_template, TemplateVars};

/// A page ready to be written below the book's source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPage {
    /// Relative path, e.g. `section-4/4-2-html-to-markdown-conversion.md`
    pub target_path: String,
    /// Markdown body with repaired diagrams
    pub body: String,
}

/// Resolve the target path and repair the diagrams of one scraped page
pub fn prepare_page(number: &str, title: &str, body: &str) -> Result<PreparedPage, NumberingError> {
    let target_path = build_target_path(number, title)?;
    tracing::debug!("Preparing page {} ({}) -> {}", number, title, target_path);

    Ok(PreparedPage {
        target_path,
        body: normalize_mermaid_blocks(body),
    })
}

/// Wrap page content with rendered header and footer templates.
///
/// Rendered templates are trimmed and parts are separated by a blank line; a
/// template that renders to nothing but whitespace is left out.
pub fn stamp_page(
    body: &str,
    header: Option<&str>,
    footer: Option<&str>,
    vars: &TemplateVars,
) -> String {
    let render = |template: Option<&str>| {
        template
            .map(|t| process_template(t, vars))
            .filter(|rendered| !rendered.trim().is_empty())
    };

    let mut parts = Vec::with_capacity(3);
    if let Some(header) = render(header) {
        parts.push(header.trim().to_string());
    }
    parts.push(body.to_string());
    if let Some(footer) = render(footer) {
        parts.push(footer.trim().to_string());
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_page() {
        let body = "# Diagram Extraction\n\n```mermaid\ngraph TD\n    A[\"\"] --> B B --> C\n```\n";
        let page = prepare_page("6.2", "Diagram Extraction", body).unwrap();

        assert_eq!(page.target_path, "section-5/5-2-diagram-extraction.md");
        assert_eq!(
            page.body,
            "# Diagram Extraction\n\n```mermaid\ngraph TD\n    A[\"A\"] --> B\n    B --> C\n```\n"
        );
    }

    #[test]
    fn test_prepare_overview_page() {
        let page = prepare_page("1", "Overview", "Plain text\n").unwrap();
        assert_eq!(page.target_path, "overview.md");
        assert_eq!(page.body, "Plain text\n");
    }

    #[test]
    fn test_prepare_page_rejects_bad_number() {
        let result = prepare_page("2.1.1", "Too Deep", "");
        assert!(matches!(result, Err(NumberingError::InvalidNumber { .. })));
    }

    #[test]
    fn test_stamp_page() {
        let vars: TemplateVars = [("TITLE", "My Book"), ("REPO", "owner/repo")]
            .into_iter()
            .collect();
        let stamped = stamp_page(
            "# Page\n\nBody text",
            Some("<!-- header -->\n<p>{{TITLE}}</p>\n"),
            Some("\n<hr>\n<p>{{REPO}}</p>"),
            &vars,
        );

        assert_eq!(
            stamped,
            "<p>My Book</p>\n\n# Page\n\nBody text\n\n<hr>\n<p>owner/repo</p>"
        );
    }

    #[test]
    fn test_stamp_page_skips_empty_parts() {
        let vars = TemplateVars::new();
        let stamped = stamp_page(
            "Body",
            Some("{{#if GIT_REPO_URL}}<a>repo</a>{{/if}}"),
            None,
            &vars,
        );
        assert_eq!(stamped, "Body");
    }
}
