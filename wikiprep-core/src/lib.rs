//! # wikiprep-core
//!
//! Core transformations for publishing scraped wiki pages as a static book.
//!
//! This crate repairs mermaid diagram sources, maps hierarchical section
//! numbers onto output file paths, and renders the small placeholder template
//! language used for page headers and footers.

pub mod config;
pub mod mermaid;
pub mod numbering;
pub mod page;
pub mod slug;
pub mod template;

pub use config::{ConfigError, TemplateConfig};
pub use mermaid::{normalize_mermaid_blocks, normalize_mermaid_diagram};
pub use numbering::{
    build_target_path, normalized_number_parts, resolve_output_path, NumberParts, NumberingError,
    ResolvedPath,
};
pub use page::{prepare_page, stamp_page, PreparedPage};
pub use slug::slugify;
pub use template::{process_template, TemplateVars};
