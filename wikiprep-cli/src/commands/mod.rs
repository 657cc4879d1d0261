//! CLI command implementations.

pub mod render;

pub use render::{render_template, RenderOptions};
