//! Markdown to HTML conversion for Quire.
//!
//! Wraps `pulldown-cmark` events in a small HTML writer that assigns stable,
//! unique `id` attributes to headings and collects them as [`TocEntry`] values,
//! so callers can render a table of contents whose anchors match the content.
//!
//! # Example
//!
//! ```
//! use quire_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("# Hello\n\n## Usage\n\n**Bold** text");
//! assert!(result.html.contains(r#"<h2 id="usage">Usage</h2>"#));
//! assert_eq!(result.toc.len(), 2);
//! ```

mod html;
mod renderer;
mod state;

pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
