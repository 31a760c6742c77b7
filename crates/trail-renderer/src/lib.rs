//! Markdown to HTML rendering for Trail.
//!
//! This crate provides a [`MarkdownRenderer`] that turns a markdown body into
//! an HTML string in a single pass over `pulldown-cmark` events:
//!
//! - GFM tables, strikethrough and task lists are enabled by default
//! - Raw HTML written by the author is passed through unchanged
//! - Raw HTML blocks are re-scanned so their headings get anchor ids and their
//!   `<pre><code class="language-…">` blocks reach the code block processors
//! - Every heading gets a unique, deterministic anchor id (see [`Slugger`])
//! - Fenced code blocks can be intercepted by a [`CodeBlockProcessor`]
//!   (diagram rendering lives in `trail-diagrams`)
//!
//! # Example
//!
//! ```
//! use trail_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("## Overview\n\n**Bold** text");
//! assert_eq!(
//!     result.html,
//!     r#"<h2 id="overview">Overview</h2><p><strong>Bold</strong> text</p>"#
//! );
//! ```

mod code_block;
mod html;
mod raw;
mod renderer;
mod slug;
mod state;

pub use code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult};
pub use html::{escape_html, unescape_html};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use slug::{Slugger, slugify};
pub use state::TocEntry;
