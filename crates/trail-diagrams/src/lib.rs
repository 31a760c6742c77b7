//! Diagram rendering via Kroki for Trail.
//!
//! [`DiagramProcessor`] implements `CodeBlockProcessor`: diagram fences are
//! swapped for placeholders while the markdown is walked, then rendered to SVG
//! in parallel and embedded as `<figure class="diagram">` elements.
//!
//! Recognised fence languages are listed on [`DiagramLanguage`]; the
//! `kroki-` prefix is accepted for each of them.
//!
//! # Example
//!
//! ```ignore
//! use trail_diagrams::DiagramProcessor;
//! use trail_renderer::MarkdownRenderer;
//!
//! let markdown = "```mermaid\ngraph TD\n  A --> B\n```";
//! let mut renderer = MarkdownRenderer::new()
//!     .with_processor(DiagramProcessor::new("https://kroki.io"));
//!
//! // render_markdown() calls post_process() on all processors
//! let result = renderer.render_markdown(markdown);
//! ```

mod consts;
mod kroki;
mod language;
mod processor;

pub use kroki::{DiagramError, DiagramErrorKind};
pub use language::DiagramLanguage;
pub use processor::DiagramProcessor;
