//! Markdown body rendering.
//!
//! Provides [`PageRenderer`], which runs a page body through the markdown
//! pipeline and, when a Kroki server is configured, renders diagram fences to
//! inline SVG.

use std::path::Path;
use std::time::Duration;

use trail_diagrams::DiagramProcessor;
use trail_renderer::{MarkdownRenderer, TocEntry};

/// Result of rendering a page body.
#[derive(Clone, Debug)]
pub struct PageRenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Warnings generated during conversion (e.g., unknown fence attributes).
    pub warnings: Vec<String>,
}

/// Error returned when page rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// One or more diagrams could not be rendered and failures are fatal.
    #[error("{} diagram(s) failed to render: {}", .0.len(), .0.join("; "))]
    Diagrams(Vec<String>),
}

/// Configuration for [`PageRenderer`].
#[derive(Clone, Debug, Default)]
pub struct PageRendererConfig {
    /// Kroki URL for diagram rendering.
    ///
    /// If `None`, diagram fences are rendered as plain code blocks.
    pub kroki_url: Option<String>,
    /// Default Mermaid theme. `None` keeps the processor default.
    pub diagram_theme: Option<String>,
    /// HTTP timeout for Kroki requests. `None` keeps the processor default.
    pub diagram_timeout: Option<Duration>,
    /// Abort rendering when any diagram fails instead of embedding an error
    /// figure in its place.
    pub fail_on_diagram_error: bool,
}

/// Stateless page renderer.
///
/// Every call builds a fresh [`MarkdownRenderer`], so one `PageRenderer` can be
/// shared by threads rendering different pages at the same time.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use trail_site::{PageRenderer, PageRendererConfig};
///
/// let renderer = PageRenderer::new(PageRendererConfig::default());
/// let result = renderer.render(Path::new("intro.md"), "## Setup\n\nText").unwrap();
/// assert_eq!(result.html, r#"<h2 id="setup">Setup</h2><p>Text</p>"#);
/// ```
pub struct PageRenderer {
    config: PageRendererConfig,
}

impl PageRenderer {
    /// Create a new page renderer.
    #[must_use]
    pub fn new(config: PageRendererConfig) -> Self {
        Self { config }
    }

    /// Render a markdown body to HTML.
    ///
    /// `source_path` is only used for log context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Diagrams`] if diagrams failed and
    /// `fail_on_diagram_error` is set.
    pub fn render(
        &self,
        source_path: &Path,
        markdown: &str,
    ) -> Result<PageRenderResult, RenderError> {
        let mut renderer = MarkdownRenderer::new();
        if let Some(processor) = self.create_diagram_processor() {
            renderer = renderer.with_processor(processor);
        }

        let result = renderer.render_markdown(markdown);

        for warning in &result.warnings {
            tracing::warn!(path = %source_path.display(), "{warning}");
        }

        if !result.errors.is_empty() {
            if self.config.fail_on_diagram_error {
                return Err(RenderError::Diagrams(result.errors));
            }
            for error in &result.errors {
                tracing::warn!(
                    path = %source_path.display(),
                    error = %error,
                    "Diagram replaced with error figure"
                );
            }
        }

        Ok(PageRenderResult {
            html: result.html,
            toc: result.toc,
            warnings: result.warnings,
        })
    }

    fn create_diagram_processor(&self) -> Option<DiagramProcessor> {
        let url = self.config.kroki_url.as_ref()?;
        let mut processor = DiagramProcessor::new(url);
        if let Some(theme) = &self.config.diagram_theme {
            processor = processor.theme(theme);
        }
        if let Some(timeout) = self.config.diagram_timeout {
            processor = processor.timeout(timeout);
        }
        Some(processor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn unreachable_kroki(fail_on_diagram_error: bool) -> PageRenderer {
        PageRenderer::new(PageRendererConfig {
            kroki_url: Some("http://127.0.0.1:1".to_owned()),
            diagram_timeout: Some(Duration::from_secs(2)),
            fail_on_diagram_error,
            ..Default::default()
        })
    }

    #[test]
    fn test_render_without_kroki_keeps_diagram_as_code() {
        let renderer = PageRenderer::new(PageRendererConfig::default());

        let result = renderer
            .render(Path::new("a.md"), "```mermaid\ngraph TD\n```")
            .unwrap();

        assert_eq!(
            result.html,
            "<pre><code class=\"language-mermaid\">graph TD\n</code></pre>"
        );
    }

    #[test]
    fn test_render_toc_and_duplicate_ids() {
        let renderer = PageRenderer::new(PageRendererConfig::default());

        let result = renderer
            .render(Path::new("a.md"), "## Overview\n\n## Overview")
            .unwrap();

        let ids: Vec<_> = result.toc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["overview", "overview-1"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PageRenderer::new(PageRendererConfig::default());
        let markdown = "# T\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~ <span>raw</span>\n\n## T";

        let first = renderer.render(Path::new("a.md"), markdown).unwrap();
        let second = renderer.render(Path::new("a.md"), markdown).unwrap();

        assert_eq!(first.html, second.html);
    }

    #[test]
    fn test_diagram_failure_degrades_by_default() {
        let renderer = unreachable_kroki(false);

        let result = renderer
            .render(Path::new("a.md"), "Before\n\n```mermaid\ngraph TD\n```\n\nAfter")
            .unwrap();

        assert!(result.html.contains(r#"<figure class="diagram diagram-error">"#));
        assert!(result.html.starts_with("<p>Before</p>"));
        assert!(result.html.ends_with("<p>After</p>"));
    }

    #[test]
    fn test_diagram_failure_is_fatal_when_configured() {
        let renderer = unreachable_kroki(true);

        let err = renderer
            .render(Path::new("a.md"), "```mermaid\ngraph TD\n```")
            .unwrap_err();

        let RenderError::Diagrams(errors) = &err;
        assert_eq!(errors.len(), 1);
        assert!(err.to_string().starts_with("1 diagram(s) failed to render: diagram 0:"));
    }
}
