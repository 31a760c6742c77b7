//! Code block processor for diagram languages.
//!
//! This module provides [`DiagramProcessor`], which implements the
//! [`CodeBlockProcessor`] trait for extracting diagram code blocks during
//! rendering and splicing rendered SVG back in afterwards.

use std::collections::HashMap;
use std::time::Duration;

use trail_renderer::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult, escape_html};
use ureq::Agent;

use crate::consts::{DEFAULT_THEME, DEFAULT_TIMEOUT, PLACEHOLDER_PREFIX};
use crate::kroki::{DiagramRequest, create_agent, render_all_svg};
use crate::language::DiagramLanguage;

/// Attributes a diagram fence may carry.
const KNOWN_ATTRS: &[&str] = &["theme"];

/// Configuration for diagram processing (immutable after setup).
struct ProcessorConfig {
    /// Kroki server URL for rendering diagrams.
    kroki_url: String,
    /// Theme applied to diagrams without a `theme=` attribute.
    theme: String,
    /// HTTP agent reused across render calls.
    agent: Agent,
}

/// Code block processor for diagram languages.
///
/// Diagram blocks are replaced with `{{DIAGRAM_N}}` placeholders while the
/// document is walked; [`post_process`](CodeBlockProcessor::post_process) then
/// renders them all in parallel and swaps each placeholder for an inline
/// `<figure class="diagram">` holding the SVG.
///
/// A diagram that fails to render becomes an error figure. The failure is
/// reported through [`errors`](CodeBlockProcessor::errors) so the caller can
/// decide whether it aborts the build.
///
/// # Example
///
/// ```ignore
/// use trail_diagrams::DiagramProcessor;
/// use trail_renderer::MarkdownRenderer;
///
/// let mut renderer = MarkdownRenderer::new()
///     .with_processor(DiagramProcessor::new("https://kroki.io").theme("forest"));
///
/// // render_markdown() calls post_process() on all processors
/// let result = renderer.render_markdown("```mermaid\ngraph TD; A-->B\n```");
/// ```
pub struct DiagramProcessor {
    config: ProcessorConfig,
    extracted: Vec<ExtractedCodeBlock>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl DiagramProcessor {
    /// Create a new diagram processor with the given Kroki server URL.
    #[must_use]
    pub fn new(kroki_url: impl Into<String>) -> Self {
        Self {
            config: ProcessorConfig {
                kroki_url: kroki_url.into(),
                theme: DEFAULT_THEME.to_owned(),
                agent: create_agent(DEFAULT_TIMEOUT),
            },
            extracted: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Set the default diagram theme (Mermaid only). Default is `neutral`.
    #[must_use]
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.config.theme = theme.into();
        self
    }

    /// Set HTTP timeout for Kroki requests. Default is 30 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.agent = create_agent(timeout);
        self
    }

    fn to_requests(&self) -> Vec<DiagramRequest> {
        self.extracted
            .iter()
            .filter_map(|block| {
                let language = DiagramLanguage::parse(&block.language)?;
                let theme = block
                    .attrs
                    .get("theme")
                    .cloned()
                    .unwrap_or_else(|| self.config.theme.clone());
                Some(DiagramRequest {
                    index: block.index,
                    source: block.source.clone(),
                    language,
                    theme: Some(theme),
                })
            })
            .collect()
    }
}

impl CodeBlockProcessor for DiagramProcessor {
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        if DiagramLanguage::parse(language).is_none() {
            return ProcessResult::PassThrough;
        }

        let mut unknown: Vec<_> = attrs
            .keys()
            .filter(|k| !KNOWN_ATTRS.contains(&k.as_str()))
            .collect();
        unknown.sort();
        for key in unknown {
            self.warnings.push(format!(
                "diagram {index}: unknown attribute '{key}' ignored (valid: theme)"
            ));
        }

        self.extracted.push(ExtractedCodeBlock {
            index,
            language: language.to_owned(),
            source: source.to_owned(),
            attrs: attrs.clone(),
        });

        ProcessResult::Placeholder(format!("{PLACEHOLDER_PREFIX}{index}}}}}"))
    }

    fn post_process(&mut self, html: &mut String) {
        let requests = self.to_requests();
        if requests.is_empty() {
            return;
        }

        let mut replacements = Replacements::with_capacity(requests.len());
        let result = render_all_svg(&requests, &self.config.kroki_url, &self.config.agent);

        for r in result.rendered {
            replacements.add(r.index, format!(r#"<figure class="diagram">{}</figure>"#, r.svg));
        }

        let mut errors = result.errors;
        errors.sort_by_key(|e| e.index);
        for e in errors {
            let message = e.to_string();
            replacements.add_error(e.index, &message);
            self.errors.push(message);
        }

        replacements.apply(html);
    }

    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &self.extracted
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Collects diagram replacements for single-pass application.
struct Replacements {
    map: HashMap<usize, String>,
}

impl Replacements {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    fn add(&mut self, index: usize, content: String) {
        self.map.insert(index, content);
    }

    /// Add an error figure for a diagram placeholder.
    fn add_error(&mut self, index: usize, error_msg: &str) {
        let error_figure = format!(
            r#"<figure class="diagram diagram-error"><pre>Diagram rendering failed: {}</pre></figure>"#,
            escape_html(error_msg)
        );
        self.add(index, error_figure);
    }

    /// Replace every `{{DIAGRAM_N}}` placeholder in one scan.
    ///
    /// Placeholders without a replacement are left as written.
    fn apply(self, html: &mut String) {
        if self.map.is_empty() {
            return;
        }

        let mut result = String::with_capacity(html.len());
        let mut remaining = html.as_str();

        while let Some(start) = remaining.find(PLACEHOLDER_PREFIX) {
            result.push_str(&remaining[..start]);

            let after_prefix = &remaining[start + PLACEHOLDER_PREFIX.len()..];
            let Some(end_pos) = after_prefix.find("}}") else {
                result.push_str(&remaining[start..]);
                remaining = "";
                break;
            };

            let placeholder_end = start + PLACEHOLDER_PREFIX.len() + end_pos + 2;
            let replacement = after_prefix[..end_pos]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.map.get(&index));
            match replacement {
                Some(content) => result.push_str(content),
                None => result.push_str(&remaining[start..placeholder_end]),
            }
            remaining = &remaining[placeholder_end..];
        }

        result.push_str(remaining);
        *html = result;
    }
}
