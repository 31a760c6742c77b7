//! Code block processor trait.
//!
//! Processors are registered with the renderer and offered every fenced code
//! block (and every `<pre><code class="language-…">` block found in raw HTML).
//! The first processor returning a non-`PassThrough` result wins.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use trail_renderer::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult};
//!
//! struct MermaidCollector {
//!     extracted: Vec<ExtractedCodeBlock>,
//! }
//!
//! impl CodeBlockProcessor for MermaidCollector {
//!     fn process(
//!         &mut self,
//!         language: &str,
//!         attrs: &HashMap<String, String>,
//!         source: &str,
//!         index: usize,
//!     ) -> ProcessResult {
//!         if language == "mermaid" {
//!             self.extracted.push(ExtractedCodeBlock {
//!                 index,
//!                 language: language.to_owned(),
//!                 source: source.to_owned(),
//!                 attrs: attrs.clone(),
//!             });
//!             ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
//!         } else {
//!             ProcessResult::PassThrough
//!         }
//!     }
//!
//!     fn extracted(&self) -> &[ExtractedCodeBlock] {
//!         &self.extracted
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace code block with placeholder for deferred processing.
    ///
    /// Use when processing requires external resources (HTTP calls).
    /// The processor replaces its placeholders in [`CodeBlockProcessor::post_process`].
    Placeholder(String),

    /// Replace code block with inline HTML immediately.
    Inline(String),

    /// Render as a regular code block.
    PassThrough,
}

/// Code block captured for deferred processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedCodeBlock {
    /// Zero-based index of this code block in the document.
    pub index: usize,
    /// Language identifier from fence (e.g., "mermaid").
    pub language: String,
    /// Raw source content of the code block.
    pub source: String,
    /// Attributes parsed from fence (e.g., `theme=dark` → {"theme": "dark"}).
    pub attrs: HashMap<String, String>,
}

/// Trait for processing special code blocks.
///
/// Processors must be `Send` so a renderer can be built on one thread and
/// driven on another.
pub trait CodeBlockProcessor: Send {
    /// Process a code block and return the result.
    ///
    /// * `language` - Language identifier from fence info string
    /// * `attrs` - Attributes parsed from fence (key=value pairs)
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based index for placeholder generation
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult;

    /// Replace placeholders in the rendered HTML.
    ///
    /// Called once by the renderer after all events are processed.
    fn post_process(&mut self, _html: &mut String) {}

    /// Blocks that were processed with `ProcessResult::Placeholder`.
    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &[]
    }

    /// Non-fatal notes produced during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }

    /// Blocks that failed to render and were replaced by an error placeholder.
    ///
    /// Callers decide whether these abort the build.
    fn errors(&self) -> &[String] {
        &[]
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fence_info_language_only() {
        let (lang, attrs) = parse_fence_info("rust");
        assert_eq!(lang, "rust");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_parse_fence_info_multiple_attrs() {
        let (lang, attrs) = parse_fence_info("mermaid theme=dark format=svg");
        assert_eq!(lang, "mermaid");
        assert_eq!(attrs.get("theme"), Some(&"dark".to_owned()));
        assert_eq!(attrs.get("format"), Some(&"svg".to_owned()));
    }

    #[test]
    fn test_parse_fence_info_quoted_values() {
        let (lang, attrs) = parse_fence_info("mermaid theme='forest'");
        assert_eq!(lang, "mermaid");
        assert_eq!(attrs.get("theme"), Some(&"forest".to_owned()));
    }

    #[test]
    fn test_parse_fence_info_ignores_bare_words() {
        let (lang, attrs) = parse_fence_info("js title");
        assert_eq!(lang, "js");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_parse_fence_info_whitespace_only() {
        let (lang, attrs) = parse_fence_info("   ");
        assert_eq!(lang, "");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_default_trait_implementations() {
        struct MinimalProcessor;

        impl CodeBlockProcessor for MinimalProcessor {
            fn process(
                &mut self,
                _language: &str,
                _attrs: &HashMap<String, String>,
                _source: &str,
                _index: usize,
            ) -> ProcessResult {
                ProcessResult::PassThrough
            }
        }

        let mut processor = MinimalProcessor;
        let mut html = String::from("<p>x</p>");
        processor.post_process(&mut html);

        assert_eq!(html, "<p>x</p>");
        assert!(processor.extracted().is_empty());
        assert!(processor.warnings().is_empty());
        assert!(processor.errors().is_empty());
    }
}
