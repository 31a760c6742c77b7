//! Markdown to HTML renderer.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult};
use crate::html::{self, escape_html};
use crate::raw;
use crate::state::{
    CodeBlockState, HeadingState, ImageState, TableState, TocEntry, heading_level_to_num,
};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Table of contents entries, one per heading in document order.
    pub toc: Vec<TocEntry>,
    /// Warnings generated by processors.
    pub warnings: Vec<String>,
    /// Code blocks that failed to render and were replaced by an error placeholder.
    pub errors: Vec<String>,
}

/// Markdown to HTML renderer.
///
/// A renderer is single-use: create one per document so heading ids and code
/// block indexes start fresh.
///
/// # Code Block Processors
///
/// Custom code block processing can be added via [`with_processor`](Self::with_processor).
/// Processors are checked in order; the first returning a non-`PassThrough` result wins.
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    /// Raw HTML collected between `Start(HtmlBlock)` and `End(HtmlBlock)`.
    html_block: Option<String>,
    gfm: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            processors: Vec::new(),
            code_block_index: 0,
            html_block: None,
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text directly using configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        self.render(self.create_parser(markdown))
    }

    /// Add a code block processor.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use trail_renderer::{CodeBlockProcessor, MarkdownRenderer, ProcessResult};
    ///
    /// struct Shout;
    ///
    /// impl CodeBlockProcessor for Shout {
    ///     fn process(
    ///         &mut self,
    ///         language: &str,
    ///         _attrs: &HashMap<String, String>,
    ///         source: &str,
    ///         _index: usize,
    ///     ) -> ProcessResult {
    ///         if language == "shout" {
    ///             ProcessResult::Inline(format!("<p>{}</p>", source.trim().to_uppercase()))
    ///         } else {
    ///             ProcessResult::PassThrough
    ///         }
    ///     }
    /// }
    ///
    /// let result = MarkdownRenderer::new()
    ///     .with_processor(Shout)
    ///     .render_markdown("```shout\nhello\n```");
    /// assert_eq!(result.html, "<p>HELLO</p>");
    /// ```
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Get all extracted code blocks from all processors.
    pub fn extracted_code_blocks(&self) -> impl Iterator<Item = ExtractedCodeBlock> + '_ {
        self.processors.iter().flat_map(|p| p.extracted()).cloned()
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    /// Render markdown events and return the result.
    ///
    /// Calls `post_process` on all registered processors to replace
    /// placeholders with rendered content.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let mut html = std::mem::take(&mut self.output);
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }

        RenderResult {
            html,
            toc: self.heading.take_toc(),
            warnings: self
                .processors
                .iter()
                .flat_map(|p| p.warnings())
                .cloned()
                .collect(),
            errors: self
                .processors
                .iter()
                .flat_map(|p| p.errors())
                .cloned()
                .collect(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.block_html(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => html::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => self.code.start(&kind),
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = self.table.cell_tag();
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Link { dest_url, title, .. } => {
                let link_tag = if title.is_empty() {
                    format!(r#"<a href="{}">"#, escape_html(&dest_url))
                } else {
                    format!(
                        r#"<a href="{}" title="{}">"#,
                        escape_html(&dest_url),
                        escape_html(&title)
                    )
                };
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(&dest_url, &title),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let block = self.code.end();
                let index = self.next_code_block_index();

                let processed = block.language.as_deref().and_then(|lang| {
                    run_processors(&mut self.processors, lang, &block.attrs, &block.source, index)
                });

                match processed {
                    Some(html) => self.output.push_str(&html),
                    None => html::code_block(
                        block.language.as_deref(),
                        &block.source,
                        &mut self.output,
                    ),
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(block) = self.html_block.take() {
                    self.flush_html_block(&block);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                if let Some(img) = self.image.end() {
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn next_code_block_index(&mut self) -> usize {
        let index = self.code_block_index;
        self.code_block_index += 1;
        index
    }

    fn block_html(&mut self, html: &str) {
        match self.html_block.as_mut() {
            Some(block) => block.push_str(html),
            None => self.output.push_str(html),
        }
    }

    /// Re-scan a finished raw HTML block for headings and code blocks.
    fn flush_html_block(&mut self, block: &str) {
        let processors = &mut self.processors;
        let code_block_index = &mut self.code_block_index;
        let empty_attrs = HashMap::new();

        let rewritten = raw::rewrite_block(block, &mut self.heading, |lang, source| {
            let index = *code_block_index;
            *code_block_index += 1;
            run_processors(processors.as_mut_slice(), lang, &empty_attrs, source, index)
        });
        self.output.push_str(&rewritten);
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else {
            self.push_inline("\n");
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Offer a code block to each processor in turn.
///
/// Returns the HTML to splice in, or `None` if every processor passed.
fn run_processors(
    processors: &mut [Box<dyn CodeBlockProcessor>],
    lang: &str,
    attrs: &HashMap<String, String>,
    source: &str,
    index: usize,
) -> Option<String> {
    processors
        .iter_mut()
        .find_map(|processor| match processor.process(lang, attrs, source, index) {
            ProcessResult::Placeholder(html) | ProcessResult::Inline(html) => Some(html),
            ProcessResult::PassThrough => None,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render_html(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_html_basic_paragraph() {
        let result = render_html("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_html_heading_with_id() {
        let result = render_html("## Section Title");
        assert_eq!(result.html, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.toc[0].level, 2);
        assert_eq!(result.toc[0].title, "Section Title");
        assert_eq!(result.toc[0].id, "section-title");
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render_html("## Overview\n\n## Overview\n\n## Overview");
        let ids: Vec<_> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["overview", "overview-1", "overview-2"]);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render_html("## Install `npm`");
        assert_eq!(
            result.html,
            r#"<h2 id="install-npm">Install <code>npm</code></h2>"#
        );
        assert_eq!(result.toc[0].title, "Install npm");
    }

    #[test]
    fn test_heading_with_link() {
        let result = render_html("## See [docs](https://example.com)");
        assert_eq!(
            result.html,
            r#"<h2 id="see-docs">See <a href="https://example.com">docs</a></h2>"#
        );
    }

    #[test]
    fn test_html_code_block() {
        let result = render_html("```rust\nfn main() {}\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_html_image() {
        let result = render_html("![Alt text](image.png)");
        assert_eq!(
            result.html,
            r#"<p><img src="image.png" alt="Alt text"></p>"#
        );
    }

    #[test]
    fn test_html_table() {
        let result = render_html("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            result.html,
            concat!(
                r#"<table><thead><tr><th style="text-align:left">A</th>"#,
                r#"<th style="text-align:right">B</th></tr></thead>"#,
                r#"<tbody><tr><td style="text-align:left">1</td>"#,
                r#"<td style="text-align:right">2</td></tr></tbody></table>"#
            )
        );
    }

    #[test]
    fn test_strikethrough() {
        let result = render_html("~~deleted~~");
        assert_eq!(result.html, "<p><del>deleted</del></p>");
    }

    #[test]
    fn test_task_list() {
        let result = render_html("- [ ] Unchecked\n- [x] Checked");
        assert!(result.html.contains(r#"<input type="checkbox" disabled> "#));
        assert!(
            result
                .html
                .contains(r#"<input type="checkbox" checked disabled> "#)
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let result = render_html("3. Three\n4. Four");
        assert_eq!(result.html, r#"<ol start="3"><li>Three</li><li>Four</li></ol>"#);
    }

    #[test]
    fn test_gfm_disabled() {
        let mut renderer = MarkdownRenderer::new().with_gfm(false);
        let result = renderer.render_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(!result.html.contains("<table>"));
    }

    #[test]
    fn test_parser_options_with_gfm() {
        let options = MarkdownRenderer::new().parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
    }

    #[test]
    fn test_inline_html_passthrough() {
        let result = render_html("Press <kbd>Ctrl</kbd>+<kbd>C</kbd>");
        assert_eq!(result.html, "<p>Press <kbd>Ctrl</kbd>+<kbd>C</kbd></p>");
    }

    #[test]
    fn test_raw_html_block_passthrough() {
        let result = render_html("<div class=\"note\">\n<p>Hi</p>\n</div>\n\nAfter");
        assert_eq!(
            result.html,
            "<div class=\"note\">\n<p>Hi</p>\n</div>\n<p>After</p>"
        );
    }

    #[test]
    fn test_raw_html_heading_shares_slugger() {
        let result = render_html("## Setup\n\n<h2>Setup</h2>\n");
        assert_eq!(
            result.html,
            "<h2 id=\"setup\">Setup</h2><h2 id=\"setup-1\">Setup</h2>\n"
        );
        assert_eq!(result.toc.len(), 2);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let markdown = "# Title\n\n## A\n\n<h2>A</h2>\n\n| x |\n|---|\n| 1 |\n\n```sh\nls\n```";
        assert_eq!(render_html(markdown).html, render_html(markdown).html);
    }

    // Code block processor tests

    struct PlaceholderProcessor {
        extracted: Vec<ExtractedCodeBlock>,
    }

    impl PlaceholderProcessor {
        fn new() -> Self {
            Self {
                extracted: Vec::new(),
            }
        }
    }

    impl CodeBlockProcessor for PlaceholderProcessor {
        fn process(
            &mut self,
            language: &str,
            attrs: &HashMap<String, String>,
            source: &str,
            index: usize,
        ) -> ProcessResult {
            if language == "mermaid" {
                self.extracted.push(ExtractedCodeBlock {
                    index,
                    language: language.to_owned(),
                    source: source.to_owned(),
                    attrs: attrs.clone(),
                });
                ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
            } else {
                ProcessResult::PassThrough
            }
        }

        fn post_process(&mut self, html: &mut String) {
            for block in &self.extracted {
                *html = html.replace(
                    &format!("{{{{DIAGRAM_{}}}}}", block.index),
                    &format!("<svg>{}</svg>", block.index),
                );
            }
        }

        fn extracted(&self) -> &[ExtractedCodeBlock] {
            &self.extracted
        }
    }

    #[test]
    fn test_processor_passthrough() {
        let mut renderer = MarkdownRenderer::new().with_processor(PlaceholderProcessor::new());
        let result = renderer.render_markdown("```rust\nfn main() {}\n```");

        assert!(result.html.contains(r#"class="language-rust""#));
    }

    #[test]
    fn test_processor_placeholder_and_post_process() {
        let mut renderer = MarkdownRenderer::new().with_processor(PlaceholderProcessor::new());
        let result = renderer.render_markdown("```mermaid theme=dark\nA --> B\n```");

        assert_eq!(result.html, "<svg>0</svg>");

        let extracted: Vec<_> = renderer.extracted_code_blocks().collect();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].source, "A --> B\n");
        assert_eq!(extracted[0].attrs.get("theme"), Some(&"dark".to_owned()));
    }

    #[test]
    fn test_processor_sees_raw_html_code_blocks() {
        let markdown = "```mermaid\nA\n```\n\n<pre><code class=\"language-mermaid\">B --&gt; C</code></pre>\n";
        let mut renderer = MarkdownRenderer::new().with_processor(PlaceholderProcessor::new());
        let result = renderer.render_markdown(markdown);

        assert_eq!(result.html, "<svg>0</svg><svg>1</svg>\n");

        let extracted: Vec<_> = renderer.extracted_code_blocks().collect();
        assert_eq!(extracted[1].source, "B --> C");
    }

    #[test]
    fn test_processor_code_block_without_language() {
        let mut renderer = MarkdownRenderer::new().with_processor(PlaceholderProcessor::new());
        let result = renderer.render_markdown("```\nplain text\n```");

        assert_eq!(result.html, "<pre><code>plain text\n</code></pre>");
    }

    struct FailingProcessor {
        errors: Vec<String>,
        warnings: Vec<String>,
    }

    impl CodeBlockProcessor for FailingProcessor {
        fn process(
            &mut self,
            language: &str,
            _attrs: &HashMap<String, String>,
            _source: &str,
            index: usize,
        ) -> ProcessResult {
            if language == "broken" {
                self.errors.push(format!("block {index} failed"));
                self.warnings.push("degraded".to_owned());
                ProcessResult::Inline("<pre>failed</pre>".to_owned())
            } else {
                ProcessResult::PassThrough
            }
        }

        fn warnings(&self) -> &[String] {
            &self.warnings
        }

        fn errors(&self) -> &[String] {
            &self.errors
        }
    }

    #[test]
    fn test_render_result_collects_errors_and_warnings() {
        let mut renderer = MarkdownRenderer::new().with_processor(FailingProcessor {
            errors: Vec::new(),
            warnings: Vec::new(),
        });
        let result = renderer.render_markdown("```broken\nx\n```\n\nText");

        assert_eq!(result.html, "<pre>failed</pre><p>Text</p>");
        assert_eq!(result.errors, vec!["block 0 failed".to_owned()]);
        assert_eq!(result.warnings, vec!["degraded".to_owned()]);
    }

    #[test]
    fn test_render_result_empty_by_default() {
        let result = render_html("Hello");
        assert!(result.warnings.is_empty());
        assert!(result.errors.is_empty());
    }
}
