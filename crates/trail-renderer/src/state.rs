//! State structs tracked while walking markdown events.

use std::collections::HashMap;

use pulldown_cmark::{Alignment, CodeBlockKind, HeadingLevel};

use crate::code_block::parse_fence_info;
use crate::html;
use crate::slug::Slugger;

/// A code block closed by [`CodeBlockState::end`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FinishedCodeBlock {
    /// First word of the fence info; `None` for indented blocks and bare fences.
    pub language: Option<String>,
    /// `key=value` pairs after the language.
    pub attrs: HashMap<String, String>,
    pub source: String,
}

/// Code block being collected, fence info included.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    block: FinishedCodeBlock,
}

impl CodeBlockState {
    /// Open a code block, splitting fence info into language and attributes.
    pub fn start(&mut self, kind: &CodeBlockKind<'_>) {
        let (language, attrs) = match kind {
            CodeBlockKind::Fenced(info) => parse_fence_info(info),
            CodeBlockKind::Indented => (String::new(), HashMap::new()),
        };
        self.active = true;
        self.block = FinishedCodeBlock {
            language: Some(language).filter(|l| !l.is_empty()),
            attrs,
            source: String::new(),
        };
    }

    pub fn end(&mut self) -> FinishedCodeBlock {
        self.active = false;
        std::mem::take(&mut self.block)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append source text.
    pub fn push_str(&mut self, text: &str) {
        self.block.source.push_str(text);
    }

    pub fn push_newline(&mut self) {
        self.block.source.push('\n');
    }
}

/// Column alignment and header/body position inside a table.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether the header row is open.
    in_head: bool,
    alignments: Vec<Alignment>,
    /// Column of the current cell.
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    /// Open the header row.
    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    /// `th` in the header row, `td` in the body.
    pub fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    /// Style attribute for the current cell's column alignment.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Image whose alt text is being collected.
///
/// Markdown alt text arrives as text events between the image's start and
/// end tags, so the `<img>` tag can only be written at the end.
#[derive(Default)]
pub(crate) struct ImageState {
    /// `(src, title)` of the open image.
    open: Option<(String, String)>,
    alt_text: String,
}

impl ImageState {
    pub fn start(&mut self, src: &str, title: &str) {
        self.open = Some((src.to_owned(), title.to_owned()));
        self.alt_text.clear();
    }

    /// Close the image and return its `<img>` tag.
    pub fn end(&mut self) -> Option<String> {
        let (src, title) = self.open.take()?;
        let mut img = String::new();
        html::image(&src, &self.alt_text, &title, &mut img);
        self.alt_text.clear();
        Some(img)
    }

    pub fn is_active(&self) -> bool {
        self.open.is_some()
    }

    /// Append alt text.
    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking headings and their anchor ids.
///
/// Markdown headings and headings found in raw HTML share one [`Slugger`], so
/// ids are unique across the whole document.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Plain text of the heading, used for the slug and the ToC.
    text: String,
    /// Heading HTML with inline formatting.
    html: String,
    toc: Vec<TocEntry>,
    slugger: Slugger,
}

impl HeadingState {
    /// Check if we're currently inside a heading.
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading and record a ToC entry.
    ///
    /// Returns (level, id, html) or None if not in a heading.
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = self.register(level, &text);
        Some((level, id, html))
    }

    /// Assign an id to a heading and add it to the ToC.
    pub fn register(&mut self, level: u8, text: &str) -> String {
        let id = self.slugger.slug(text);
        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });
        id
    }

    /// Record a heading whose id was written by the author.
    pub fn register_explicit(&mut self, level: u8, text: &str, id: &str) {
        self.slugger.reserve(id);
        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.to_owned(),
        });
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Convert heading level enum to number (1-6).
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_block_state_fenced() {
        let mut state = CodeBlockState::default();
        assert!(!state.is_active());

        state.start(&CodeBlockKind::Fenced("mermaid theme=dark".into()));
        assert!(state.is_active());
        state.push_str("graph TD");
        state.push_newline();

        let block = state.end();
        assert_eq!(block.language.as_deref(), Some("mermaid"));
        assert_eq!(block.attrs.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(block.source, "graph TD\n");
        assert!(!state.is_active());
    }

    #[test]
    fn test_code_block_state_without_language() {
        let mut state = CodeBlockState::default();

        state.start(&CodeBlockKind::Fenced("".into()));
        assert_eq!(state.end().language, None);

        state.start(&CodeBlockKind::Indented);
        state.push_str("x");
        assert_eq!(
            state.end(),
            FinishedCodeBlock {
                source: "x".to_owned(),
                ..FinishedCodeBlock::default()
            }
        );
    }

    #[test]
    fn test_table_state() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::Center, Alignment::Right]);

        state.start_head();
        assert_eq!(state.cell_tag(), "th");
        assert_eq!(
            state.current_alignment_style(),
            r#" style="text-align:left""#
        );

        state.next_cell();
        assert_eq!(
            state.current_alignment_style(),
            r#" style="text-align:center""#
        );

        state.end_head();
        state.start_row();
        assert_eq!(state.cell_tag(), "td");
    }

    #[test]
    fn test_image_state() {
        let mut state = ImageState::default();
        assert_eq!(state.end(), None);

        state.start("cat.png", "");
        assert!(state.is_active());
        state.push_str("A cat");

        assert_eq!(
            state.end().as_deref(),
            Some(r#"<img src="cat.png" alt="A cat">"#)
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_heading_state_toc() {
        let mut state = HeadingState::default();

        state.start_heading(2);
        state.push_text("Section");
        state.push_html("Section");
        let (level, id, html) = state.complete_heading().unwrap();

        assert_eq!(level, 2);
        assert_eq!(id, "section");
        assert_eq!(html, "Section");
        assert_eq!(
            state.take_toc(),
            vec![TocEntry {
                level: 2,
                title: "Section".to_owned(),
                id: "section".to_owned(),
            }]
        );
    }

    #[test]
    fn test_heading_state_explicit_id_is_reserved() {
        let mut state = HeadingState::default();

        state.register_explicit(2, "Intro", "intro");
        let id = state.register(2, "Intro");

        assert_eq!(id, "intro-1");
    }

    #[test]
    fn test_complete_heading_outside_heading() {
        let mut state = HeadingState::default();
        assert!(state.complete_heading().is_none());
    }
}
