//! Rewriting of raw HTML blocks.
//!
//! Authors may embed HTML directly in markdown. Those blocks are kept verbatim
//! except for two things: headings without an `id` get one from the shared
//! slugger, and `<pre><code class="language-…">` blocks are offered to the code
//! block processors like fenced blocks are.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::html::unescape_html;
use crate::state::HeadingState;

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre(?:\s[^>]*)?>\s*<code\s[^>]*?class="([^"]*)"[^>]*>(.*?)</code>\s*</pre>"#)
        .unwrap()
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h([1-6])(\s[^>]*)?>(.*?)</h([1-6])>").unwrap());

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)id\s*=\s*["']?([^"'\s>]+)"#).unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Rewrite one raw HTML block.
///
/// `on_code` receives `(language, decoded source)` for each code block and
/// returns replacement HTML, or `None` to keep the block as written.
pub(crate) fn rewrite_block<F>(html: &str, headings: &mut HeadingState, on_code: F) -> String
where
    F: FnMut(&str, &str) -> Option<String>,
{
    let html = rewrite_code_blocks(html, on_code);
    rewrite_headings(&html, headings)
}

fn rewrite_code_blocks<F>(html: &str, mut on_code: F) -> String
where
    F: FnMut(&str, &str) -> Option<String>,
{
    replace_each(&CODE_RE, html, |caps| {
        let language = caps[1]
            .split_whitespace()
            .find_map(|class| class.strip_prefix("language-"))?;
        on_code(language, &unescape_html(&caps[2]))
    })
}

fn rewrite_headings(html: &str, headings: &mut HeadingState) -> String {
    replace_each(&HEADING_RE, html, |caps| {
        if caps[1] != caps[4] {
            return None;
        }
        let level: u8 = caps[1].parse().ok()?;
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        let inner = &caps[3];
        let text = unescape_html(&TAG_RE.replace_all(inner, ""));

        if let Some(explicit) = ID_RE.captures(attrs) {
            headings.register_explicit(level, &text, &explicit[1]);
            return None;
        }

        let id = headings.register(level, &text);
        Some(format!(r#"<h{level}{attrs} id="{id}">{inner}</h{level}>"#))
    })
}

/// Like `Regex::replace_all`, but a `None` from `f` keeps the match unchanged.
fn replace_each<F>(re: &Regex, text: &str, mut f: F) -> String
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        match f(&caps) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rewrite(html: &str) -> (String, HeadingState) {
        let mut headings = HeadingState::default();
        let out = rewrite_block(html, &mut headings, |_, _| None);
        (out, headings)
    }

    #[test]
    fn test_heading_gets_id() {
        let (out, mut headings) = rewrite("<h2>Raw Heading</h2>\n");

        assert_eq!(out, "<h2 id=\"raw-heading\">Raw Heading</h2>\n");
        assert_eq!(headings.take_toc()[0].id, "raw-heading");
    }

    #[test]
    fn test_heading_keeps_attributes() {
        let (out, _) = rewrite(r#"<h3 class="fancy">Styled <em>text</em></h3>"#);

        assert_eq!(
            out,
            r#"<h3 class="fancy" id="styled-text">Styled <em>text</em></h3>"#
        );
    }

    #[test]
    fn test_heading_with_explicit_id_unchanged() {
        let (out, mut headings) = rewrite(r#"<h2 id="custom">Title</h2>"#);

        assert_eq!(out, r#"<h2 id="custom">Title</h2>"#);
        assert_eq!(headings.take_toc()[0].id, "custom");
    }

    #[test]
    fn test_mismatched_heading_tags_unchanged() {
        let (out, _) = rewrite("<h2>Broken</h3>");

        assert_eq!(out, "<h2>Broken</h3>");
    }

    #[test]
    fn test_heading_entities_decoded_for_slug() {
        let (out, _) = rewrite("<h2>Q&amp;A</h2>");

        assert_eq!(out, r#"<h2 id="qa">Q&amp;A</h2>"#);
    }

    #[test]
    fn test_code_block_offered_to_callback() {
        let mut headings = HeadingState::default();
        let mut seen = Vec::new();
        let out = rewrite_block(
            r#"<div><pre><code class="language-mermaid">A --&gt; B</code></pre></div>"#,
            &mut headings,
            |lang, source| {
                seen.push((lang.to_owned(), source.to_owned()));
                Some("<figure>svg</figure>".to_owned())
            },
        );

        assert_eq!(out, "<div><figure>svg</figure></div>");
        assert_eq!(seen, vec![("mermaid".to_owned(), "A --> B".to_owned())]);
    }

    #[test]
    fn test_code_block_without_language_untouched() {
        let mut headings = HeadingState::default();
        let html = r#"<pre><code class="hljs">x</code></pre>"#;
        let out = rewrite_block(html, &mut headings, |_, _| Some(String::new()));

        assert_eq!(out, html);
    }
}
