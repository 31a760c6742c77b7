//! Heading anchor ids.
//!
//! Ids follow the GitHub convention: lowercase, punctuation removed, each
//! whitespace character replaced by a dash. Repeated ids within one document get a numeric suffix.

use std::collections::HashMap;

/// Fallback id for headings whose text slugifies to nothing (e.g. `## ???`).
const EMPTY_SLUG: &str = "heading";

/// Convert heading text to a URL-safe slug.
///
/// Keeps letters, digits, `-` and `_`; lowercases; turns every whitespace
/// character (space, tab, newline) into one `-`; drops everything else.
/// Consecutive whitespace is not collapsed.
///
/// # Examples
///
/// ```
/// use trail_renderer::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("What's New?"), "whats-new");
/// assert_eq!(slugify("C++ & Rust"), "c--rust");
/// assert_eq!(slugify("a\tb"), "a-b");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            result.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            result.push('-');
        }
    }
    result
}

/// Generates unique anchor ids for one document.
///
/// The first occurrence of a slug is used as-is; later ones get `-1`, `-2`, …
/// A suffixed id that collides with a heading literally named that way is
/// skipped, so ids stay pairwise unique.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next unique id for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = EMPTY_SLUG.to_owned();
        }

        let mut candidate = base.clone();
        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_default();
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }

    /// Reserve an id that the author wrote explicitly so generated ids avoid it.
    pub fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_owned()).or_default();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple---spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("snake_case"), "snake_case");
        assert_eq!(slugify("Install `npm`"), "install-npm");
    }

    #[test]
    fn test_slugify_punctuation_is_not_collapsed() {
        assert_eq!(slugify("C++ & Rust"), "c--rust");
        assert_eq!(slugify("a - b"), "a---b");
    }

    #[test]
    fn test_slugify_other_whitespace() {
        assert_eq!(slugify("a\tb"), "a-b");
        assert_eq!(slugify("line\nbreak"), "line-break");
        assert_eq!(slugify("no\u{a0}break"), "no-break");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Über Café"), "über-café");
    }

    #[test]
    fn test_slugger_duplicates() {
        let mut slugger = Slugger::new();

        assert_eq!(slugger.slug("Overview"), "overview");
        assert_eq!(slugger.slug("Overview"), "overview-1");
        assert_eq!(slugger.slug("Overview"), "overview-2");
    }

    #[test]
    fn test_slugger_skips_literal_collision() {
        let mut slugger = Slugger::new();

        assert_eq!(slugger.slug("FAQ"), "faq");
        assert_eq!(slugger.slug("FAQ 1"), "faq-1");
        assert_eq!(slugger.slug("FAQ"), "faq-2");
    }

    #[test]
    fn test_slugger_empty_text() {
        let mut slugger = Slugger::new();

        assert_eq!(slugger.slug("???"), "heading");
        assert_eq!(slugger.slug(""), "heading-1");
    }

    #[test]
    fn test_slugger_reserved() {
        let mut slugger = Slugger::new();
        slugger.reserve("setup");

        assert_eq!(slugger.slug("Setup"), "setup-1");
    }
}
