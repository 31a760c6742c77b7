//! Front matter parsing.
//!
//! A front matter block is YAML between two `---` lines at the very start of a
//! file. Everything after the closing line is the body, byte for byte.
//! Parsing never fails: a missing, unterminated or malformed block yields an
//! empty [`FrontMatter`], and callers fall back to defaults derived from the
//! file name or its position in the tree.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Metadata mapping read from a front matter block.
///
/// Keys keep the order they were written in. Lookups treat a YAML `null`
/// the same as a missing key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontMatter {
    data: Mapping,
}

/// Split raw file text into front matter and body.
///
/// If the text doesn't start with a complete `---` block, the metadata is
/// empty and the body is the whole input.
pub fn parse(raw: &str) -> (FrontMatter, &str) {
    match split(raw) {
        Some((yaml, body)) => (FrontMatter::from_yaml(yaml), body),
        None => (FrontMatter::default(), raw),
    }
}

/// Locate the YAML block and the body following it.
fn split(raw: &str) -> Option<(&str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if !is_delimiter(first) || !first.ends_with('\n') {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            return Some((&text[yaml_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

impl FrontMatter {
    /// Parse a YAML block, falling back to an empty mapping.
    fn from_yaml(yaml: &str) -> Self {
        if yaml.trim().is_empty() {
            return Self::default();
        }

        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(data)) => Self { data },
            Ok(Value::Null) => Self::default(),
            Ok(_) => {
                tracing::warn!("Front matter is not a mapping, ignoring it");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed front matter, ignoring it");
                Self::default()
            }
        }
    }

    /// Whether the block was absent or had no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Set a key, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(Value::from(key), value.into());
        self
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    /// Scalar value rendered as a string.
    ///
    /// Numbers and booleans are converted so `title: 2024` still reads as a
    /// title. Sequences and mappings are not strings.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// List of strings with duplicates removed, first occurrence wins.
    ///
    /// A single scalar is read as a one-element list.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Vec<String> {
        let items: Vec<String> = match self.get(key) {
            Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        };

        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        unique
    }

    /// Integer value. Quoted integers are accepted.
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean flag, `false` when absent.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Serialize the metadata back in front of `body`.
    ///
    /// [`parse`] on the result gives back this mapping and `body` unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a value can't be represented as YAML.
    pub fn to_markdown(&self, body: &str) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(&self.data)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
