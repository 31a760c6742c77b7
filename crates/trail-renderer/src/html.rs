//! HTML element writers and entity helpers.

use std::fmt::Write;

/// Write a code block as `<pre><code>`.
pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
}

/// Write an `<img>` element.
pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

/// Write a GFM task list checkbox.
pub(crate) fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Decode the entities [`escape_html`] produces, plus numeric references and `&nbsp;`.
///
/// Unknown entities are left as written.
#[must_use]
pub fn unescape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            decode_entity(entity).map(|c| (c, semi + 1))
        });

        if let Some((c, len)) = decoded {
            result.push(c);
            rest = &rest[len..];
        } else {
            result.push('&');
            rest = &rest[1..];
        }
    }
    result.push_str(rest);
    result
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = if let Some(hex) = digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
