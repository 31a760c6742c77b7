//! `sitemap.xml` generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/blog/first-post/</loc>
//!     <lastmod>2024-03-10</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.6</priority>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;
use std::fmt::Write;

use trail_site::{PostMeta, Route};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// How often a page is expected to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// One `<url>` element.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UrlEntry {
    /// URL path with trailing slash, appended to the site URL.
    pub path: String,
    pub lastmod: Option<String>,
    pub changefreq: ChangeFreq,
    pub priority: &'static str,
}

impl UrlEntry {
    /// Entry for `route`, with the post date as `lastmod` for blog posts.
    pub(crate) fn for_route(route: &Route, posts: &[PostMeta]) -> Self {
        let (changefreq, priority) = match route {
            Route::Home => (ChangeFreq::Weekly, "1.0"),
            Route::LearnIndex => (ChangeFreq::Weekly, "0.9"),
            Route::BlogIndex => (ChangeFreq::Weekly, "0.8"),
            Route::BlogPost(_) => (ChangeFreq::Monthly, "0.6"),
            Route::LearnPath(_) | Route::Lesson(_) => (ChangeFreq::Monthly, "0.7"),
        };
        let lastmod = match route {
            Route::BlogPost(slug) => posts
                .iter()
                .find(|p| &p.slug == slug && !p.date.is_empty())
                .map(|p| p.date.clone()),
            _ => None,
        };
        Self {
            path: route.url_path(),
            lastmod,
            changefreq,
            priority,
        }
    }
}

/// Render a sitemap for `entries` under `site_url` (no trailing slash).
pub(crate) fn render(site_url: &str, entries: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 128);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\">");

    for entry in entries {
        let loc = format!("{site_url}{}", entry.path);
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&loc));
        if let Some(lastmod) = &entry.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", escape_xml(lastmod));
        }
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq.as_str());
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
