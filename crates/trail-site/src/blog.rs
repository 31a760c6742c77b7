//! Blog post discovery and resolution.
//!
//! Posts are flat `*.md` files under [`POSTS_DIR`], conventionally named
//! `YYYY-MM-DD-<slug>.md`. The date prefix is stripped to form the slug and
//! doubles as the post date when front matter doesn't set one.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use trail_renderer::TocEntry;
use trail_storage::Storage;

use crate::BuildMode;
use crate::error::SiteError;
use crate::frontmatter::{self, FrontMatter};
use crate::page::PageRenderer;
use crate::tree::{humanize, list_or_empty, read_optional};

/// Posts directory, relative to the content root.
pub const POSTS_DIR: &str = "blog/posts";

const WORDS_PER_MINUTE: usize = 200;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap());

static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").unwrap());

/// Post metadata, cheap to compute for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub slug: String,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`), or empty if neither front matter nor the
    /// file name carries one.
    pub date: String,
    pub excerpt: String,
    pub author: String,
    /// Tags in the order written, duplicates removed.
    pub tags: Vec<String>,
    /// Estimated reading time in minutes, at least 1.
    pub reading_time: u32,
    #[serde(skip)]
    pub draft: bool,
}

/// A fully rendered post.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,
    pub content_html: String,
    pub toc: Vec<TocEntry>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Strip the `YYYY-MM-DD-` prefix and `.md` extension from a file name.
#[must_use]
pub fn slug_from_filename(filename: &str) -> &str {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    match DATE_PREFIX_RE.find(stem) {
        Some(m) => &stem[m.end()..],
        None => stem,
    }
}

/// Leading `YYYY-MM-DD` of a file name, if any.
#[must_use]
pub fn date_from_filename(filename: &str) -> Option<&str> {
    DATE_RE
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Estimated reading time at 200 words per minute, never less than 1.
#[must_use]
pub fn reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE).max(1)).unwrap_or(u32::MAX)
}

/// Post date from front matter, else from the file name.
///
/// Unquoted YAML timestamps such as `2024-03-10T09:00:00Z` are cut down to
/// their date.
fn resolve_date(meta: &FrontMatter, filename: &str) -> String {
    let written = meta
        .str("date")
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty());

    match written {
        Some(date) => match date.as_bytes().get(10) {
            Some(b'T' | b' ') if DATE_RE.is_match(&date) => date[..10].to_owned(),
            _ => date,
        },
        None => date_from_filename(filename).unwrap_or_default().to_owned(),
    }
}

fn post_meta(filename: &str, meta: &FrontMatter, body: &str) -> PostMeta {
    let slug = slug_from_filename(filename);
    PostMeta {
        slug: slug.to_owned(),
        title: meta.str("title").unwrap_or_else(|| humanize(slug)),
        date: resolve_date(meta, filename),
        excerpt: meta.str("excerpt").unwrap_or_default(),
        author: meta.str("author").unwrap_or_default(),
        tags: meta.string_list("tags"),
        reading_time: reading_time(body),
        draft: meta.flag("draft"),
    }
}

/// Sorted union of every tag used by `posts`.
#[must_use]
pub fn all_tags(posts: &[PostMeta]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Posts carrying at least one of `tags`. An empty filter keeps every post.
#[must_use]
pub fn filter_by_tags<'a>(posts: &'a [PostMeta], tags: &[&str]) -> Vec<&'a PostMeta> {
    posts
        .iter()
        .filter(|p| tags.is_empty() || p.tags.iter().any(|t| tags.contains(&t.as_str())))
        .collect()
}

/// Read-only view of the blog directory.
pub struct Blog {
    storage: Arc<dyn Storage>,
    mode: BuildMode,
}

impl Blog {
    /// Create a blog walker over `storage` (rooted at the content directory).
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, mode: BuildMode) -> Self {
        Self { storage, mode }
    }

    /// Markdown file names in the posts directory, in name order.
    fn post_files(&self) -> Result<Vec<String>, SiteError> {
        let entries = list_or_empty(self.storage.as_ref(), Path::new(POSTS_DIR))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_file() && e.name.ends_with(".md"))
            .map(|e| e.name)
            .collect())
    }

    fn post_path(filename: &str) -> PathBuf {
        Path::new(POSTS_DIR).join(filename)
    }

    /// Every visible post's metadata, in discovery order.
    ///
    /// Drafts are dropped in production builds. When two files strip to the
    /// same slug, the first in name order wins.
    fn visible_posts(&self) -> Result<Vec<PostMeta>, SiteError> {
        let mut seen = HashSet::new();
        let mut posts = Vec::new();

        for filename in self.post_files()? {
            let slug = slug_from_filename(&filename);
            if slug.is_empty() {
                tracing::warn!(file = %filename, "Post file name has no slug, skipping");
                continue;
            }
            if !seen.insert(slug.to_owned()) {
                tracing::warn!(file = %filename, slug, "Duplicate post slug, skipping");
                continue;
            }

            let Some(raw) = read_optional(self.storage.as_ref(), &Self::post_path(&filename))?
            else {
                continue;
            };
            let (meta, body) = frontmatter::parse(&raw);
            let post = post_meta(&filename, &meta, body);
            if post.draft && !self.mode.includes_drafts() {
                tracing::debug!(slug = %post.slug, "Skipping draft post");
                continue;
            }
            posts.push(post);
        }

        Ok(posts)
    }

    /// Slugs of every visible post, in discovery order.
    pub fn all_post_slugs(&self) -> Result<Vec<String>, SiteError> {
        Ok(self.visible_posts()?.into_iter().map(|p| p.slug).collect())
    }

    /// Metadata of every visible post, newest first.
    ///
    /// Posts sharing a date keep their discovery order.
    pub fn all_posts(&self) -> Result<Vec<PostMeta>, SiteError> {
        let mut posts = self.visible_posts()?;
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    /// Resolve and render a post.
    ///
    /// Returns `Ok(None)` if no file strips to `slug`, or if the post is a
    /// draft in a production build.
    pub fn post_by_slug(
        &self,
        slug: &str,
        renderer: &PageRenderer,
    ) -> Result<Option<Post>, SiteError> {
        let Some(filename) = self
            .post_files()?
            .into_iter()
            .find(|f| slug_from_filename(f) == slug)
        else {
            return Ok(None);
        };

        let path = Self::post_path(&filename);
        let Some(raw) = read_optional(self.storage.as_ref(), &path)? else {
            return Ok(None);
        };
        let (meta, body) = frontmatter::parse(&raw);
        let meta = post_meta(&filename, &meta, body);
        if meta.draft && !self.mode.includes_drafts() {
            return Ok(None);
        }

        let rendered = renderer
            .render(&path, body)
            .map_err(|source| SiteError::Render { path, source })?;

        Ok(Some(Post {
            meta,
            content_html: rendered.html,
            toc: rendered.toc,
            warnings: rendered.warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trail_storage::MockStorage;

    use super::*;
    use crate::page::PageRendererConfig;

    fn blog(storage: MockStorage, mode: BuildMode) -> Blog {
        Blog::new(Arc::new(storage), mode)
    }

    fn renderer() -> PageRenderer {
        PageRenderer::new(PageRendererConfig::default())
    }

    fn fixture() -> MockStorage {
        MockStorage::new()
            .with_file(
                "blog/posts/2024-01-01-new-year.md",
                "---\ntitle: New Year\ntags: [career, cloud]\n---\nHappy new year.",
            )
            .with_file(
                "blog/posts/2024-06-01-summer.md",
                "---\ntitle: Summer\nauthor: Sam\nexcerpt: Hot\ntags: [cloud]\n---\nWarm words.",
            )
            .with_file(
                "blog/posts/2024-03-10-first-post.md",
                "# First\n\nNo front matter here.",
            )
            .with_file(
                "blog/posts/2024-04-01-wip.md",
                "---\ntitle: WIP\ndraft: true\ntags: [secret]\n---\nDraft body.",
            )
            .with_file("blog/posts/notes.txt", "not a post")
    }

    #[test]
    fn test_slug_from_filename() {
        assert_eq!(slug_from_filename("2024-03-10-first-post.md"), "first-post");
        assert_eq!(slug_from_filename("about.md"), "about");
        assert_eq!(slug_from_filename("2024-03-10.md"), "2024-03-10");
    }

    #[test]
    fn test_date_from_filename() {
        assert_eq!(date_from_filename("2024-03-10-first-post.md"), Some("2024-03-10"));
        assert_eq!(date_from_filename("first-post.md"), None);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("one two"), 1);
        assert_eq!(reading_time(&"word ".repeat(200)), 1);
        assert_eq!(reading_time(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_filename_date_is_default() {
        let blog = blog(fixture(), BuildMode::Production);

        let posts = blog.all_posts().unwrap();
        let first = posts.iter().find(|p| p.slug == "first-post").unwrap();

        assert_eq!(first.date, "2024-03-10");
        assert_eq!(first.title, "first post");
        assert_eq!(first.excerpt, "");
        assert!(first.tags.is_empty());
    }

    #[test]
    fn test_front_matter_date_wins() {
        let storage = MockStorage::new()
            .with_file("blog/posts/2024-01-01-a.md", "---\ndate: 2023-12-31\n---\n")
            .with_file(
                "blog/posts/2024-01-01-b.md",
                "---\ndate: 2023-11-05T08:30:00Z\n---\n",
            );
        let blog = blog(storage, BuildMode::Production);

        let dates: Vec<_> = blog.all_posts().unwrap().into_iter().map(|p| p.date).collect();

        assert_eq!(dates, vec!["2023-12-31", "2023-11-05"]);
    }

    #[test]
    fn test_all_posts_newest_first_without_drafts() {
        let blog = blog(fixture(), BuildMode::Production);

        let slugs: Vec<_> = blog.all_posts().unwrap().into_iter().map(|p| p.slug).collect();

        assert_eq!(slugs, vec!["summer", "first-post", "new-year"]);
    }

    #[test]
    fn test_all_posts_includes_drafts_in_development() {
        let blog = blog(fixture(), BuildMode::Development);

        let slugs: Vec<_> = blog.all_posts().unwrap().into_iter().map(|p| p.slug).collect();

        assert_eq!(slugs, vec!["summer", "wip", "first-post", "new-year"]);
    }

    #[test]
    fn test_same_date_keeps_discovery_order() {
        let storage = MockStorage::new()
            .with_file("blog/posts/2024-05-05-b.md", "")
            .with_file("blog/posts/2024-05-05-a.md", "")
            .with_file("blog/posts/2024-05-05-c.md", "");
        let blog = blog(storage, BuildMode::Production);

        let slugs: Vec<_> = blog.all_posts().unwrap().into_iter().map(|p| p.slug).collect();

        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_all_post_slugs() {
        let blog = blog(fixture(), BuildMode::Production);

        assert_eq!(
            blog.all_post_slugs().unwrap(),
            vec!["new-year", "first-post", "summer"]
        );
    }

    #[test]
    fn test_duplicate_slug_first_file_wins() {
        let storage = MockStorage::new()
            .with_file("blog/posts/2024-01-01-same.md", "---\ntitle: One\n---\n")
            .with_file("blog/posts/2024-02-01-same.md", "---\ntitle: Two\n---\n");
        let blog = blog(storage, BuildMode::Production);

        let posts = blog.all_posts().unwrap();
        let post = blog.post_by_slug("same", &renderer()).unwrap().unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "One");
        assert_eq!(post.meta.title, "One");
    }

    #[test]
    fn test_missing_posts_dir_is_empty() {
        let blog = blog(MockStorage::new(), BuildMode::Production);

        assert!(blog.all_posts().unwrap().is_empty());
        assert!(blog.all_post_slugs().unwrap().is_empty());
        assert!(blog.post_by_slug("anything", &renderer()).unwrap().is_none());
    }

    #[test]
    fn test_post_by_slug_renders_body() {
        let blog = blog(fixture(), BuildMode::Production);

        let post = blog.post_by_slug("summer", &renderer()).unwrap().unwrap();

        assert_eq!(post.meta.author, "Sam");
        assert_eq!(post.meta.date, "2024-06-01");
        assert_eq!(post.content_html, "<p>Warm words.</p>");
    }

    #[test]
    fn test_post_by_slug_unknown_is_none() {
        let blog = blog(fixture(), BuildMode::Production);

        assert!(blog.post_by_slug("missing", &renderer()).unwrap().is_none());
    }

    #[test]
    fn test_draft_hidden_only_in_production() {
        let production = blog(fixture(), BuildMode::Production);
        let development = blog(fixture(), BuildMode::Development);

        assert!(production.post_by_slug("wip", &renderer()).unwrap().is_none());
        assert!(development.post_by_slug("wip", &renderer()).unwrap().is_some());
    }

    #[test]
    fn test_tags() {
        let blog = blog(fixture(), BuildMode::Production);
        let posts = blog.all_posts().unwrap();

        assert_eq!(all_tags(&posts), vec!["career", "cloud"]);

        let career: Vec<_> = filter_by_tags(&posts, &["career"])
            .into_iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(career, vec!["new-year"]);

        let any: Vec<_> = filter_by_tags(&posts, &["career", "cloud"])
            .into_iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(any, vec!["summer", "new-year"]);

        assert_eq!(filter_by_tags(&posts, &[]).len(), 3);
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let blog = blog(fixture(), BuildMode::Production);
        let post = blog.post_by_slug("summer", &renderer()).unwrap().unwrap();

        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["readingTime"], 1);
        assert_eq!(json["contentHtml"], "<p>Warm words.</p>");
        assert!(json.get("draft").is_none());
    }
}
