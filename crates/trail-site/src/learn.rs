//! Learning path discovery and lesson resolution.
//!
//! A path under [`LEARN_DIR`] holds lessons directly, sections of lessons,
//! or a mix of both:
//!
//! ```text
//! learn/<path>/_path.md                          path descriptor (required)
//! learn/<path>/<lesson>/<lesson>.md              lesson   [path, lesson]
//! learn/<path>/<section>/_section.md             section descriptor (optional)
//! learn/<path>/<section>/<lesson>/<lesson>.md    lesson   [path, section, lesson]
//! ```
//!
//! A directory directly under a path is a lesson when it contains a markdown
//! file named after itself, and a section otherwise.
//!
//! Paths, entries and lessons are ordered by their front matter `position`,
//! ascending, with [`DEFAULT_POSITION`] for items that don't set one. Items
//! with equal positions keep directory name order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use trail_renderer::TocEntry;
use trail_storage::Storage;

use crate::BuildMode;
use crate::error::SiteError;
use crate::frontmatter::{self, FrontMatter};
use crate::icons;
use crate::page::PageRenderer;
use crate::tree::{humanize, is_route_segment, list_or_empty, read_optional};

/// Learn directory, relative to the content root.
pub const LEARN_DIR: &str = "learn";

/// Position given to items without one, sorting them last.
pub const DEFAULT_POSITION: i64 = 99;

const PATH_FILE: &str = "_path.md";
const SECTION_FILE: &str = "_section.md";

/// Built-in labels for well-known section directories.
const SECTION_LABELS: &[(&str, &str)] = &[
    ("getting-started", "Getting Started"),
    ("introduction-to-computers", "Introduction to Computers"),
    ("os-fundamentals", "OS Fundamentals"),
    ("linux", "Linux"),
    ("text-editing", "Text Editing"),
    ("shell-scripting", "Shell Scripting"),
    ("programming", "Programming"),
    ("version-control", "Version Control"),
    ("networking-fundamentals", "Networking Fundamentals"),
    ("cicd", "CI/CD"),
    ("containers", "Containers"),
    ("container-orchestration", "Container Orchestration"),
    ("iac", "Infrastructure as Code"),
];

/// Lesson metadata, cheap to compute for listings.
/// Lesson metadata, cheap to compute for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnPageMeta {
    /// Route segments: `[path, lesson]` or `[path, section, lesson]`.
    pub slug: Vec<String>,
    pub title: String,
    pub description: String,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl LearnPageMeta {
    /// URL path of the lesson, with trailing slash.
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/{LEARN_DIR}/{}/", self.slug.join("/"))
    }
}

/// Ordered group of lessons within a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnSection {
    pub name: String,
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub position: i64,
    pub pages: Vec<LearnPageMeta>,
}

/// Top-level item of a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LearnEntry {
    /// Lesson placed directly under the path.
    Lesson(LearnPageMeta),
    Section(LearnSection),
}

impl LearnEntry {
    #[must_use]
    pub fn position(&self) -> i64 {
        match self {
            Self::Lesson(page) => page.position,
            Self::Section(section) => section.position,
        }
    }

    /// Lessons of this entry in reading order.
    pub fn pages(&self) -> impl Iterator<Item = &LearnPageMeta> {
        let pages = match self {
            Self::Lesson(page) => std::slice::from_ref(page),
            Self::Section(section) => section.pages.as_slice(),
        };
        pages.iter()
    }
}

/// A learning path with its lessons and sections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnPath {
    pub name: String,
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub position: i64,
    /// Number of top-level entries.
    pub section_count: usize,
    pub entries: Vec<LearnEntry>,
}

impl LearnPath {
    /// Every lesson in reading order.
    pub fn pages(&self) -> impl Iterator<Item = &LearnPageMeta> {
        self.entries.iter().flat_map(LearnEntry::pages)
    }

    pub fn sections(&self) -> impl Iterator<Item = &LearnSection> {
        self.entries.iter().filter_map(|e| match e {
            LearnEntry::Section(section) => Some(section),
            LearnEntry::Lesson(_) => None,
        })
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.entries.iter().map(|e| e.pages().count()).sum()
    }

    /// Section holding the lesson with `slug`. `None` for lessons placed
    /// directly under the path.
    #[must_use]
    pub fn section_of(&self, slug: &[String]) -> Option<&LearnSection> {
        self.sections()
            .find(|s| s.pages.iter().any(|p| p.slug == slug))
    }

    /// Lessons before and after `slug` in reading order, across sections.
    #[must_use]
    pub fn neighbors(&self, slug: &[String]) -> (Option<&LearnPageMeta>, Option<&LearnPageMeta>) {
        let pages: Vec<_> = self.pages().collect();
        let Some(index) = pages.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let prev = index.checked_sub(1).map(|i| pages[i]);
        let next = pages.get(index + 1).copied();
        (prev, next)
    }
}

/// A fully rendered lesson.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnPage {
    #[serde(flatten)]
    pub meta: LearnPageMeta,
    pub content_html: String,
    pub toc: Vec<TocEntry>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Path descriptor read from `_path.md`.
struct PathMeta {
    name: String,
    label: String,
    description: String,
    icon: Option<String>,
    position: i64,
}

/// Read-only view of the learn directory.
pub struct Learn {
    storage: Arc<dyn Storage>,
    mode: BuildMode,
    section_labels: BTreeMap<String, String>,
}

impl Learn {
    /// Create a learn walker over `storage` (rooted at the content directory).
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, mode: BuildMode) -> Self {
        Self {
            storage,
            mode,
            section_labels: BTreeMap::new(),
        }
    }

    /// Section labels that override the built-in table.
    ///
    /// A `title` in a section's `_section.md` still takes precedence.
    #[must_use]
    pub fn with_section_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.section_labels = labels;
        self
    }

    fn section_label(&self, name: &str, meta: &FrontMatter) -> String {
        meta.str("title")
            .or_else(|| self.section_labels.get(name).cloned())
            .or_else(|| {
                SECTION_LABELS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, label)| (*label).to_owned())
            })
            .unwrap_or_else(|| humanize(name))
    }

    /// Read the front matter of a descriptor file, if it exists.
    fn descriptor(&self, path: &Path) -> Result<Option<FrontMatter>, SiteError> {
        if !self.storage.is_file(path) {
            return Ok(None);
        }
        Ok(read_optional(self.storage.as_ref(), path)?.map(|raw| frontmatter::parse(&raw).0))
    }

    /// Subdirectories of `dir` usable as route segments, in name order.
    fn child_dirs(&self, dir: &Path) -> Result<Vec<String>, SiteError> {
        Ok(list_or_empty(self.storage.as_ref(), dir)?
            .into_iter()
            .filter(|e| e.is_dir() && is_route_segment(&e.name))
            .map(|e| e.name)
            .collect())
    }

    fn path_meta(&self, name: &str) -> Result<Option<PathMeta>, SiteError> {
        let file = Path::new(LEARN_DIR).join(name).join(PATH_FILE);
        let Some(meta) = self.descriptor(&file)? else {
            return Ok(None);
        };

        Ok(Some(PathMeta {
            name: name.to_owned(),
            label: meta.str("title").unwrap_or_else(|| humanize(name)),
            description: meta.str("description").unwrap_or_default(),
            icon: meta.str("icon"),
            position: meta.int("position").unwrap_or(DEFAULT_POSITION),
        }))
    }

    /// Every directory under `learn/` that has a path descriptor.
    fn discover_paths(&self) -> Result<Vec<PathMeta>, SiteError> {
        let mut paths = Vec::new();
        for name in self.child_dirs(Path::new(LEARN_DIR))? {
            match self.path_meta(&name)? {
                Some(meta) => paths.push(meta),
                None => tracing::debug!(path = %name, "No {PATH_FILE}, not a learning path"),
            }
        }
        paths.sort_by_key(|p| p.position);
        Ok(paths)
    }

    fn lesson_meta(&self, slug: &[&str], meta: &FrontMatter) -> LearnPageMeta {
        let lesson = slug.last().copied().unwrap_or_default();
        LearnPageMeta {
            slug: slug.iter().map(|s| (*s).to_owned()).collect(),
            title: meta.str("title").unwrap_or_else(|| humanize(lesson)),
            description: meta.str("description").unwrap_or_default(),
            position: meta.int("position").unwrap_or(DEFAULT_POSITION),
            icon: meta.str("icon"),
        }
    }

    fn hides(&self, meta: &FrontMatter) -> bool {
        meta.flag("draft") && !self.mode.includes_drafts()
    }

    /// Visible lessons of `section`, sorted by position.
    fn section_pages(&self, path: &str, section: &str) -> Result<Vec<LearnPageMeta>, SiteError> {
        let dir = Path::new(LEARN_DIR).join(path).join(section);
        let mut pages = Vec::new();

        for lesson in self.child_dirs(&dir)? {
            let slug = [path, section, lesson.as_str()];
            let file = lesson_file(&slug);
            let Some(meta) = self.descriptor(&file)? else {
                continue;
            };
            if self.hides(&meta) {
                tracing::debug!(file = %file.display(), "Skipping draft lesson");
                continue;
            }
            pages.push(self.lesson_meta(&slug, &meta));
        }

        pages.sort_by_key(|p| p.position);
        Ok(pages)
    }

    fn section(&self, path: &str, name: String) -> Result<Option<LearnSection>, SiteError> {
        let pages = self.section_pages(path, &name)?;
        if pages.is_empty() {
            return Ok(None);
        }

        let file = Path::new(LEARN_DIR)
            .join(path)
            .join(&name)
            .join(SECTION_FILE);
        let meta = self.descriptor(&file)?.unwrap_or_default();
        Ok(Some(LearnSection {
            label: self.section_label(&name, &meta),
            description: meta.str("description").unwrap_or_default(),
            icon: meta
                .str("icon")
                .or_else(|| icons::section_icon(&name).map(str::to_owned)),
            position: meta.int("position").unwrap_or(DEFAULT_POSITION),
            name,
            pages,
        }))
    }

    /// Lessons and sections directly under `path`, sorted by position.
    fn entries(&self, path: &str) -> Result<Vec<LearnEntry>, SiteError> {
        let dir = Path::new(LEARN_DIR).join(path);
        let mut entries = Vec::new();

        for name in self.child_dirs(&dir)? {
            let slug = [path, name.as_str()];
            let file = lesson_file(&slug);
            if let Some(meta) = self.descriptor(&file)? {
                if self.hides(&meta) {
                    tracing::debug!(file = %file.display(), "Skipping draft lesson");
                } else {
                    entries.push(LearnEntry::Lesson(self.lesson_meta(&slug, &meta)));
                }
                continue;
            }
            if let Some(section) = self.section(path, name)? {
                entries.push(LearnEntry::Section(section));
            }
        }

        entries.sort_by_key(LearnEntry::position);
        Ok(entries)
    }

    fn build_path(&self, meta: PathMeta) -> Result<LearnPath, SiteError> {
        let entries = self.entries(&meta.name)?;
        Ok(LearnPath {
            section_count: entries.len(),
            name: meta.name,
            label: meta.label,
            description: meta.description,
            icon: meta.icon,
            position: meta.position,
            entries,
        })
    }

    /// Every learning path with its lessons and sections, ordered by position.
    pub fn all_learn_paths(&self) -> Result<Vec<LearnPath>, SiteError> {
        self.discover_paths()?
            .into_iter()
            .map(|meta| self.build_path(meta))
            .collect()
    }

    /// Route segments of every path index and every lesson.
    ///
    /// Each path contributes `[path]` followed by its lessons' slugs in
    /// reading order.
    pub fn all_learn_slugs(&self) -> Result<Vec<Vec<String>>, SiteError> {
        let mut slugs = Vec::new();
        for path in self.all_learn_paths()? {
            slugs.push(vec![path.name.clone()]);
            slugs.extend(path.pages().map(|p| p.slug.clone()));
        }
        Ok(slugs)
    }

    /// A single learning path, or `None` if `name` has no path descriptor.
    pub fn path_data(&self, name: &str) -> Result<Option<LearnPath>, SiteError> {
        if !is_route_segment(name) {
            return Ok(None);
        }
        match self.path_meta(name)? {
            Some(meta) => self.build_path(meta).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve and render a lesson from its route segments.
    ///
    /// The source file is computed directly from `slug`; nothing is listed.
    /// `[path, lesson]` reads `learn/<path>/<lesson>/<lesson>.md` and
    /// `[path, section, lesson]` reads
    /// `learn/<path>/<section>/<lesson>/<lesson>.md`. Any other shape, a
    /// missing file, or a draft in a production build gives `Ok(None)`.
    pub fn learn_page<S: AsRef<str>>(
        &self,
        slug: &[S],
        renderer: &PageRenderer,
    ) -> Result<Option<LearnPage>, SiteError> {
        if !(2..=3).contains(&slug.len()) {
            return Ok(None);
        }
        let segments: Vec<&str> = slug.iter().map(AsRef::as_ref).collect();
        if !segments.iter().all(|s| is_route_segment(s)) {
            return Ok(None);
        }

        let file = lesson_file(&segments);
        if !self.storage.is_file(&file) {
            return Ok(None);
        }
        let Some(raw) = read_optional(self.storage.as_ref(), &file)? else {
            return Ok(None);
        };
        let (meta, body) = frontmatter::parse(&raw);
        if self.hides(&meta) {
            return Ok(None);
        }

        let page_meta = self.lesson_meta(&segments, &meta);
        let rendered = renderer
            .render(&file, body)
            .map_err(|source| SiteError::Render { path: file, source })?;

        Ok(Some(LearnPage {
            meta: page_meta,
            content_html: rendered.html,
            toc: rendered.toc,
            warnings: rendered.warnings,
        }))
    }
}

/// `learn/<segments...>/<last>.md`.
fn lesson_file(segments: &[&str]) -> PathBuf {
    let mut file = Path::new(LEARN_DIR).to_path_buf();
    file.extend(segments);
    let lesson = segments.last().copied().unwrap_or_default();
    file.join(format!("{lesson}.md"))
}
