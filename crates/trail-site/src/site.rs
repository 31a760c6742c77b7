//! Unified content access.
//!
//! [`Site`] ties the blog and learn walkers to a shared [`PageRenderer`] and
//! enumerates every route a build has to produce.
//!
//! # Thread Safety
//!
//! `Site` holds no mutable state. Listing and resolution calls are
//! independent reads, so a build can resolve any number of routes in
//! parallel from one `&Site`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use trail_storage::Storage;

use crate::blog::{Blog, Post};
use crate::error::SiteError;
use crate::learn::{LEARN_DIR, Learn, LearnPage};
use crate::page::{PageRenderer, PageRendererConfig};

/// Which build the content is being read for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Drafts are hidden from listings and resolution.
    #[default]
    Production,
    /// Drafts are visible.
    Development,
}

impl BuildMode {
    /// Whether content flagged `draft: true` is visible.
    #[must_use]
    pub fn includes_drafts(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Configuration for [`Site`].
#[derive(Clone, Debug, Default)]
pub struct SiteConfig {
    pub mode: BuildMode,
    /// Section labels overriding the built-in table, keyed by directory name.
    pub section_labels: BTreeMap<String, String>,
    pub renderer: PageRendererConfig,
}

/// A route the site serves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    BlogIndex,
    BlogPost(String),
    LearnIndex,
    /// Landing page of one learning path.
    LearnPath(String),
    /// Lesson at `[path, lesson]` or `[path, section, lesson]`.
    Lesson(Vec<String>),
}

impl Route {
    /// URL path with a trailing slash, e.g. `/blog/first-post/`.
    #[must_use]
    pub fn url_path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::BlogIndex => "/blog/".to_owned(),
            Self::BlogPost(slug) => format!("/blog/{slug}/"),
            Self::LearnIndex => format!("/{LEARN_DIR}/"),
            Self::LearnPath(name) => format!("/{LEARN_DIR}/{name}/"),
            Self::Lesson(slug) => format!("/{LEARN_DIR}/{}/", slug.join("/")),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_path())
    }
}

/// Blog, learn tree and page rendering over one content root.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::path::PathBuf;
/// use std::sync::Arc;
/// use trail_site::{Site, SiteConfig};
/// use trail_storage::FsStorage;
///
/// let storage = Arc::new(FsStorage::new(PathBuf::from("content")));
/// let site = Site::new(storage, SiteConfig::default());
///
/// for route in site.routes()? {
///     println!("{route}");
/// }
/// let post = site.post("first-post")?;
/// # Ok(())
/// # }
/// ```
pub struct Site {
    blog: Blog,
    learn: Learn,
    renderer: PageRenderer,
}

impl Site {
    /// Create a site over `storage`, rooted at the content directory.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: SiteConfig) -> Self {
        Self {
            blog: Blog::new(Arc::clone(&storage), config.mode),
            learn: Learn::new(storage, config.mode).with_section_labels(config.section_labels),
            renderer: PageRenderer::new(config.renderer),
        }
    }

    /// Blog listings.
    #[must_use]
    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    /// Learn tree listings.
    #[must_use]
    pub fn learn(&self) -> &Learn {
        &self.learn
    }

    /// Resolve and render a blog post.
    pub fn post(&self, slug: &str) -> Result<Option<Post>, SiteError> {
        self.blog.post_by_slug(slug, &self.renderer)
    }

    /// Resolve and render a lesson.
    pub fn lesson<S: AsRef<str>>(&self, slug: &[S]) -> Result<Option<LearnPage>, SiteError> {
        self.learn.learn_page(slug, &self.renderer)
    }

    /// Every route of the site.
    ///
    /// Fixed pages come first, then blog posts in discovery order, then each
    /// learning path followed by its lessons.
    pub fn routes(&self) -> Result<Vec<Route>, SiteError> {
        let mut routes = vec![Route::Home, Route::LearnIndex, Route::BlogIndex];

        routes.extend(self.blog.all_post_slugs()?.into_iter().map(Route::BlogPost));

        for slug in self.learn.all_learn_slugs()? {
            match <[String; 1]>::try_from(slug) {
                Ok([name]) => routes.push(Route::LearnPath(name)),
                Err(slug) => routes.push(Route::Lesson(slug)),
            }
        }

        Ok(routes)
    }
}
