//! Content discovery and page resolution for Trail.
//!
//! This crate provides:
//! - [`frontmatter`]: splits a markdown file into metadata and body
//! - [`Blog`]: post listings, tags and slug resolution
//! - [`Learn`]: learning paths, sections and lesson resolution
//! - [`PageRenderer`]: markdown body to HTML, with optional diagrams
//! - [`Site`]: all of the above over one content root, plus route enumeration
//!
//! Listings never contain rendered HTML. Resolution reads the source file
//! fresh and renders it; a missing route is `Ok(None)`, never an error.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use trail_site::{Site, SiteConfig};
//! use trail_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("content")));
//! let site = Site::new(storage, SiteConfig::default());
//!
//! // Newest posts first
//! let posts = site.blog().all_posts()?;
//!
//! // Render a lesson
//! let lesson = site.lesson(&["foundations", "linux", "basics"])?;
//! # Ok(())
//! # }
//! ```

pub mod blog;
mod error;
pub mod frontmatter;
pub mod icons;
pub mod learn;
mod page;
mod site;
mod tree;

pub use blog::{Blog, Post, PostMeta};
pub use error::SiteError;
pub use learn::{Learn, LearnEntry, LearnPage, LearnPageMeta, LearnPath, LearnSection};
pub use page::{PageRenderResult, PageRenderer, PageRendererConfig, RenderError};
pub use site::{BuildMode, Route, Site, SiteConfig};

// Re-export TocEntry from trail-renderer for convenience
pub use trail_renderer::TocEntry;
