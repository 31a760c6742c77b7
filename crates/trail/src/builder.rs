//! Static output writer.
//!
//! Resolves every route of a [`Site`] in parallel and writes one
//! `index.json` per route under the output directory, mirroring the URL
//! layout, plus `sitemap.xml` at the root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use trail_site::blog::all_tags;
use trail_site::{LearnPage, LearnPageMeta, LearnPath, PostMeta, Route, Site};

use crate::error::CliError;
use crate::sitemap::{self, UrlEntry};

/// Posts shown on the home page.
const RECENT_POSTS: usize = 3;

/// Counts reported after a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct BuildSummary {
    /// Routes written.
    pub pages: usize,
    /// Routes listed but gone by the time they were resolved.
    pub skipped: usize,
    /// Render warnings across all pages.
    pub warnings: usize,
}

enum RouteOutcome {
    Written { route: Route, warnings: usize },
    Missing,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HomeDocument<'a> {
    recent_posts: &'a [PostMeta],
    paths: &'a [LearnPath],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlogIndexDocument<'a> {
    posts: &'a [PostMeta],
    tags: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LearnIndexDocument<'a> {
    paths: &'a [LearnPath],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonDocument<'a> {
    #[serde(flatten)]
    page: &'a LearnPage,
    path_label: &'a str,
    section_label: Option<&'a str>,
    prev: Option<&'a LearnPageMeta>,
    next: Option<&'a LearnPageMeta>,
}

/// Writes a rendered site to disk.
pub(crate) struct SiteBuilder<'a> {
    site: &'a Site,
    output_dir: &'a Path,
    site_url: &'a str,
}

impl<'a> SiteBuilder<'a> {
    pub(crate) fn new(site: &'a Site, output_dir: &'a Path, site_url: &'a str) -> Self {
        Self {
            site,
            output_dir,
            site_url,
        }
    }

    /// Render every route and write the sitemap.
    ///
    /// A route whose source disappeared after listing is skipped with a
    /// warning. Any render or write failure aborts the build.
    pub(crate) fn build(&self) -> Result<BuildSummary, CliError> {
        let start = Instant::now();

        let routes = self.site.routes()?;
        let posts = self.site.blog().all_posts()?;
        let paths = self.site.learn().all_learn_paths()?;

        fs::create_dir_all(self.output_dir).map_err(|source| CliError::Write {
            path: self.output_dir.to_path_buf(),
            source,
        })?;

        let outcomes = routes
            .into_par_iter()
            .map(|route| self.write_route(route, &posts, &paths))
            .collect::<Result<Vec<_>, CliError>>()?;

        let mut summary = BuildSummary::default();
        let mut entries = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                RouteOutcome::Written { route, warnings } => {
                    summary.pages += 1;
                    summary.warnings += warnings;
                    entries.push(UrlEntry::for_route(&route, &posts));
                }
                RouteOutcome::Missing => summary.skipped += 1,
            }
        }

        let xml = sitemap::render(self.site_url, &entries);
        write_file(&self.output_dir.join("sitemap.xml"), xml.as_bytes())?;

        tracing::info!(
            pages = summary.pages,
            skipped = summary.skipped,
            elapsed_ms = start.elapsed().as_millis(),
            "Site built"
        );
        Ok(summary)
    }

    fn write_route(
        &self,
        route: Route,
        posts: &[PostMeta],
        paths: &[LearnPath],
    ) -> Result<RouteOutcome, CliError> {
        let (json, warnings) = match &route {
            Route::Home => {
                let recent = &posts[..posts.len().min(RECENT_POSTS)];
                let doc = HomeDocument {
                    recent_posts: recent,
                    paths,
                };
                (serde_json::to_vec_pretty(&doc)?, 0)
            }
            Route::BlogIndex => {
                let doc = BlogIndexDocument {
                    posts,
                    tags: all_tags(posts),
                };
                (serde_json::to_vec_pretty(&doc)?, 0)
            }
            Route::LearnIndex => (serde_json::to_vec_pretty(&LearnIndexDocument { paths })?, 0),
            Route::BlogPost(slug) => {
                let Some(post) = self.site.post(slug)? else {
                    return Ok(missing(&route));
                };
                (serde_json::to_vec_pretty(&post)?, post.warnings.len())
            }
            Route::LearnPath(name) => {
                let Some(path) = paths.iter().find(|p| &p.name == name) else {
                    return Ok(missing(&route));
                };
                (serde_json::to_vec_pretty(path)?, 0)
            }
            Route::Lesson(slug) => {
                let Some(page) = self.site.lesson(slug.as_slice())? else {
                    return Ok(missing(&route));
                };
                let path = paths.iter().find(|p| p.name == slug[0]);
                let (prev, next) = path.map_or((None, None), |p| p.neighbors(slug));
                let doc = LessonDocument {
                    page: &page,
                    path_label: path.map_or(slug[0].as_str(), |p| p.label.as_str()),
                    section_label: path
                        .and_then(|p| p.section_of(slug))
                        .map(|s| s.label.as_str()),
                    prev,
                    next,
                };
                (serde_json::to_vec_pretty(&doc)?, page.warnings.len())
            }
        };

        write_file(&self.route_file(&route), &json)?;
        tracing::debug!(%route, "Wrote page");
        Ok(RouteOutcome::Written { route, warnings })
    }

    fn route_file(&self, route: &Route) -> PathBuf {
        let url = route.url_path();
        let relative = url.trim_matches('/');
        if relative.is_empty() {
            self.output_dir.join("index.json")
        } else {
            self.output_dir.join(relative).join("index.json")
        }
    }
}

fn missing(route: &Route) -> RouteOutcome {
    tracing::warn!(%route, "Route listed but source no longer exists, skipping");
    RouteOutcome::Missing
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    let write = || {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    };
    write().map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
