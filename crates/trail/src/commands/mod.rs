//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod routes;

use std::sync::Arc;

use trail_config::Config;
use trail_site::{BuildMode, PageRendererConfig, Site, SiteConfig};
use trail_storage::FsStorage;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use routes::RoutesArgs;

/// Open the content directory named by `config` as a [`Site`].
pub(crate) fn open_site(config: &Config) -> Result<Site, CliError> {
    let content_dir = &config.content_resolved.dir;
    if !content_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "Content directory not found: {}",
            content_dir.display()
        )));
    }

    let mode = if config.build_resolved.drafts {
        BuildMode::Development
    } else {
        BuildMode::Production
    };
    let diagrams = &config.diagrams_resolved;
    let site_config = SiteConfig {
        mode,
        section_labels: config.learn.section_labels.clone(),
        renderer: PageRendererConfig {
            kroki_url: diagrams.kroki_url.clone(),
            diagram_theme: Some(diagrams.theme.clone()),
            diagram_timeout: Some(diagrams.timeout),
            fail_on_diagram_error: diagrams.fail_on_error,
        },
    };

    let storage = Arc::new(FsStorage::new(content_dir.clone()));
    Ok(Site::new(storage, site_config))
}
