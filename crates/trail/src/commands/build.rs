//! `trail build` command implementation.

use std::path::PathBuf;

use clap::Args;
use trail_config::{CliSettings, Config};

use crate::builder::SiteBuilder;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover trail.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Publish drafts.
    #[arg(long)]
    drafts: bool,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "TRAIL_KROKI_URL")]
    kroki_url: Option<String>,

    /// Abort the build when a diagram fails to render.
    #[arg(long)]
    fail_on_diagram_error: bool,

    /// Enable verbose output (show per-page warnings and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a page fails to render, or
    /// output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            output_dir: self.output_dir,
            drafts: self.drafts.then_some(true),
            kroki_url: self.kroki_url,
            fail_on_diagram_error: self.fail_on_diagram_error.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = super::open_site(&config)?;

        output.info(&format!(
            "Content directory: {}",
            config.content_resolved.dir.display()
        ));
        if let Some(kroki_url) = &config.diagrams_resolved.kroki_url {
            output.info(&format!("Kroki URL: {kroki_url}"));
        } else {
            output.info("Diagram rendering: disabled (no kroki_url in config)");
        }
        if config.build_resolved.drafts {
            output.warning("Drafts: included");
        }

        let output_dir = &config.build_resolved.output_dir;
        let summary = SiteBuilder::new(&site, output_dir, &config.build_resolved.site_url).build()?;

        if summary.skipped > 0 {
            output.warning(&format!(
                "{} route(s) vanished during the build and were skipped",
                summary.skipped
            ));
        }
        if summary.warnings > 0 {
            output.warning(&format!(
                "{} warning(s), rerun with --verbose for details",
                summary.warnings
            ));
        }
        output.success(&format!(
            "Built {} page(s) into {}",
            summary.pages,
            output_dir.display()
        ));
        Ok(())
    }
}
