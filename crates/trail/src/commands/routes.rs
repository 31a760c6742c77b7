//! `trail routes` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use trail_config::{CliSettings, Config};
use trail_site::Route;

use crate::error::CliError;

/// Arguments for the routes command.
#[derive(Args)]
pub(crate) struct RoutesArgs {
    /// Path to configuration file (default: auto-discover trail.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Include drafts.
    #[arg(long)]
    drafts: bool,

    /// Print routes as a JSON array.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RoutesArgs {
    /// Execute the routes command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or content cannot be listed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            drafts: self.drafts.then_some(true),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = super::open_site(&config)?;

        let urls: Vec<String> = site.routes()?.iter().map(Route::url_path).collect();

        let mut stdout = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &urls)?;
            writeln!(stdout)?;
        } else {
            for url in urls {
                writeln!(stdout, "{url}")?;
            }
        }
        Ok(())
    }
}
