//! Trail CLI - static content site builder.
//!
//! Provides commands for:
//! - `build`: Render every route to JSON and write the sitemap
//! - `routes`: Print every route the content produces

mod builder;
mod commands;
mod error;
mod output;
mod sitemap;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, RoutesArgs};
use output::Output;

/// Trail - static content site builder.
#[derive(Parser)]
#[command(name = "trail", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the site into the output directory.
    Build(BuildArgs),
    /// Print every route of the site.
    Routes(RoutesArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.verbose,
            Self::Routes(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Routes(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
