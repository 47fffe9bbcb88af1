//! # colschema CLI entry point
//!
//! Parses command-line arguments, opens the schema registry and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use colschema_cli::lookup::{
    run_changelog, run_components, run_deprecated, run_readme, run_schema, run_versions,
    ComponentsArgs,
};
use colschema_cli::search::{run_search, SearchArgs};
use colschema_cli::validate::{run_validate, ValidateArgs};
use colschema_cli::{open_manager, CommandContext, ComponentArgs};
use colschema_registry::DocumentFormat;

/// Collector component schema registry.
///
/// Look up configuration schemas of collector components by release,
/// validate configurations against them, list deprecated fields and
/// search component documentation.
#[derive(Parser, Debug)]
#[command(name = "colschema", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Schema asset directory (overrides COLSCHEMA_SCHEMA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    schema_dir: Option<PathBuf>,

    /// Format of the stored schema files: json or yaml (overrides COLSCHEMA_SCHEMA_FORMAT).
    #[arg(long, global = true, value_name = "FORMAT")]
    schema_format: Option<DocumentFormat>,

    /// Collector version to query. Defaults to the latest available.
    #[arg(long, global = true, value_name = "VERSION")]
    collector_version: Option<String>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available collector versions.
    Versions,

    /// List available components, grouped by type.
    Components(ComponentsArgs),

    /// Print a component's configuration schema as JSON.
    Schema(ComponentArgs),

    /// Validate a JSON or YAML configuration file.
    Validate(ValidateArgs),

    /// List a component's deprecated configuration fields.
    Deprecated(ComponentArgs),

    /// Print a component's readme.
    Readme(ComponentArgs),

    /// Print the release notes of a collector version.
    Changelog,

    /// Search component readmes and changelogs.
    Search(SearchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("colschema CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let manager = match open_manager(cli.schema_dir, cli.schema_format) {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let ctx = CommandContext {
        manager,
        collector_version: cli.collector_version,
        json: cli.json,
    };

    let result = match &cli.command {
        Commands::Versions => run_versions(&ctx),
        Commands::Components(args) => run_components(args, &ctx),
        Commands::Schema(args) => run_schema(args, &ctx),
        Commands::Validate(args) => run_validate(args, &ctx),
        Commands::Deprecated(args) => run_deprecated(args, &ctx),
        Commands::Readme(args) => run_readme(args, &ctx),
        Commands::Changelog => run_changelog(&ctx),
        Commands::Search(args) => run_search(args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
