//! # colschema-cli — CLI for the Collector Schema Registry
//!
//! Provides the `colschema` command-line interface. Every subcommand is a
//! thin adapter over one [`SchemaManager`] operation.
//!
//! ## Subcommands
//!
//! - `colschema versions`: list collector versions, marking the latest.
//! - `colschema components [--type T]`: list components in a version.
//! - `colschema schema T NAME`: print a component schema as JSON.
//! - `colschema validate T NAME FILE`: validate a JSON or YAML configuration.
//! - `colschema deprecated T NAME`: list deprecated configuration fields.
//! - `colschema readme T NAME` / `colschema changelog`: print documentation.
//! - `colschema search QUERY`: search readmes and changelogs.
//!
//! ```bash
//! colschema --schema-dir ./schemas validate receiver otlp otel.yaml
//! colschema --collector-version 0.138.0 deprecated exporter kafka
//! colschema --json search "keepalive grpc" --type receiver
//! ```
//!
//! Output goes to stdout; logs go to stderr.

pub mod lookup;
pub mod search;
pub mod validate;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colschema_core::{CollectorVersion, ComponentIdentity};
use colschema_registry::{DocumentFormat, RegistryConfig, SchemaManager};

/// State shared by every subcommand.
#[derive(Debug)]
pub struct CommandContext {
    /// The registry.
    pub manager: SchemaManager,
    /// `--collector-version`; `None` means the latest available.
    pub collector_version: Option<String>,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl CommandContext {
    /// The requested collector version, or the latest one present.
    pub fn version(&self) -> Result<CollectorVersion> {
        self.manager
            .resolve_version(self.collector_version.as_deref())
            .context("failed to resolve collector version")
    }

    /// Resolve a component from its command-line arguments.
    pub fn identity(&self, component: &ComponentArgs) -> Result<ComponentIdentity> {
        self.manager
            .resolve_identity(
                &component.component_type,
                &component.name,
                self.collector_version.as_deref(),
            )
            .with_context(|| {
                format!(
                    "failed to resolve component {} {}",
                    component.component_type, component.name
                )
            })
    }
}

/// Positional arguments naming one component.
#[derive(Args, Debug, Clone)]
pub struct ComponentArgs {
    /// Component type: receiver, processor, exporter, extension or connector.
    #[arg(value_name = "TYPE")]
    pub component_type: String,

    /// Component name (e.g. otlp, batch, kafka).
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Apply command-line overrides on top of the environment configuration.
pub fn resolve_config(
    base: RegistryConfig,
    schema_dir: Option<PathBuf>,
    schema_format: Option<DocumentFormat>,
) -> RegistryConfig {
    RegistryConfig {
        schema_root: schema_dir.unwrap_or(base.schema_root),
        schema_format: schema_format.unwrap_or(base.schema_format),
    }
}

/// Open the registry described by the environment and the global flags.
pub fn open_manager(
    schema_dir: Option<PathBuf>,
    schema_format: Option<DocumentFormat>,
) -> Result<SchemaManager> {
    let base = RegistryConfig::from_env().context("invalid registry configuration")?;
    let config = resolve_config(base, schema_dir, schema_format);
    if !config.schema_root.is_dir() {
        bail!(
            "schema directory not found: {} (set --schema-dir or COLSCHEMA_SCHEMA_DIR)",
            config.schema_root.display()
        );
    }
    Ok(SchemaManager::from_config(&config))
}

/// Render `value` as pretty JSON.
pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}
