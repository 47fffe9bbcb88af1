//! # Lookup Subcommands
//!
//! `versions`, `components`, `schema`, `deprecated`, `readme` and
//! `changelog`: read-only queries that print what the registry holds.
//! Each `run_*` handler prints the output of its `render_*` counterpart.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Args;
use colschema_core::ComponentCategory;
use colschema_registry::DeprecatedField;
use serde_json::json;

use crate::{to_json, CommandContext, ComponentArgs};

/// Arguments for `colschema components`.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Only list components of this type.
    #[arg(long = "type", value_name = "TYPE")]
    pub component_type: Option<String>,
}

/// Execute `colschema versions`.
pub fn run_versions(ctx: &CommandContext) -> Result<u8> {
    print!("{}", render_versions(ctx)?);
    Ok(0)
}

/// Render every available version, marking the latest.
pub fn render_versions(ctx: &CommandContext) -> Result<String> {
    let versions = ctx.manager.all_versions().context("failed to list versions")?;
    let latest = versions.last().copied();

    if ctx.json {
        let all: Vec<String> = versions.iter().map(ToString::to_string).collect();
        let latest = latest.map(|v| v.to_string());
        return Ok(to_json(&json!({ "latest": latest, "versions": all }))? + "\n");
    }

    let mut out = String::new();
    for version in &versions {
        if Some(*version) == latest {
            writeln!(out, "{version} (latest)")?;
        } else {
            writeln!(out, "{version}")?;
        }
    }
    Ok(out)
}

/// Execute `colschema components`.
pub fn run_components(args: &ComponentsArgs, ctx: &CommandContext) -> Result<u8> {
    print!("{}", render_components(args, ctx)?);
    Ok(0)
}

/// Render the components of the selected version, grouped by type.
pub fn render_components(args: &ComponentsArgs, ctx: &CommandContext) -> Result<String> {
    let version = ctx.version()?;

    let listing: BTreeMap<ComponentCategory, Vec<String>> = match &args.component_type {
        Some(raw) => {
            let category: ComponentCategory = raw.parse()?;
            let names = ctx
                .manager
                .component_names(category, &version)
                .with_context(|| format!("failed to list {category} components"))?;
            BTreeMap::from([(category, names)])
        }
        None => ctx
            .manager
            .list_components(&version)
            .with_context(|| format!("failed to list components for version {version}"))?,
    };

    if ctx.json {
        return Ok(to_json(&listing)? + "\n");
    }

    let mut out = String::new();
    writeln!(out, "Components in {version}:")?;
    for (category, names) in &listing {
        writeln!(out, "{category} ({}):", names.len())?;
        for name in names {
            writeln!(out, "  {name}")?;
        }
    }
    Ok(out)
}

/// Execute `colschema schema`. The schema is always printed as JSON.
pub fn run_schema(args: &ComponentArgs, ctx: &CommandContext) -> Result<u8> {
    let identity = ctx.identity(args)?;
    let bytes = ctx
        .manager
        .schema_json(&identity)
        .with_context(|| format!("failed to load schema for {identity}"))?;
    let text = String::from_utf8(bytes).context("schema JSON is not UTF-8")?;
    println!("{text}");
    Ok(0)
}

/// Execute `colschema deprecated`.
pub fn run_deprecated(args: &ComponentArgs, ctx: &CommandContext) -> Result<u8> {
    print!("{}", render_deprecated(args, ctx)?);
    Ok(0)
}

/// Render the deprecated fields of one component.
pub fn render_deprecated(args: &ComponentArgs, ctx: &CommandContext) -> Result<String> {
    let identity = ctx.identity(args)?;
    let fields = ctx
        .manager
        .deprecated_fields(&identity)
        .with_context(|| format!("failed to scan {identity} for deprecated fields"))?;

    if ctx.json {
        return Ok(to_json(&fields)? + "\n");
    }
    Ok(format_deprecated(&identity.to_string(), &fields))
}

fn format_deprecated(component: &str, fields: &[DeprecatedField]) -> String {
    if fields.is_empty() {
        return format!("{component}: no deprecated fields\n");
    }
    let mut out = format!("{component}: {} deprecated field(s)\n", fields.len());
    for field in fields {
        out.push_str(&format!("  {} ({})", field.path, field.declared_type));
        if !field.description.is_empty() {
            out.push_str(&format!(": {}", field.description));
        }
        out.push('\n');
    }
    out
}

/// Execute `colschema readme`.
pub fn run_readme(args: &ComponentArgs, ctx: &CommandContext) -> Result<u8> {
    let identity = ctx.identity(args)?;
    let text = ctx.manager.readme(&identity)?;
    println!("{}", text.trim_end());
    Ok(0)
}

/// Execute `colschema changelog`.
pub fn run_changelog(ctx: &CommandContext) -> Result<u8> {
    let version = ctx.version()?;
    let text = ctx.manager.changelog(&version)?;
    println!("{}", text.trim_end());
    Ok(0)
}
