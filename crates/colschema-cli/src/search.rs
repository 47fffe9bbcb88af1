//! # Search Subcommand
//!
//! Lexical search over component readmes and changelogs.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Args;
use colschema_core::ComponentCategory;
use colschema_registry::docs::DEFAULT_MAX_RESULTS;
use colschema_registry::{DocQuery, DocumentMatch};

use crate::{to_json, CommandContext};

const SNIPPET_CHARS: usize = 160;

/// Arguments for `colschema search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Only search readmes of this component type.
    #[arg(long = "type", value_name = "TYPE")]
    pub component_type: Option<String>,

    /// Only search readmes of this component name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Maximum number of results.
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub limit: usize,
}

/// Execute the search subcommand.
///
/// Without `--collector-version` every version is searched.
pub fn run_search(args: &SearchArgs, ctx: &CommandContext) -> Result<u8> {
    print!("{}", render_search(args, ctx)?);
    Ok(0)
}

/// Render the matches for one query.
pub fn render_search(args: &SearchArgs, ctx: &CommandContext) -> Result<String> {
    let query = build_query(args, ctx)?;
    let matches = ctx
        .manager
        .search_documentation(&query)
        .context("documentation search failed")?;

    if ctx.json {
        return Ok(to_json(&matches)? + "\n");
    }
    format_matches(&matches)
}

fn build_query(args: &SearchArgs, ctx: &CommandContext) -> Result<DocQuery> {
    let mut query = DocQuery::new(args.query.clone()).with_max_results(args.limit);
    if ctx.collector_version.is_some() {
        query = query.with_version(ctx.version()?);
    }
    if let Some(raw) = &args.component_type {
        let category: ComponentCategory = raw.parse()?;
        query = query.with_category(category);
    }
    if let Some(name) = &args.name {
        query = query.with_component(name.clone());
    }
    Ok(query)
}

fn format_matches(matches: &[DocumentMatch]) -> Result<String> {
    let mut out = String::new();
    if matches.is_empty() {
        writeln!(out, "No matching documentation.")?;
        return Ok(out);
    }
    for m in matches {
        writeln!(out, "[{:.3}] {} ({})", m.similarity, m.id, m.file_path)?;
        let snippet = snippet(&m.content);
        if !snippet.is_empty() {
            writeln!(out, "    {snippet}")?;
        }
    }
    Ok(out)
}

/// First prose line of a markdown document, shortened.
fn snippet(content: &str) -> String {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or_default();
    if line.chars().count() <= SNIPPET_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}
