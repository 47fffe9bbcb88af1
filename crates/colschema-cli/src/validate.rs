//! # Validate Subcommand
//!
//! Validates a component configuration file against the component's
//! schema. The input format comes from `--input-format` or, failing that,
//! from the file extension (`.json`, `.yaml`, `.yml`).
//!
//! Exit code: 0 when the configuration is valid, 1 when it has violations
//! or cannot be read or parsed.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colschema_core::ComponentIdentity;
use colschema_registry::{DocumentFormat, ValidationResult};

use crate::{to_json, CommandContext, ComponentArgs};

/// Arguments for `colschema validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub component: ComponentArgs,

    /// Configuration file to validate.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Input format: json or yaml. Inferred from the extension if omitted.
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<DocumentFormat>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, ctx: &CommandContext) -> Result<u8> {
    let identity = ctx.identity(&args.component)?;
    let format = input_format(&args.path, args.input_format)?;
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    tracing::info!(
        component = %identity,
        path = %args.path.display(),
        format = %format,
        "validating configuration"
    );

    let result = ctx
        .manager
        .validate(&identity, &bytes, format)
        .with_context(|| format!("failed to validate {}", args.path.display()))?;

    if ctx.json {
        println!("{}", to_json(&result)?);
    } else {
        print!("{}", format_report(&identity, &args.path, &result)?);
    }

    Ok(if result.valid { 0 } else { 1 })
}

/// The explicit format, or the one implied by the file extension.
fn input_format(path: &Path, explicit: Option<DocumentFormat>) -> Result<DocumentFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match DocumentFormat::from_extension(ext) {
        Some(format) => Ok(format),
        None => bail!(
            "cannot infer the format of {} (use --input-format json|yaml)",
            path.display()
        ),
    }
}

fn format_report(
    identity: &ComponentIdentity,
    path: &Path,
    result: &ValidationResult,
) -> Result<String> {
    let mut out = String::new();
    if result.valid {
        writeln!(out, "OK: {} is a valid {identity} configuration", path.display())?;
        return Ok(out);
    }
    writeln!(
        out,
        "FAIL: {} is not a valid {identity} configuration ({} error(s))",
        path.display(),
        result.error_count()
    )?;
    for error in &result.errors {
        writeln!(out, "  {error}")?;
    }
    Ok(out)
}
