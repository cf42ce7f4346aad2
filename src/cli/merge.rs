//! Merge command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use super::utils::{resolve_config, resolve_overlay_paths, SourceArgs};
use crate::config::CliOverrides;
use crate::domain::{ErrorPolicy, OutputFormat};
use crate::load::load_overlays;
use crate::merge::merge_with_report;
use crate::render::{render_json, render_prefs_js};

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format: js (prefs.js declarations) or json
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the merged set to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Skip malformed declarations instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,

    /// Print overridden declarations and a fingerprint to stderr
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let overrides = CliOverrides {
        format: args.format,
        on_error: args.skip_invalid.then_some(ErrorPolicy::Skip),
        ..CliOverrides::default()
    };
    let config = resolve_config(&args.sources, overrides)?;
    let paths = resolve_overlay_paths(&args.sources, &config)?;

    let stack = load_overlays(&paths, config.on_error)?;
    let report = merge_with_report(&stack.overlays);

    let rendered = match config.format {
        OutputFormat::Js => render_prefs_js(report.merged.iter()),
        OutputFormat::Json => {
            render_json(&report.merged).context("Failed to serialize merged preferences")?
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            tracing::debug!("wrote {} preferences to {}", report.merged.len(), path.display());
        }
        None => print!("{}", rendered),
    }

    if args.report {
        eprintln!(
            "Merged {} overlays: {} preferences, {} overridden, {} redundant, {} skipped",
            stack.overlays.len(),
            report.merged.len(),
            report.overrides.len(),
            report.redundant,
            stack.skipped.len()
        );
        for o in &report.overrides {
            eprintln!("  {}: {} overridden by {}", o.key, o.previous, o.replaced_by);
        }
        for skipped in &stack.skipped {
            eprintln!("  skipped {}", skipped);
        }
        eprintln!("Fingerprint: {}", report.merged.fingerprint());
    }

    Ok(())
}
