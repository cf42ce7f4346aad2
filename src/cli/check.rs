//! Check command implementation

use anyhow::Result;
use clap::Args;
use console::style;

use super::utils::{resolve_config, resolve_overlay_paths, SourceArgs};
use crate::config::CliOverrides;
use crate::domain::ErrorPolicy;
use crate::load::{load_overlays, LoadError};

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = resolve_config(&args.sources, CliOverrides::default())?;
    let paths = resolve_overlay_paths(&args.sources, &config)?;

    // Always collect every error, whatever the configured policy.
    let stack = load_overlays(&paths, ErrorPolicy::Skip)?;

    for overlay in &stack.overlays {
        let failures = stack
            .skipped
            .iter()
            .filter(|e| matches!(e, LoadError::Parse { overlay: name, .. } if *name == overlay.name))
            .count();
        let status = if failures == 0 { style("ok").green() } else { style("FAIL").red() };
        println!("{:>4}  {} ({} declarations)", status, overlay.name, overlay.len());
    }
    for error in &stack.skipped {
        println!("{}", error);
    }

    if !stack.skipped.is_empty() {
        anyhow::bail!(
            "{} malformed declaration(s) in {} overlay(s)",
            stack.skipped.len(),
            stack.overlays.len()
        );
    }
    Ok(())
}
