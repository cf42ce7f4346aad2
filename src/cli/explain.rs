//! Explain command implementation

use anyhow::Result;
use clap::Args;
use console::style;

use super::utils::{resolve_config, resolve_overlay_paths, SourceArgs};
use crate::config::CliOverrides;
use crate::load::load_overlays;
use crate::merge::trace;

#[derive(Args)]
pub struct ExplainArgs {
    /// Preference key to trace, e.g. toolkit.telemetry.enabled
    #[arg(value_name = "KEY")]
    pub key: String,

    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: ExplainArgs) -> Result<()> {
    let config = resolve_config(&args.sources, CliOverrides::default())?;
    let paths = resolve_overlay_paths(&args.sources, &config)?;
    let stack = load_overlays(&paths, config.on_error)?;

    let traced = trace(&stack.overlays, &args.key);
    let Some(last) = traced.len().checked_sub(1) else {
        println!("{} is not set by any overlay", args.key);
        return Ok(());
    };

    println!("{}", style(&args.key).bold());
    for (idx, decl) in traced.iter().enumerate() {
        let marker = if idx == last { style("wins").green().to_string() } else { String::new() };
        let line =
            format!("  {}  {}({})  {}", decl.origin, decl.entry.kind, decl.entry.value, marker);
        println!("{}", line.trim_end());
    }
    if traced[last].entry.override_user() {
        println!("  ({} takes precedence over user-set values)", traced[last].entry.kind);
    }
    Ok(())
}
