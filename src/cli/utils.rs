//! Shared CLI utilities.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::Config;
use crate::load::discover_overlays;

/// Overlay selection flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Overlay files, applied in the order given (later wins)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Preference directory; its matching files are applied first, in file-name order
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File-name globs selecting overlays inside --dir (comma-separated)
    #[arg(short, long, value_name = "GLOBS")]
    pub include: Option<String>,

    /// Path to config file (prefstack.toml or prefstack.yaml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Load config from the working directory and apply command-line overrides.
pub fn resolve_config(sources: &SourceArgs, mut overrides: CliOverrides) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, sources.config.as_deref())?;
    overrides.include_globs = parse_csv(&sources.include);
    overrides.pref_dir = sources.dir.clone();
    Ok(merge_cli_with_config(config, overrides))
}

/// The ordered list of overlay files: directory overlays first, then the
/// explicitly named files.
pub fn resolve_overlay_paths(sources: &SourceArgs, config: &Config) -> Result<Vec<PathBuf>> {
    let mut paths = match &config.pref_dir {
        Some(dir) => discover_overlays(dir, &config.include_globs)?,
        None => Vec::new(),
    };
    paths.extend(sources.files.iter().cloned());

    if paths.is_empty() {
        anyhow::bail!("No overlays given: pass overlay files or --dir");
    }
    tracing::debug!("overlay order: {:?}", paths);
    Ok(paths)
}
