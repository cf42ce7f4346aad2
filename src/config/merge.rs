//! CLI flag overlay on top of the loaded config

use crate::domain::{Config, ErrorPolicy, OutputFormat};
use std::path::PathBuf;

/// Values given explicitly on the command line. `None` leaves the config as is.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub include_globs: Option<Vec<String>>,
    pub pref_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub on_error: Option<ErrorPolicy>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(globs) = cli.include_globs {
        config.include_globs = globs;
    }
    if let Some(dir) = cli.pref_dir {
        config.pref_dir = Some(dir);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(policy) = cli.on_error {
        config.on_error = policy;
    }
    config
}
