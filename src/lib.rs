//! prefstack: parse and merge layered preference overlays
//!
//! Reads Mozilla-style `pref()` / `user_pref()` declaration files, folds an
//! ordered stack of them into a single preference set (later declarations
//! win), and renders the result as prefs.js text or JSON.

pub mod cli;
pub mod config;
pub mod domain;
pub mod load;
pub mod merge;
pub mod parse;
pub mod render;
pub mod utils;

pub use domain::{
    Config, Declaration, MergedPreferences, OverlaySet, PrefKind, PrefValue, PreferenceEntry,
};
pub use merge::{merge, merge_with_report, trace};
pub use parse::{parse_overlay, parse_overlay_lenient, ParseError};
