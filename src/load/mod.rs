//! Reading overlays from disk
//!
//! Overlays come either from explicit file paths or from a preference
//! directory, which is scanned non-recursively and loaded in file-name order
//! the same way the host application reads its `defaults/pref` directory.

use crate::domain::{ErrorPolicy, OverlaySet};
use crate::parse::{parse_overlay, parse_overlay_lenient, ParseError};
use crate::utils::{decode_text, display_name};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{overlay}:{line}: {reason}")]
    Parse { overlay: String, line: usize, reason: String },
}

impl LoadError {
    fn parse(overlay: &str, error: ParseError) -> Self {
        LoadError::Parse { overlay: overlay.to_string(), line: error.line, reason: error.reason }
    }
}

/// Overlays read in order, plus any declarations skipped under
/// [`ErrorPolicy::Skip`].
#[derive(Debug, Default)]
pub struct LoadedStack {
    pub overlays: Vec<OverlaySet>,
    pub skipped: Vec<LoadError>,
}

/// Read one overlay file; the overlay is named after its path.
pub fn read_overlay_file(path: &Path) -> Result<(String, String), LoadError> {
    let name = display_name(path);
    let bytes =
        std::fs::read(path).map_err(|source| LoadError::Read { path: name.clone(), source })?;
    let (text, had_errors) = decode_text(&bytes);
    if had_errors {
        tracing::warn!("{}: invalid UTF-8 replaced with U+FFFD", name);
    }
    Ok((name, text))
}

/// Read and parse `paths` in order.
///
/// Read failures always abort. Parse failures abort under
/// [`ErrorPolicy::Abort`]; under [`ErrorPolicy::Skip`] the offending
/// declarations are dropped and returned in [`LoadedStack::skipped`].
pub fn load_overlays(paths: &[PathBuf], policy: ErrorPolicy) -> Result<LoadedStack, LoadError> {
    let mut stack = LoadedStack::default();

    for path in paths {
        let (name, text) = read_overlay_file(path)?;
        let overlay = match policy {
            ErrorPolicy::Abort => {
                parse_overlay(&name, &text).map_err(|e| LoadError::parse(&name, e))?
            }
            ErrorPolicy::Skip => {
                let (overlay, errors) = parse_overlay_lenient(&name, &text);
                stack.skipped.extend(errors.into_iter().map(|e| LoadError::parse(&name, e)));
                overlay
            }
        };
        tracing::debug!("loaded {} ({} declarations)", name, overlay.len());
        stack.overlays.push(overlay);
    }

    Ok(stack)
}

fn build_include_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!("ignoring invalid include glob '{}': {}", pattern, e),
        }
    }
    Ok(builder.build()?)
}

/// List overlay files directly inside `dir` whose names match `include_globs`,
/// sorted by file name.
pub fn discover_overlays(dir: &Path, include_globs: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Preference directory not found: {}", dir.display());
    }
    let globs = build_include_globset(include_globs)?;

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed scanning directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if globs.is_match(entry.file_name()) {
            found.push(entry.into_path());
        } else {
            tracing::debug!("skipping {} (no include glob matched)", entry.path().display());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PrefValue;
    use std::fs;
    use tempfile::TempDir;

    fn globs(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discovers_in_file_name_order() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("40_security-misc.js"), "").expect("write");
        fs::write(tmp.path().join("10_base.js"), "").expect("write");
        fs::write(tmp.path().join("README.md"), "").expect("write");
        fs::create_dir(tmp.path().join("nested.js")).expect("mkdir");
        fs::write(tmp.path().join("nested.js").join("00_inner.js"), "").expect("write");

        let found = discover_overlays(tmp.path(), &globs(&["*.js"])).expect("discover");
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["10_base.js", "40_security-misc.js"]);
    }

    #[test]
    fn discover_rejects_missing_directory() {
        let tmp = TempDir::new().expect("tmp");
        let err = discover_overlays(&tmp.path().join("nope"), &globs(&["*.js"]));
        assert!(err.is_err());
    }

    #[test]
    fn load_aborts_on_first_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.js");
        fs::write(&path, "pref(\"a\", 1);\npref(\"b\", nope);\n").expect("write");

        let err = load_overlays(&[path], ErrorPolicy::Abort).expect_err("abort");
        match err {
            LoadError::Parse { overlay, line, .. } => {
                assert!(overlay.ends_with("bad.js"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_skips_bad_declarations_when_asked() {
        let tmp = TempDir::new().expect("tmp");
        let good = tmp.path().join("10_good.js");
        let bad = tmp.path().join("20_bad.js");
        fs::write(&good, "pref(\"a\", 1);\n").expect("write");
        fs::write(&bad, "pref(\"a\", 2);\npref(\"b\", nope);\n").expect("write");

        let stack = load_overlays(&[good, bad], ErrorPolicy::Skip).expect("skip");
        assert_eq!(stack.overlays.len(), 2);
        assert_eq!(stack.skipped.len(), 1);
        assert!(stack.skipped[0].to_string().ends_with("20_bad.js:2: expected a value (true, false, integer or string), found 'nope'"));
        let merged = crate::merge::merge(&stack.overlays);
        assert_eq!(merged.value("a"), Some(&PrefValue::Int(2)));
        assert!(!merged.contains_key("b"));
    }

    #[test]
    fn load_fails_on_missing_file_even_when_skipping() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_overlays(&[tmp.path().join("gone.js")], ErrorPolicy::Skip)
            .expect_err("missing file");
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
