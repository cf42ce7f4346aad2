//! Overlay merging
//!
//! Folds an ordered stack of overlays into one mapping. Overlays are visited
//! in order and, within each, declarations in file order; the last write for a
//! key wins. There is no deletion other than overwrite.

use crate::domain::{MergedPreferences, Origin, OverlaySet, PreferenceEntry};
use serde::Serialize;
use std::collections::BTreeMap;

/// Merge overlays, later declarations winning on key collision.
pub fn merge(overlays: &[OverlaySet]) -> MergedPreferences {
    let mut merged = MergedPreferences::default();
    for overlay in overlays {
        for entry in overlay.entries() {
            merged.insert(entry.clone());
        }
    }
    merged
}

/// A declaration that replaced an earlier, different one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Override {
    pub key: String,
    pub previous: Origin,
    pub replaced_by: Origin,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub merged: MergedPreferences,
    pub overrides: Vec<Override>,
    /// Re-declarations identical to what they replaced.
    pub redundant: usize,
}

/// Like [`merge`], but also records which declarations were overridden.
pub fn merge_with_report(overlays: &[OverlaySet]) -> MergeReport {
    let mut report = MergeReport::default();
    let mut origins: BTreeMap<String, Origin> = BTreeMap::new();

    for overlay in overlays {
        tracing::debug!("merging overlay {} ({} declarations)", overlay.name, overlay.len());
        for decl in &overlay.declarations {
            let origin = Origin { overlay: overlay.name.clone(), line: decl.line };
            let previous = report.merged.insert(decl.entry.clone());
            let previous_origin = origins.insert(decl.entry.key.clone(), origin.clone());

            let (Some(previous), Some(previous_origin)) = (previous, previous_origin) else {
                continue;
            };
            if previous == decl.entry {
                report.redundant += 1;
                continue;
            }
            tracing::debug!(
                "{} overridden: {} = {} ({}) -> {} ({})",
                decl.entry.key,
                previous.kind,
                previous.value,
                previous_origin,
                decl.entry.value,
                origin
            );
            report.overrides.push(Override {
                key: decl.entry.key.clone(),
                previous: previous_origin,
                replaced_by: origin,
            });
        }
    }

    report
}

/// One declaration of a key somewhere in the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedDeclaration {
    pub origin: Origin,
    pub entry: PreferenceEntry,
}

/// Every declaration of `key` in processing order. The last one is the winner.
pub fn trace(overlays: &[OverlaySet], key: &str) -> Vec<TracedDeclaration> {
    overlays
        .iter()
        .flat_map(|overlay| {
            overlay.declarations.iter().filter(|d| d.entry.key == key).map(|d| {
                TracedDeclaration {
                    origin: Origin { overlay: overlay.name.clone(), line: d.line },
                    entry: d.entry.clone(),
                }
            })
        })
        .collect()
}
