//! Stable fingerprints for merged preference sets

use crate::domain::MergedPreferences;
use crate::render::render_prefs_js;
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical prefs.js rendering, which is key-ordered and
/// therefore independent of how the set was assembled.
pub fn merged_fingerprint(merged: &MergedPreferences) -> String {
    let mut hasher = Sha256::new();
    hasher.update(render_prefs_js(merged.iter()).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use crate::parse::parse_overlay;

    #[test]
    fn fingerprint_ignores_declaration_order() {
        let a = parse_overlay("a", "pref(\"x\", 1);\npref(\"y\", 2);").expect("a");
        let b = parse_overlay("b", "pref(\"y\", 2);\npref(\"x\", 1);").expect("b");
        assert_eq!(merge(&[a]).fingerprint(), merge(&[b]).fingerprint());
    }

    #[test]
    fn fingerprint_tracks_kind_changes() {
        let a = parse_overlay("a", "pref(\"x\", 1);").expect("a");
        let b = parse_overlay("b", "user_pref(\"x\", 1);").expect("b");
        let fa = merged_fingerprint(&merge(&[a]));
        assert_eq!(fa.len(), 64);
        assert_ne!(fa, merged_fingerprint(&merge(&[b])));
    }
}
