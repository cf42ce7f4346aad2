//! prefs.js rendering
//!
//! Output is always parseable back into the same entries.

use crate::domain::PreferenceEntry;
use crate::utils::escape_string;
use std::fmt::Write;

/// Render entries one declaration per line, in iteration order.
pub fn render_prefs_js<'a>(entries: impl IntoIterator<Item = &'a PreferenceEntry>) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}(\"{}\", {});",
            entry.kind.keyword(),
            escape_string(&entry.key),
            entry.value
        );
    }
    out
}
