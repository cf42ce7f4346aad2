//! Output rendering: prefs.js text and JSON

pub mod json;
pub mod prefs_js;

pub use json::render_json;
pub use prefs_js::render_prefs_js;
