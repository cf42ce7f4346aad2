//! Path normalization

use std::path::Path;

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Name an overlay after its path, with forward slashes on every platform.
pub fn display_name(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}
