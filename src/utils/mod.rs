//! Shared helpers

pub mod encoding;
pub mod escape;
pub mod hashing;
pub mod paths;

pub use encoding::decode_text;
pub use escape::escape_string;
pub use hashing::merged_fingerprint;
pub use paths::{display_name, normalize_path};
