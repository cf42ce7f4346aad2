//! Text decoding for overlay files.
//!
//! Preference files are UTF-8 in practice. A leading BOM (UTF-8 or UTF-16) is
//! honoured and stripped; invalid sequences are replaced rather than rejected
//! so a single bad byte surfaces as a parse error on its line instead of an
//! unreadable file.

use encoding_rs::UTF_8;

/// Decode raw bytes, sniffing a BOM and falling back to lossy UTF-8.
///
/// Returns the text and whether any replacement characters were inserted.
pub fn decode_text(bytes: &[u8]) -> (String, bool) {
    let (cow, encoding, had_errors) = UTF_8.decode(bytes);
    if encoding != UTF_8 {
        tracing::debug!("decoded overlay as {}", encoding.name());
    }
    (cow.into_owned(), had_errors)
}
