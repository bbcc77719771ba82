//! Format detection.

use crate::krf::MAGIC;
use std::path::Path;

/// Short format name.
pub const FORMAT_NAME: &str = "krf";

/// Descriptive format name.
pub const FORMAT_LONG_NAME: &str = "Kalay Record Format / KRF";

/// File extensions KRF recordings are usually saved with.
pub const EXTENSIONS: &[&str] = &["mkr"];

/// Highest probe score.
pub const PROBE_SCORE_MAX: u32 = 100;

/// Score how likely `buf` (the first bytes of a stream) is a KRF file.
///
/// Only the 3-byte magic is checked; the extension plays no part.
pub fn probe(buf: &[u8]) -> u32 {
    if is_krf(buf) {
        PROBE_SCORE_MAX
    } else {
        0
    }
}

/// Whether `buf` starts with the KRF signature.
pub fn is_krf(buf: &[u8]) -> bool {
    buf.starts_with(&MAGIC)
}

/// Whether the path carries a KRF extension.
pub fn has_krf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|k| k.eq_ignore_ascii_case(ext)))
}
