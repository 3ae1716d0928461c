//! Cheap content fingerprint for change detection.
//!
//! djb2 over the UTF-16 code units of every hunk's header and lines, folded to
//! 32 bits. Not collision resistant; only used to notice that a file the user
//! marked as viewed has changed since.

use crate::domain::DiffHunk;

const DJB2_SEED: u32 = 5381;

pub fn djb2(text: &str) -> u32 {
    text.encode_utf16().fold(DJB2_SEED, |hash, unit| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(unit))
    })
}

/// Fingerprint of a file's hunk sequence, as a lowercase hex string.
pub fn compute_hunks_hash(hunks: &[DiffHunk]) -> String {
    let combined = hunks
        .iter()
        .map(|hunk| format!("{}\n{}", hunk.header, hunk.lines.join("\n")))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{:08x}", djb2(&combined))
}
