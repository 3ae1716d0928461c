//! Diff formats: hunk coordinates, status listings, hunk parsing and partial patches.

pub mod coords;
pub mod parser;
pub mod patch;
pub mod status;

pub use coords::{
    HunkHeader, LineNumbers, compute_line_numbers, header_or_default, parse_hunk_header,
    real_line_number,
};
pub use patch::{PartialPatch, PatchDirection, build_partial_patch};
pub use status::{parse_status_line, parse_status_lines};
