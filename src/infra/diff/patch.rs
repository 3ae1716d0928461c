//! Partial patches for staging or unstaging individual lines of a hunk.

use super::coords::{HunkHeader, header_or_default};
use crate::domain::{DiffHunk, HunkLineKind};
use std::collections::HashSet;

/// Which way a partial patch will be applied to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchDirection {
    /// Applied forward onto the index (`git apply --cached`).
    Stage,
    /// Applied in reverse onto the index (`git apply --cached --reverse`).
    Unstage,
}

/// A file patch ready for `git apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPatch {
    pub text: String,
    /// Hunks that carry at least one selected change.
    pub hunk_count: usize,
}

/// Builds one patch for `file_path` holding only the selected changed lines
/// of every given hunk, so the whole selection applies or fails together.
///
/// Unselected lines are rewritten so the patch still applies: when staging,
/// an unselected `-` line is still present in the index and becomes context
/// while an unselected `+` line does not exist there yet and is dropped. When
/// unstaging the roles swap. Hunks without a selected `+`/`-` line are left
/// out; returns `None` if none remain.
pub fn build_partial_patch(
    file_path: &str,
    selections: &[(&DiffHunk, &[usize])],
    direction: PatchDirection,
) -> Option<PartialPatch> {
    let mut hunks: Vec<(HunkHeader, String)> = selections
        .iter()
        .filter_map(|(hunk, selected)| partial_hunk(hunk, selected, direction))
        .collect();
    if hunks.is_empty() {
        return None;
    }
    hunks.sort_by_key(|(header, _)| header.old_start);

    let mut text = format!("--- a/{file_path}\n+++ b/{file_path}\n");
    for (_, body) in &hunks {
        text.push_str(body);
    }
    Some(PartialPatch {
        text,
        hunk_count: hunks.len(),
    })
}

/// Header and rendered text of one rewritten hunk.
fn partial_hunk(
    hunk: &DiffHunk,
    selected: &[usize],
    direction: PatchDirection,
) -> Option<(HunkHeader, String)> {
    let selected: HashSet<usize> = selected.iter().copied().collect();
    let header = header_or_default(hunk);

    let mut body: Vec<String> = Vec::with_capacity(hunk.lines.len());
    let mut old_count = 0u32;
    let mut new_count = 0u32;
    let mut any_change = false;

    for (index, line) in hunk.lines.iter().enumerate() {
        let kind = HunkLineKind::of(line);
        let text = line.get(1..).unwrap_or("");
        let is_selected = selected.contains(&index);

        match (kind, is_selected, direction) {
            (HunkLineKind::Context, _, _) => {
                body.push(format!(" {text}"));
                old_count += 1;
                new_count += 1;
            }
            (HunkLineKind::Added, true, _) => {
                body.push(line.clone());
                new_count += 1;
                any_change = true;
            }
            (HunkLineKind::Deleted, true, _) => {
                body.push(line.clone());
                old_count += 1;
                any_change = true;
            }
            (HunkLineKind::Added, false, PatchDirection::Stage)
            | (HunkLineKind::Deleted, false, PatchDirection::Unstage) => {}
            (HunkLineKind::Deleted, false, PatchDirection::Stage)
            | (HunkLineKind::Added, false, PatchDirection::Unstage) => {
                body.push(format!(" {text}"));
                old_count += 1;
                new_count += 1;
            }
        }
    }

    if !any_change {
        return None;
    }

    let mut text = format!(
        "@@ -{},{} +{},{} @@\n",
        header.old_start, old_count, header.new_start, new_count
    );
    for line in body {
        text.push_str(&line);
        text.push('\n');
    }
    Some((header, text))
}
