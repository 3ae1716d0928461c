//! Parsing of the collaborator's changed-file listing.
//!
//! Each raw line carries a two-character `XY` status prefix (index side, then
//! working tree) followed by the path, e.g. `M  src/lib.rs`, ` M README.md`,
//! `?? notes.txt`, `R  old.rs -> new.rs`. Listings that were trimmed by the
//! producer (`M file.txt`) carry a single working-tree code.

use crate::domain::FileChange;

const UNTRACKED_MARKER: &str = "??";

fn status_code(c: char) -> Option<char> {
    match c {
        ' ' | '.' => None,
        other => Some(other),
    }
}

fn clean_path(raw: &str) -> String {
    let raw = raw.trim();
    // Renames/copies list both sides; the destination is the live path.
    let path = raw.rsplit_once(" -> ").map(|(_, to)| to).unwrap_or(raw);
    let path = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path);
    path.to_string()
}

/// Parses one status line; blank or malformed lines yield `None`.
pub fn parse_status_line(line: &str) -> Option<FileChange> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix(UNTRACKED_MARKER) {
        let path = clean_path(rest);
        return (!path.is_empty()).then_some(FileChange {
            path,
            staged_status: None,
            work_tree_status: None,
            is_untracked: true,
        });
    }

    let chars: Vec<char> = line.chars().take(3).collect();
    let (staged, work_tree, path_start) = match chars.as_slice() {
        [x, y, ' '] => (status_code(*x), status_code(*y), 3),
        [y, ' ', ..] => (None, status_code(*y), 2),
        _ => return None,
    };

    let path = clean_path(line.get(path_start..)?);
    if path.is_empty() || (staged.is_none() && work_tree.is_none()) {
        return None;
    }

    Some(FileChange {
        path,
        staged_status: staged,
        work_tree_status: work_tree,
        is_untracked: false,
    })
}

/// Parses a full listing, dropping unparseable lines and duplicate paths.
pub fn parse_status_lines<S: AsRef<str>>(lines: &[S]) -> Vec<FileChange> {
    let mut seen = std::collections::HashSet::new();
    lines
        .iter()
        .filter_map(|line| parse_status_line(line.as_ref()))
        .filter(|file| seen.insert(file.path.clone()))
        .collect()
}
