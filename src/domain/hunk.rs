use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a single diff line, derived from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HunkLineKind {
    Added,
    Deleted,
    Context,
}

impl HunkLineKind {
    pub fn of(line: &str) -> Self {
        if line.starts_with('+') {
            Self::Added
        } else if line.starts_with('-') {
            Self::Deleted
        } else {
            Self::Context
        }
    }

    pub fn is_change(self) -> bool {
        !matches!(self, Self::Context)
    }
}

/// A unified-diff hunk as delivered by the VCS collaborator.
///
/// Hunks are immutable once fetched: a changed hunk arrives as a new value, so
/// structural equality is the staleness signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// Opaque identifier assigned by the collaborator.
    pub id: String,
    /// `@@ -a,b +c,d @@` header, optionally followed by a section heading.
    pub header: String,
    /// Lines including their `+`, `-` or ` ` prefix.
    pub lines: Vec<String>,
    /// Whether this hunk comes from the index (staged) side.
    #[serde(default)]
    pub is_staged: bool,
    /// Full patch text for this hunk, used when staging it wholesale.
    #[serde(default)]
    pub raw_patch: String,
}

impl DiffHunk {
    pub fn line_kind(&self, index: usize) -> Option<HunkLineKind> {
        self.lines.get(index).map(|line| HunkLineKind::of(line))
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| HunkLineKind::of(line) == HunkLineKind::Added)
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| HunkLineKind::of(line) == HunkLineKind::Deleted)
            .count()
    }

    pub fn last_line_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }
}

/// Per-file hunk state held by the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileHunksEntry {
    pub file_path: String,
    pub hunks: Vec<DiffHunk>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl FileHunksEntry {
    pub fn loading(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            hunks: Vec::new(),
            is_loading: true,
            error: None,
        }
    }

    pub fn loaded(file_path: impl Into<String>, hunks: Vec<DiffHunk>) -> Self {
        Self {
            file_path: file_path.into(),
            hunks,
            is_loading: false,
            error: None,
        }
    }

    pub fn failed(file_path: impl Into<String>, previous: Vec<DiffHunk>, error: String) -> Self {
        Self {
            file_path: file_path.into(),
            hunks: previous,
            is_loading: false,
            error: Some(error),
        }
    }

    /// Added plus deleted lines across every hunk of the file.
    pub fn changed_line_count(&self) -> usize {
        self.hunks.iter().map(|h| h.additions() + h.deletions()).sum()
    }

    pub fn hunk(&self, hunk_id: &str) -> Option<&DiffHunk> {
        self.hunks.iter().find(|h| h.id == hunk_id)
    }
}

/// Hunk entries keyed by file path.
pub type HunkMap = BTreeMap<String, FileHunksEntry>;

/// A block of file lines returned by the collaborator for context expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLines {
    pub lines: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(lines: &[&str]) -> DiffHunk {
        DiffHunk {
            id: "h1".into(),
            header: "@@ -1,2 +1,2 @@".into(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            is_staged: false,
            raw_patch: String::new(),
        }
    }

    #[test]
    fn counts_additions_and_deletions() {
        let h = hunk(&[" ctx", "-old", "+new", "+more"]);
        assert_eq!(h.additions(), 2);
        assert_eq!(h.deletions(), 1);
        assert_eq!(h.line_kind(0), Some(HunkLineKind::Context));
        assert_eq!(h.line_kind(3), Some(HunkLineKind::Added));
        assert_eq!(h.line_kind(4), None);

        let entry = FileHunksEntry::loaded("a.rs", vec![h.clone(), h]);
        assert_eq!(entry.changed_line_count(), 6);
    }

    #[test]
    fn structural_equality_ignores_identity() {
        let a = hunk(&["-old", "+new"]);
        let b = hunk(&["-old", "+new"]);
        assert_eq!(a, b);
        let c = hunk(&["-old", "+new2"]);
        assert_ne!(a, c);
    }
}
