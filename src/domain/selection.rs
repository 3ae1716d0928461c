use serde::{Deserialize, Serialize};

/// Position of a rendered diff line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePointer {
    pub file_path: String,
    pub hunk_index: usize,
    pub line_index: usize,
}

impl LinePointer {
    pub fn new(file_path: impl Into<String>, hunk_index: usize, line_index: usize) -> Self {
        Self {
            file_path: file_path.into(),
            hunk_index,
            line_index,
        }
    }
}

/// One selected line, captured with its text and staged flag at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLine {
    pub hunk_index: usize,
    pub line_index: usize,
    pub content: String,
    pub is_staged: bool,
}

/// A contiguous drag-selection within a single file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffLineSelection {
    pub file_path: String,
    pub lines: Vec<SelectedLine>,
}

impl DiffLineSelection {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_staged(&self) -> bool {
        self.lines.iter().any(|l| l.is_staged)
    }

    pub fn has_unstaged(&self) -> bool {
        self.lines.iter().any(|l| !l.is_staged)
    }

    /// Selected line indices grouped per hunk, in selection order.
    pub fn by_hunk(&self) -> Vec<(usize, Vec<usize>)> {
        let mut grouped: Vec<(usize, Vec<usize>)> = Vec::new();
        for line in &self.lines {
            match grouped.last_mut() {
                Some((hunk, indices)) if *hunk == line.hunk_index => indices.push(line.line_index),
                _ => grouped.push((line.hunk_index, vec![line.line_index])),
            }
        }
        grouped
    }
}

/// Actions a selection can be offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionActions {
    pub can_stage: bool,
    pub can_unstage: bool,
    pub can_comment: bool,
}
