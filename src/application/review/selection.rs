//! Line Selection Engine.
//!
//! Tracks one drag-selection of diff lines within a single file. The engine
//! owns the global listeners a drag needs (pointer release, Escape, background
//! click) and holds them exactly while a selection exists.

use crate::domain::{
    CommentDraft, DiffHunk, DiffLineSelection, HunkLineKind, LinePointer, SelectedLine,
    SelectionActions,
};
use crate::infra::diff::compute_line_numbers;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    /// Button held, anchor fixed.
    Selecting { anchor: LinePointer },
    /// Button released, selection kept for a menu action.
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Document-level listeners a selection depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GlobalListener {
    PointerUp,
    Escape,
    BackgroundClick,
}

/// Listeners held for the lifetime of one phase; replaced on every transition.
#[derive(Debug, Default, PartialEq, Eq)]
struct ListenerScope {
    active: Vec<GlobalListener>,
}

impl ListenerScope {
    fn for_phase(phase: &SelectionPhase) -> Self {
        let active = match phase {
            SelectionPhase::Idle => Vec::new(),
            SelectionPhase::Selecting { .. } => vec![
                GlobalListener::PointerUp,
                GlobalListener::Escape,
                GlobalListener::BackgroundClick,
            ],
            SelectionPhase::Selected => {
                vec![GlobalListener::Escape, GlobalListener::BackgroundClick]
            }
        };
        if !active.is_empty() {
            log::trace!("Acquired selection listeners {active:?}");
        }
        Self { active }
    }

    fn holds(&self, listener: GlobalListener) -> bool {
        self.active.contains(&listener)
    }
}

impl Drop for ListenerScope {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            log::trace!("Released selection listeners {:?}", self.active);
        }
    }
}

#[derive(Debug, Default)]
pub struct LineSelectionEngine {
    phase: SelectionPhase,
    selection: Option<DiffLineSelection>,
    listeners: ListenerScope,
}

impl LineSelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SelectionPhase {
        &self.phase
    }

    pub fn selection(&self) -> Option<&DiffLineSelection> {
        self.selection.as_ref()
    }

    pub fn active_listeners(&self) -> &[GlobalListener] {
        &self.listeners.active
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SelectionPhase::Idle
    }

    fn transition(&mut self, phase: SelectionPhase) {
        if self.phase == phase {
            return;
        }
        // Release before acquiring so two scopes never overlap.
        self.listeners = ListenerScope::default();
        self.listeners = ListenerScope::for_phase(&phase);
        self.phase = phase;
    }

    /// Button pressed over `pointer`. `hunks` are the file's displayed hunks.
    ///
    /// A primary press starts a new drag, replacing any selection (also one in
    /// another file). A secondary press keeps an existing selection so a
    /// context menu can act on it.
    pub fn pointer_down(&mut self, pointer: LinePointer, button: PointerButton, hunks: &[DiffHunk]) {
        if button == PointerButton::Secondary && self.selection.is_some() {
            return;
        }
        let Some(line) = selected_line(hunks, pointer.hunk_index, pointer.line_index) else {
            return;
        };
        if button == PointerButton::Secondary {
            self.selection = Some(DiffLineSelection {
                file_path: pointer.file_path,
                lines: vec![line],
            });
            self.transition(SelectionPhase::Selected);
            return;
        }
        self.selection = Some(DiffLineSelection {
            file_path: pointer.file_path.clone(),
            lines: vec![line],
        });
        self.transition(SelectionPhase::Selecting { anchor: pointer });
    }

    /// Pointer moved over `pointer` while dragging.
    pub fn pointer_enter(&mut self, pointer: LinePointer, hunks: &[DiffHunk]) {
        let SelectionPhase::Selecting { anchor } = &self.phase else {
            return;
        };
        if anchor.file_path != pointer.file_path {
            return;
        }
        let lines = select_range(hunks, anchor, &pointer);
        if lines.is_empty() {
            return;
        }
        self.selection = Some(DiffLineSelection {
            file_path: pointer.file_path,
            lines,
        });
    }

    /// Button released anywhere.
    pub fn pointer_up(&mut self) {
        if !self.listeners.holds(GlobalListener::PointerUp) {
            return;
        }
        self.transition(SelectionPhase::Selected);
    }

    pub fn escape(&mut self) {
        if self.listeners.holds(GlobalListener::Escape) {
            self.clear();
        }
    }

    /// Click outside any interactive element.
    pub fn background_click(&mut self) {
        if self.listeners.holds(GlobalListener::BackgroundClick) {
            self.clear();
        }
    }

    /// Hands the selection to a stage or comment action and returns to idle.
    pub fn consume(&mut self) -> Option<DiffLineSelection> {
        let selection = self.selection.take();
        self.transition(SelectionPhase::Idle);
        selection
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.transition(SelectionPhase::Idle);
    }

    /// Drops the selection if it belongs to `file_path`.
    pub fn clear_file(&mut self, file_path: &str) {
        if self
            .selection
            .as_ref()
            .is_some_and(|s| s.file_path == file_path)
        {
            self.clear();
        }
    }

    pub fn actions(&self) -> SelectionActions {
        let Some(selection) = &self.selection else {
            return SelectionActions::default();
        };
        let has_change = |staged: bool| {
            selection
                .lines
                .iter()
                .any(|l| l.is_staged == staged && HunkLineKind::of(&l.content).is_change())
        };
        SelectionActions {
            can_stage: has_change(false),
            can_unstage: has_change(true),
            can_comment: !selection.is_empty(),
        }
    }
}

fn selected_line(hunks: &[DiffHunk], hunk_index: usize, line_index: usize) -> Option<SelectedLine> {
    let hunk = hunks.get(hunk_index)?;
    let content = hunk.lines.get(line_index)?;
    Some(SelectedLine {
        hunk_index,
        line_index,
        content: content.clone(),
        is_staged: hunk.is_staged,
    })
}

/// Inclusive range between `anchor` and `current`, possibly spanning hunks.
///
/// The first spanned hunk starts at the anchor's line (0 if the anchor is not
/// in it), the last ends at the current line (its last line if the current
/// point is not in it), and hunks in between are taken whole. Each hunk's
/// bounds are then ordered min/max.
pub fn select_range(
    hunks: &[DiffHunk],
    anchor: &LinePointer,
    current: &LinePointer,
) -> Vec<SelectedLine> {
    let first = anchor.hunk_index.min(current.hunk_index);
    let last = anchor.hunk_index.max(current.hunk_index);
    let mut lines = Vec::new();

    for hunk_index in first..=last {
        let Some(hunk) = hunks.get(hunk_index) else {
            continue;
        };
        let Some(last_line) = hunk.last_line_index() else {
            continue;
        };

        let (a, b) = if first == last {
            (anchor.line_index, current.line_index)
        } else if hunk_index == first {
            let start = if anchor.hunk_index == first {
                anchor.line_index
            } else {
                0
            };
            (start, last_line)
        } else if hunk_index == last {
            let end = if current.hunk_index == last {
                current.line_index
            } else {
                last_line
            };
            (0, end)
        } else {
            (0, last_line)
        };

        let start = a.min(b).min(last_line);
        let end = a.max(b).min(last_line);
        for line_index in start..=end {
            if let Some(line) = selected_line(hunks, hunk_index, line_index) {
                lines.push(line);
            }
        }
    }
    lines
}

/// Comment anchor for a selection: the first spanned hunk and the real line
/// range covered by the selected lines.
pub fn comment_draft(selection: &DiffLineSelection, hunks: &[DiffHunk]) -> Option<CommentDraft> {
    let first = selection.lines.first()?;
    let hunk = hunks.get(first.hunk_index)?;

    let mut real_lines = Vec::new();
    for line in &selection.lines {
        let Some(h) = hunks.get(line.hunk_index) else {
            continue;
        };
        if let Some(real) = compute_line_numbers(h)
            .get(line.line_index)
            .and_then(|n| n.real())
        {
            real_lines.push(real);
        }
    }
    let start_line = real_lines.iter().copied().min()?;
    let end_line = real_lines.iter().copied().max()?;

    Some(CommentDraft {
        file_path: selection.file_path.clone(),
        hunk_id: hunk.id.clone(),
        start_line,
        end_line,
        line_content: selection.lines.iter().map(|l| l.content.clone()).collect(),
    })
}
