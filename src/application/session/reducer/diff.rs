//! Diff-view interaction: context expansion, line selection, line staging.

use super::super::action::DiffAction;
use super::super::command::{Command, VcsOperation};
use super::super::expansion::{ContextRequest, ExpansionSide};
use super::super::state::SessionState;
use super::files::run_vcs;
use super::{reject, workspace_path};
use crate::application::review::{comment_draft, select_range};
use crate::domain::{CommentDraft, DiffHunk, DiffLineSelection, HunkLineKind, HunkMap, ValidationError};
use crate::infra::vcs::HunkLineSelection;

pub fn reduce(state: &mut SessionState, action: DiffAction) -> Vec<Command> {
    match action {
        DiffAction::HunkRendered {
            file_path,
            hunk_index,
        } => {
            let lines = state.config.auto_context_lines;
            expand(state, &file_path, hunk_index, None, lines)
        }
        DiffAction::ExpandMore {
            file_path,
            hunk_index,
            side,
        } => {
            let lines = state.config.expand_step;
            expand(state, &file_path, hunk_index, Some(side), lines)
        }
        DiffAction::PointerDown { pointer, button } => {
            let hunks = file_hunks(&state.hunks, &pointer.file_path);
            state.selection.pointer_down(pointer, button, hunks);
            Vec::new()
        }
        DiffAction::PointerEnter(pointer) => {
            let hunks = file_hunks(&state.hunks, &pointer.file_path);
            state.selection.pointer_enter(pointer, hunks);
            Vec::new()
        }
        DiffAction::PointerUp => {
            state.selection.pointer_up();
            Vec::new()
        }
        DiffAction::Escape => {
            if state.composer_open {
                state.composer_open = false;
                state.draft = None;
            } else {
                state.selection.escape();
            }
            Vec::new()
        }
        DiffAction::BackgroundClick => {
            state.selection.background_click();
            Vec::new()
        }
        DiffAction::StageSelection => stage_selection(state, false),
        DiffAction::UnstageSelection => stage_selection(state, true),
        DiffAction::CommentOnSelection => {
            let Some(selection) = state.selection.selection() else {
                return reject(state, ValidationError::NothingSelected);
            };
            let hunks = file_hunks(&state.hunks, &selection.file_path);
            match comment_draft(selection, hunks) {
                Some(draft) => open_composer(state, draft),
                None => reject(state, ValidationError::NothingSelected),
            }
        }
        DiffAction::CommentOnLine(pointer) => {
            let hunks = file_hunks(&state.hunks, &pointer.file_path);
            let selection = DiffLineSelection {
                file_path: pointer.file_path.clone(),
                lines: select_range(hunks, &pointer, &pointer),
            };
            match comment_draft(&selection, hunks) {
                Some(draft) => open_composer(state, draft),
                None => reject(state, ValidationError::NothingSelected),
            }
        }
    }
}

fn file_hunks<'a>(hunks: &'a HunkMap, file_path: &str) -> &'a [DiffHunk] {
    hunks
        .get(file_path)
        .map(|entry| entry.hunks.as_slice())
        .unwrap_or(&[])
}

fn open_composer(state: &mut SessionState, draft: CommentDraft) -> Vec<Command> {
    log::debug!(
        "Composing comment on {}:{}-{}",
        draft.file_path,
        draft.start_line,
        draft.end_line
    );
    state.draft = Some(draft);
    state.composer_open = true;
    Vec::new()
}

/// Auto-expansion when `side` is `None`, otherwise one manual step.
fn expand(
    state: &mut SessionState,
    file_path: &str,
    hunk_index: usize,
    side: Option<ExpansionSide>,
    lines: u32,
) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    let from_parent_revision = state.file(file_path).is_some_and(|f| f.is_deleted());
    let Some(entry) = state.hunks.get(file_path) else {
        return Vec::new();
    };
    if entry.is_loading {
        return Vec::new();
    }

    let requests: Vec<ContextRequest> = match side {
        None => state.expansion.auto_expand(
            file_path,
            &entry.hunks,
            hunk_index,
            lines,
            from_parent_revision,
        ),
        Some(side) => state
            .expansion
            .plan(
                file_path,
                &entry.hunks,
                hunk_index,
                side,
                lines,
                from_parent_revision,
            )
            .into_iter()
            .collect(),
    };

    requests
        .into_iter()
        .map(|request| Command::FetchContextLines {
            workspace: workspace.clone(),
            request,
        })
        .collect()
}

fn stage_selection(state: &mut SessionState, unstage: bool) -> Vec<Command> {
    let Some(selection) = state.selection.selection() else {
        return reject(state, ValidationError::NothingSelected);
    };
    let file_path = selection.file_path.clone();
    let hunks = file_hunks(&state.hunks, &file_path);

    let mut selections = Vec::new();
    for (hunk_index, line_indices) in selection.by_hunk() {
        let Some(hunk) = hunks.get(hunk_index) else {
            continue;
        };
        if hunk.is_staged != unstage {
            continue;
        }
        let changed: Vec<usize> = line_indices
            .into_iter()
            .filter(|&i| hunk.line_kind(i).is_some_and(HunkLineKind::is_change))
            .collect();
        if !changed.is_empty() {
            selections.push(HunkLineSelection {
                hunk: hunk.clone(),
                line_indices: changed,
            });
        }
    }

    if selections.is_empty() {
        return reject(state, ValidationError::NoChangedLinesSelected);
    }
    state.selection.consume();

    let operation = if unstage {
        VcsOperation::UnstageLines {
            file_path,
            selections,
        }
    } else {
        VcsOperation::StageLines {
            file_path,
            selections,
        }
    };
    run_vcs(state, operation)
}
