//! File-level actions: staging, discarding, committing, viewed marks, gates.

use super::super::action::FileAction;
use super::super::command::{Command, RefreshReason, VcsOperation};
use super::super::state::{NotificationLevel, SessionState};
use super::{load_files, reject, report_failure, workspace_path};
use crate::domain::{DiscardTarget, ValidationError};
use crate::infra::hash::compute_hunks_hash;
use crate::infra::vcs::{extract_commit_hash, summary_line};

pub fn reduce(state: &mut SessionState, action: FileAction) -> Vec<Command> {
    match action {
        FileAction::Stage(paths) => {
            let paths = known_paths(state, paths);
            if paths.is_empty() {
                return reject(state, ValidationError::NothingSelected);
            }
            run_vcs(state, VcsOperation::Stage(paths))
        }
        FileAction::Unstage(paths) => {
            let paths = known_paths(state, paths);
            if paths.is_empty() {
                return reject(state, ValidationError::NothingSelected);
            }
            run_vcs(state, VcsOperation::Unstage(paths))
        }
        FileAction::Discard(path) => {
            let targets = discard_targets(state, &path);
            if targets.is_empty() {
                return reject(state, ValidationError::NothingSelected);
            }
            run_vcs(state, VcsOperation::Discard(targets))
        }
        FileAction::Commit { message } => {
            let message = match validate_commit_message(&message, state.config.max_commit_message_len)
            {
                Ok(message) => message,
                Err(err) => return reject(state, err),
            };
            let operation = commit_operation(state, message);
            run_vcs(state, operation)
        }
        FileAction::CommitAmend { message } => {
            let max = state.config.max_commit_message_len;
            let len = message.trim().chars().count();
            if len > max {
                return reject(state, ValidationError::CommitMessageTooLong { len, max });
            }
            run_vcs(
                state,
                VcsOperation::CommitAmend {
                    message: message.trim().to_string(),
                },
            )
        }
        FileAction::Push => run_vcs(state, VcsOperation::Push),
        FileAction::Pull => run_vcs(state, VcsOperation::Pull),
        FileAction::ToggleSelected(path) => {
            if state.has_file(&path) && !state.selected_files.remove(&path) {
                state.selected_files.insert(path);
            }
            Vec::new()
        }
        FileAction::SelectAll => {
            state.selected_files = state.files.iter().map(|f| f.path.clone()).collect();
            Vec::new()
        }
        FileAction::ClearSelected => {
            state.selected_files.clear();
            Vec::new()
        }
        FileAction::MarkViewed(path) => mark_viewed(state, path),
        FileAction::UnmarkViewed(path) => {
            let Some(workspace) = workspace_path(state) else {
                return Vec::new();
            };
            if state.viewed.remove(&path).is_none() {
                return Vec::new();
            }
            vec![Command::UnmarkViewed {
                workspace,
                file_path: path,
            }]
        }
        FileAction::RevealFile(path) => {
            state.revealed_files.insert(path);
            Vec::new()
        }
        FileAction::RevealChangeset => {
            state.changeset_revealed = true;
            Vec::new()
        }
    }
}

fn known_paths(state: &SessionState, paths: Vec<String>) -> Vec<String> {
    paths.into_iter().filter(|p| state.has_file(p)).collect()
}

/// Discarding a file that is part of a multi-selection discards the selection.
pub fn discard_targets(state: &SessionState, path: &str) -> Vec<DiscardTarget> {
    let Some(file) = state.file(path) else {
        return Vec::new();
    };
    if state.selected_files.len() > 1 && state.selected_files.contains(path) {
        state
            .files
            .iter()
            .filter(|f| state.selected_files.contains(&f.path))
            .map(DiscardTarget::from)
            .collect()
    } else {
        vec![DiscardTarget::from(file)]
    }
}

pub fn validate_commit_message(message: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCommitMessage);
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::CommitMessageTooLong { len, max });
    }
    Ok(trimmed.to_string())
}

/// A strict, non-empty subset of the files commits only those paths.
pub fn commit_operation(state: &SessionState, message: String) -> VcsOperation {
    let selected = state.selected_paths();
    if !selected.is_empty() && selected.len() < state.files.len() {
        VcsOperation::CommitPaths {
            message,
            paths: selected,
        }
    } else {
        VcsOperation::Commit { message }
    }
}

pub(super) fn run_vcs(state: &mut SessionState, operation: VcsOperation) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    log::debug!("Running {}", operation.kind().verb());
    state.operations_in_flight += 1;
    vec![Command::RunVcs {
        workspace,
        operation,
    }]
}

fn mark_viewed(state: &mut SessionState, path: String) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    let loaded = state
        .hunks
        .get(&path)
        .filter(|entry| !entry.is_loading && entry.error.is_none())
        .map(|entry| compute_hunks_hash(&entry.hunks));
    let Some(hash) = loaded else {
        return reject(state, ValidationError::HunksNotLoaded(path));
    };
    state.viewed.insert(path.clone(), hash.clone());
    vec![Command::MarkViewed {
        workspace,
        file_path: path,
        content_hash: hash,
    }]
}

pub fn operation_completed(
    state: &mut SessionState,
    operation: VcsOperation,
    result: Result<String, String>,
) -> Vec<Command> {
    state.operations_in_flight = state.operations_in_flight.saturating_sub(1);
    let kind = operation.kind();

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            let verb = kind.verb();
            let mut title = verb[..1].to_uppercase();
            title.push_str(&verb[1..]);
            report_failure(state, &title, err);
            return Vec::new();
        }
    };

    let title = success_title(&operation, &output);
    let description = summary_line(&output);
    log::info!("{title}");
    state.notify(NotificationLevel::Success, title, description);

    match &operation {
        VcsOperation::Commit { .. } => state.selected_files.clear(),
        VcsOperation::CommitPaths { paths, .. } => {
            for path in paths {
                state.selected_files.remove(path);
            }
        }
        _ => {}
    }

    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    let mut commands = vec![Command::InvalidateHunkCache {
        workspace,
        paths: operation.touched_paths(),
    }];
    commands.extend(load_files(state, RefreshReason::AfterOperation, false));
    commands
}

fn success_title(operation: &VcsOperation, output: &str) -> String {
    let files = |n: usize| if n == 1 { "1 file".to_string() } else { format!("{n} files") };
    match operation {
        VcsOperation::Stage(paths) => format!("Staged {}", files(paths.len())),
        VcsOperation::Unstage(paths) => format!("Unstaged {}", files(paths.len())),
        VcsOperation::Discard(targets) => format!("Discarded {}", files(targets.len())),
        VcsOperation::StageLines { file_path, .. } => format!("Staged lines in {file_path}"),
        VcsOperation::UnstageLines { file_path, .. } => format!("Unstaged lines in {file_path}"),
        VcsOperation::Commit { .. }
        | VcsOperation::CommitPaths { .. }
        | VcsOperation::CommitAmend { .. } => match extract_commit_hash(output) {
            Some(hash) => format!("Committed {hash}"),
            None => "Committed".to_string(),
        },
        VcsOperation::Push => "Pushed".to_string(),
        VcsOperation::Pull => "Pulled".to_string(),
    }
}
