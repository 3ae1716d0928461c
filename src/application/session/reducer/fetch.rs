//! The fetch cycle: file list, cached hunks, fresh hunks.

use super::super::command::{Command, RefreshReason};
use super::super::state::{NotificationLevel, SessionState};
use super::workspace_path;
use crate::application::review::{Reconciled, changed_files};
use crate::domain::{DiffHunk, FileChange, FileHunksEntry};
use crate::infra::diff::parse_status_lines;
use crate::infra::hash::compute_hunks_hash;
use std::collections::BTreeSet;
use std::path::Path;

pub fn files_loaded(
    state: &mut SessionState,
    reason: RefreshReason,
    force: bool,
    result: Result<Vec<String>, String>,
) -> Vec<Command> {
    state.is_loading_files = false;
    let lines = match result {
        Ok(lines) => lines,
        Err(err) => {
            log::warn!("{err}");
            if state.files_error.is_none() {
                state.notify(NotificationLevel::Error, "Could not load changes", err.clone());
            }
            state.files_error = Some(err);
            return Vec::new();
        }
    };
    state.files_error = None;
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };

    let incoming = parse_status_lines(&lines);
    let identity_changed = changed_files(&state.files, &incoming);
    let targets = fetch_targets(&reason, &incoming, &identity_changed);
    let first_load = !state.files_loaded;
    let review_mode = state.in_review_mode();

    match state
        .reconciler
        .on_files_snapshot(review_mode, force || first_load, &state.files, &incoming)
    {
        Reconciled::Apply => {
            if first_load || !identity_changed.is_empty() {
                log::info!(
                    "Applied file list ({} files, {} changed)",
                    incoming.len(),
                    identity_changed.len()
                );
            }
            apply_file_list(state, incoming);
            request_hunks(state, &workspace, targets)
        }
        Reconciled::Buffered(changed) => {
            log::info!("{} files changed during review, buffered", changed.len());
            fetch_all(&workspace, targets)
        }
        Reconciled::Unchanged => fetch_all(&workspace, targets),
    }
}

/// Files whose hunks a refresh re-fetches.
///
/// A file-change event names its paths; every other trigger re-validates the
/// whole list. Files whose identity changed are always included.
fn fetch_targets(
    reason: &RefreshReason,
    incoming: &[FileChange],
    identity_changed: &BTreeSet<String>,
) -> BTreeSet<String> {
    let listed = |path: &str| incoming.iter().any(|f| f.path == path);
    let mut targets: BTreeSet<String> = match reason {
        RefreshReason::FilesChanged(paths) => {
            paths.iter().filter(|p| listed(p)).cloned().collect()
        }
        _ => incoming.iter().map(|f| f.path.clone()).collect(),
    };
    targets.extend(identity_changed.iter().filter(|p| listed(p)).cloned());
    targets
}

fn fetch_all(workspace: &Path, targets: BTreeSet<String>) -> Vec<Command> {
    targets
        .into_iter()
        .map(|file_path| Command::FetchHunks {
            workspace: workspace.to_path_buf(),
            file_path,
        })
        .collect()
}

/// Replaces the live file list and drops state of files that left it.
pub(super) fn apply_file_list(state: &mut SessionState, files: Vec<FileChange>) {
    let live: BTreeSet<String> = files.iter().map(|f| f.path.clone()).collect();
    state.files = files;
    state.files_loaded = true;
    state.hunks.retain(|path, _| live.contains(path));
    state.selected_files.retain(|path| live.contains(path));
    state.revealed_files.retain(|path| live.contains(path));
    state.expansion.retain_files(|path| live.contains(path));
    if state
        .selection
        .selection()
        .is_some_and(|s| !live.contains(&s.file_path))
    {
        state.selection.clear();
    }
}

/// First-time files start loading from the cache; known files re-fetch.
pub(super) fn request_hunks(
    state: &mut SessionState,
    workspace: &Path,
    targets: impl IntoIterator<Item = String>,
) -> Vec<Command> {
    let mut commands = Vec::new();
    for file_path in targets {
        if !state.has_file(&file_path) {
            continue;
        }
        if state.hunks.contains_key(&file_path) {
            commands.push(Command::FetchHunks {
                workspace: workspace.to_path_buf(),
                file_path,
            });
        } else {
            state
                .hunks
                .insert(file_path.clone(), FileHunksEntry::loading(&file_path));
            commands.push(Command::LoadCachedHunks {
                workspace: workspace.to_path_buf(),
                file_path,
            });
        }
    }
    commands
}

pub fn hunk_cache_loaded(
    state: &mut SessionState,
    file_path: String,
    hunks: Option<Vec<DiffHunk>>,
) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    let Some(entry) = state.hunks.get_mut(&file_path) else {
        return Vec::new();
    };
    if let Some(hunks) = hunks
        && entry.is_loading
    {
        log::debug!("Showing cached hunks for {file_path}");
        entry.hunks = hunks;
    }
    vec![Command::FetchHunks {
        workspace,
        file_path,
    }]
}

pub fn hunks_loaded(
    state: &mut SessionState,
    file_path: String,
    result: Result<Vec<DiffHunk>, String>,
) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    let live = state.has_file(&file_path);
    let pending = state
        .reconciler
        .pending_files()
        .is_some_and(|files| files.iter().any(|f| f.path == file_path));
    if !live && !pending {
        log::debug!("Dropping hunks of {file_path}, no longer listed");
        return Vec::new();
    }

    let hunks = match result {
        Ok(hunks) => hunks,
        Err(err) => {
            log::warn!("{err}");
            if let Some(entry) = state.hunks.get(&file_path) {
                let first_failure = entry.error.is_none();
                let previous = entry.hunks.clone();
                state.hunks.insert(
                    file_path.clone(),
                    FileHunksEntry::failed(&file_path, previous, err.clone()),
                );
                if first_failure {
                    state.notify(
                        NotificationLevel::Error,
                        format!("Could not load {file_path}"),
                        err,
                    );
                }
            }
            return Vec::new();
        }
    };

    let review_mode = state.in_review_mode();
    match state
        .reconciler
        .on_file_hunks(review_mode, &state.hunks, &file_path, &hunks)
    {
        Reconciled::Apply if live => apply_file_hunks(state, &workspace, &file_path, hunks),
        Reconciled::Apply => Vec::new(),
        Reconciled::Buffered(_) => {
            log::info!("Hunks of {file_path} changed during review, buffered");
            Vec::new()
        }
        Reconciled::Unchanged => Vec::new(),
    }
}

/// Stores fresh hunks of a live file. Only a real change touches the entry.
pub(super) fn apply_file_hunks(
    state: &mut SessionState,
    workspace: &Path,
    file_path: &str,
    hunks: Vec<DiffHunk>,
) -> Vec<Command> {
    let entry = FileHunksEntry::loaded(file_path, hunks);
    let previous = state.hunks.get(file_path);
    let content_changed = previous.is_none_or(|p| p.hunks != entry.hunks);
    let mut commands = Vec::new();

    if previous != Some(&entry) {
        if content_changed {
            state.expansion.prune_file(file_path, &entry.hunks);
            state.selection.clear_file(file_path);
            commands.push(Command::WriteHunkCache {
                workspace: workspace.to_path_buf(),
                file_path: file_path.to_string(),
                hunks: entry.hunks.clone(),
            });
        }
        state.hunks.insert(file_path.to_string(), entry);
    }

    commands.extend(check_viewed(state, workspace, file_path));
    commands
}

/// Clears the viewed mark of `file_path` when its content moved on.
pub(super) fn check_viewed(
    state: &mut SessionState,
    workspace: &Path,
    file_path: &str,
) -> Vec<Command> {
    let Some(stored) = state.viewed.get(file_path) else {
        return Vec::new();
    };
    let Some(entry) = state.hunks.get(file_path) else {
        return Vec::new();
    };
    if entry.is_loading || entry.error.is_some() {
        return Vec::new();
    }
    if compute_hunks_hash(&entry.hunks) == *stored {
        return Vec::new();
    }

    log::info!("{file_path} changed since it was viewed, clearing the mark");
    state.viewed.remove(file_path);
    vec![Command::UnmarkViewed {
        workspace: workspace.to_path_buf(),
        file_path: file_path.to_string(),
    }]
}
