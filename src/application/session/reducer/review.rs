//! Comments, summary, submission and the explicit stale reload.

use super::super::action::ReviewAction;
use super::super::command::{Command, RefreshReason};
use super::super::state::{NotificationLevel, SessionState};
use super::fetch::{apply_file_hunks, apply_file_list, request_hunks};
use super::{load_files, reject, report_failure, save_pending_review, workspace_path};
use crate::application::review::{ReloadPlan, ReviewExporter};
use crate::domain::ValidationError;

pub fn reduce(state: &mut SessionState, action: ReviewAction) -> Vec<Command> {
    match action {
        ReviewAction::CancelComposer => {
            state.composer_open = false;
            state.draft = None;
            Vec::new()
        }
        ReviewAction::SubmitComment { text } => {
            match state.annotations.add_comment(state.draft.as_ref(), &text) {
                Ok(comment) => {
                    log::debug!("Added comment {} on {}", comment.id, comment.location());
                    state.draft = None;
                    state.composer_open = false;
                    state.selection.clear();
                    save_pending_review(state)
                }
                Err(err) => reject(state, err),
            }
        }
        ReviewAction::EditComment { id, text } => {
            if text.trim().is_empty() {
                return reject(state, ValidationError::EmptyComment);
            }
            if state.annotations.edit_comment(&id, &text) {
                save_pending_review(state)
            } else {
                Vec::new()
            }
        }
        ReviewAction::DeleteComment { id } => {
            if state.annotations.delete_comment(&id).is_some() {
                save_pending_review(state)
            } else {
                Vec::new()
            }
        }
        ReviewAction::SetSummary(summary) => {
            state.summary = summary;
            Vec::new()
        }
        ReviewAction::SetFinishPopover(open) => {
            state.finish_popover_open = open;
            Vec::new()
        }
        ReviewAction::SubmitReview => submit_review(state),
        ReviewAction::ReloadStale => reload_stale(state),
    }
}

fn submit_review(state: &mut SessionState) -> Vec<Command> {
    if state.annotations.is_empty() && state.summary.trim().is_empty() {
        return reject(state, ValidationError::EmptyReview);
    }
    if state.is_submitting_review {
        return Vec::new();
    }
    let Some(workspace) = &state.workspace else {
        return Vec::new();
    };
    let markdown = ReviewExporter::format_as_markdown(state.comments(), &state.summary);
    let workspace_id = workspace.id.clone();
    state.is_submitting_review = true;
    vec![Command::InjectReview {
        workspace_id,
        markdown,
    }]
}

pub fn review_sent(state: &mut SessionState, result: Result<(), String>) -> Vec<Command> {
    state.is_submitting_review = false;
    if let Err(err) = result {
        report_failure(state, "Send review", err);
        return Vec::new();
    }

    log::info!("Review sent with {} comments", state.annotations.len());
    state.annotations.clear();
    state.summary.clear();
    state.finish_popover_open = false;
    state.composer_open = false;
    state.draft = None;
    state.notify(NotificationLevel::Success, "Review sent", "");

    let mut commands = Vec::new();
    if let Some(workspace) = &state.workspace {
        commands.push(Command::ClearPendingReview {
            repo_path: workspace.repo_path.clone(),
            workspace_id: workspace.id.clone(),
        });
    }
    // Anything buffered during the review is applied by the next refresh.
    commands.extend(load_files(state, RefreshReason::AfterReview, false));
    commands
}

/// Applies the buffered snapshots, moving comments that lost their anchor
/// into the summary.
pub fn reload_stale(state: &mut SessionState) -> Vec<Command> {
    if !state.reconciler.has_pending() {
        return Vec::new();
    }
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };

    let plan = state.reconciler.begin_reload();
    let orphans = {
        let files = &state.files;
        let hunks = &state.hunks;
        state
            .annotations
            .take_orphans(|comment| plan.is_orphaned(comment, files, hunks))
    };
    if !orphans.is_empty() {
        state.summary = ReviewExporter::append_outdated_to_summary(&state.summary, &orphans);
        state.notify(
            NotificationLevel::Info,
            "Outdated comments moved",
            format!("{} comments moved to the summary", orphans.len()),
        );
    }

    let ReloadPlan {
        files,
        hunks,
        stale_files,
    } = plan;
    if let Some(files) = files {
        apply_file_list(state, files);
    }

    let mut commands = Vec::new();
    if let Some(pending) = hunks {
        for (path, entry) in pending {
            if state.has_file(&path) && entry.error.is_none() {
                commands.extend(apply_file_hunks(state, &workspace, &path, entry.hunks));
            }
        }
    }
    let missing: Vec<String> = state
        .files
        .iter()
        .filter(|f| !state.hunks.contains_key(&f.path))
        .map(|f| f.path.clone())
        .collect();
    commands.extend(request_hunks(state, &workspace, missing));

    state.reconciler.finish_reload();
    state.selection.clear();
    if !orphans.is_empty() {
        commands.extend(save_pending_review(state));
    }

    log::info!(
        "Reloaded {} stale files, {} comments moved to summary",
        stale_files.len(),
        orphans.len()
    );
    commands
}
