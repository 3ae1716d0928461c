use super::super::DiffSessionController;
use super::super::action::AsyncAction;
use super::{spawn, spawn_ordered};
use crate::domain::LineComment;
use std::path::PathBuf;

pub fn load_viewed(controller: &mut DiffSessionController, workspace: PathBuf) {
    let store = controller.collaborators.store.clone();
    spawn(controller, async move {
        let result = store
            .get_viewed_files(&workspace)
            .await
            .map_err(|e| format!("Failed to load viewed files: {e}"));
        AsyncAction::ViewedLoaded(result)
    });
}

pub fn mark_viewed(
    controller: &mut DiffSessionController,
    workspace: PathBuf,
    file_path: String,
    content_hash: String,
) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = store
            .mark_file_viewed(&workspace, &file_path, &content_hash)
            .await
            .map_err(|e| format!("Failed to mark {file_path} viewed: {e}"));
        AsyncAction::ViewedSaved(result)
    });
}

pub fn unmark_viewed(controller: &mut DiffSessionController, workspace: PathBuf, file_path: String) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = store
            .unmark_file_viewed(&workspace, &file_path)
            .await
            .map_err(|e| format!("Failed to unmark {file_path}: {e}"));
        AsyncAction::ViewedSaved(result)
    });
}

pub fn load_pending_review(
    controller: &mut DiffSessionController,
    repo_path: PathBuf,
    workspace_id: String,
) {
    let store = controller.collaborators.store.clone();
    spawn(controller, async move {
        let result = store
            .load_pending_review(&repo_path, &workspace_id)
            .await
            .map_err(|e| format!("Failed to load pending review: {e}"));
        AsyncAction::PendingReviewLoaded(result)
    });
}

pub fn save_pending_review(
    controller: &mut DiffSessionController,
    repo_path: PathBuf,
    workspace_id: String,
    comments: Vec<LineComment>,
) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = store
            .save_pending_review(&repo_path, &workspace_id, &comments)
            .await
            .map_err(|e| format!("Failed to save pending review: {e}"));
        AsyncAction::PendingReviewSaved(result)
    });
}

pub fn clear_pending_review(
    controller: &mut DiffSessionController,
    repo_path: PathBuf,
    workspace_id: String,
) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = store
            .clear_pending_review(&repo_path, &workspace_id)
            .await
            .map_err(|e| format!("Failed to clear pending review: {e}"));
        AsyncAction::PendingReviewSaved(result)
    });
}

pub fn inject_review(controller: &mut DiffSessionController, workspace_id: String, markdown: String) {
    let terminal = controller.collaborators.terminal.clone();
    spawn(controller, async move {
        let result = terminal
            .inject(&workspace_id, &markdown)
            .await
            .map_err(|e| format!("Failed to send review: {e}"));
        AsyncAction::ReviewSent(result)
    });
}
