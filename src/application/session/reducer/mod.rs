pub mod async_handler;
pub mod diff;
pub mod fetch;
pub mod files;
pub mod review;
pub mod session;

use super::action::Action;
use super::command::{Command, RefreshReason};
use super::state::{NotificationLevel, SessionState};
use crate::domain::{CollaboratorError, SessionError, ValidationError};
use std::path::PathBuf;

pub fn reduce(state: &mut SessionState, action: Action) -> Vec<Command> {
    match action {
        Action::Session(action) => session::reduce(state, action),
        Action::Files(action) => files::reduce(state, action),
        Action::Diff(action) => diff::reduce(state, action),
        Action::Review(action) => review::reduce(state, action),
        Action::Async { generation, action } => async_handler::reduce(state, generation, action),
    }
}

pub(super) fn workspace_path(state: &SessionState) -> Option<PathBuf> {
    state.workspace.as_ref().map(|w| w.path.clone())
}

pub(super) fn load_files(state: &mut SessionState, reason: RefreshReason, force: bool) -> Vec<Command> {
    let Some(workspace) = workspace_path(state) else {
        return Vec::new();
    };
    state.is_loading_files = true;
    vec![Command::LoadFiles {
        workspace,
        reason,
        force,
    }]
}

pub(super) fn save_pending_review(state: &SessionState) -> Vec<Command> {
    let Some(workspace) = &state.workspace else {
        return Vec::new();
    };
    vec![Command::SavePendingReview {
        repo_path: workspace.repo_path.clone(),
        workspace_id: workspace.id.clone(),
        comments: state.comments().to_vec(),
    }]
}

pub(super) fn reject(state: &mut SessionState, err: ValidationError) -> Vec<Command> {
    log::debug!("Rejected locally: {err}");
    let err = SessionError::from(err);
    state.notify(NotificationLevel::Error, err.title(), err.description());
    Vec::new()
}

pub(super) fn report_failure(state: &mut SessionState, operation: &str, message: String) {
    log::warn!("{operation} failed: {message}");
    let err = SessionError::from(CollaboratorError::new(operation, message));
    state.notify(NotificationLevel::Error, err.title(), err.description());
}
