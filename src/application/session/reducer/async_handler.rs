use super::super::action::AsyncAction;
use super::super::command::Command;
use super::super::state::SessionState;
use super::fetch::{check_viewed, files_loaded, hunk_cache_loaded, hunks_loaded};
use super::files::operation_completed;
use super::review::review_sent;
use super::{report_failure, workspace_path};
use crate::application::review::ReviewAnnotationStore;

pub fn reduce(state: &mut SessionState, generation: u64, action: AsyncAction) -> Vec<Command> {
    if generation != state.generation {
        log::debug!(
            "Dropping a result of generation {generation}, session is at {}",
            state.generation
        );
        return Vec::new();
    }
    match action {
        AsyncAction::FilesLoaded {
            reason,
            force,
            result,
        } => files_loaded(state, reason, force, result),
        AsyncAction::HunkCacheLoaded { file_path, hunks } => {
            hunk_cache_loaded(state, file_path, hunks)
        }
        AsyncAction::HunksLoaded { file_path, result } => hunks_loaded(state, file_path, result),
        AsyncAction::CacheUpdated(result) => {
            if let Err(err) = result {
                log::warn!("{err}");
            }
            Vec::new()
        }
        AsyncAction::ViewedLoaded(result) => match result {
            Ok(viewed) => {
                state.viewed = viewed
                    .into_iter()
                    .map(|v| (v.path, v.content_hash))
                    .collect();
                let Some(workspace) = workspace_path(state) else {
                    return Vec::new();
                };
                let paths: Vec<String> = state.viewed.keys().cloned().collect();
                paths
                    .iter()
                    .flat_map(|path| check_viewed(state, &workspace, path))
                    .collect()
            }
            Err(err) => {
                report_failure(state, "Load viewed files", err);
                Vec::new()
            }
        },
        AsyncAction::ViewedSaved(result) => {
            if let Err(err) = result {
                report_failure(state, "Update viewed files", err);
            }
            Vec::new()
        }
        AsyncAction::PendingReviewLoaded(result) => {
            match result {
                Ok(comments) if state.annotations.is_empty() && !comments.is_empty() => {
                    log::info!("Restored {} pending review comments", comments.len());
                    state.annotations = ReviewAnnotationStore::from_comments(comments);
                }
                Ok(_) => {}
                Err(err) => report_failure(state, "Load pending review", err),
            }
            Vec::new()
        }
        AsyncAction::PendingReviewSaved(result) => {
            if let Err(err) = result {
                report_failure(state, "Save pending review", err);
            }
            Vec::new()
        }
        AsyncAction::OperationCompleted { operation, result } => {
            operation_completed(state, operation, result)
        }
        AsyncAction::ContextLinesLoaded { request, result } => {
            match result {
                Ok(lines) => state.expansion.apply(&request, lines),
                Err(err) => {
                    state.expansion.fail(&request);
                    report_failure(state, "Load context lines", err);
                }
            }
            Vec::new()
        }
        AsyncAction::ReviewSent(result) => review_sent(state, result),
    }
}
