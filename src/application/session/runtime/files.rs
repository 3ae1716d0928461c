use super::super::DiffSessionController;
use super::super::action::AsyncAction;
use super::super::command::RefreshReason;
use super::{HUNKS_CACHE, spawn, spawn_ordered};
use crate::domain::DiffHunk;
use std::path::PathBuf;

pub fn load_files(
    controller: &mut DiffSessionController,
    workspace: PathBuf,
    reason: RefreshReason,
    force: bool,
) {
    let vcs = controller.collaborators.vcs.clone();
    spawn(controller, async move {
        let result = vcs
            .list_changed_files(&workspace)
            .await
            .map_err(|e| format!("Failed to list changed files: {e}"));
        AsyncAction::FilesLoaded {
            reason,
            force,
            result,
        }
    });
}

/// Queued behind cache writes. Unreadable cache entries count as a miss.
pub fn load_cached_hunks(controller: &mut DiffSessionController, workspace: PathBuf, file_path: String) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let hunks = match store
            .get_cache(&workspace, HUNKS_CACHE, Some(&file_path))
            .await
        {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<DiffHunk>>(&blob) {
                Ok(hunks) => Some(hunks),
                Err(e) => {
                    log::debug!("Ignoring unreadable hunk cache for {file_path}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::debug!("Hunk cache read failed for {file_path}: {e}");
                None
            }
        };
        AsyncAction::HunkCacheLoaded { file_path, hunks }
    });
}

pub fn fetch_hunks(controller: &mut DiffSessionController, workspace: PathBuf, file_path: String) {
    let vcs = controller.collaborators.vcs.clone();
    spawn(controller, async move {
        let result = vcs
            .get_file_hunks(&workspace, &file_path)
            .await
            .map_err(|e| format!("Failed to load hunks for {file_path}: {e}"));
        AsyncAction::HunksLoaded { file_path, result }
    });
}

pub fn write_hunk_cache(
    controller: &mut DiffSessionController,
    workspace: PathBuf,
    file_path: String,
    hunks: Vec<DiffHunk>,
) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = async {
            let blob = serde_json::to_string(&hunks)?;
            store
                .set_cache(&workspace, HUNKS_CACHE, Some(&file_path), &blob)
                .await
        }
        .await
        .map_err(|e| format!("Failed to cache hunks for {file_path}: {e}"));
        AsyncAction::CacheUpdated(result)
    });
}

pub fn invalidate_hunk_cache(
    controller: &mut DiffSessionController,
    workspace: PathBuf,
    paths: Option<Vec<String>>,
) {
    let store = controller.collaborators.store.clone();
    spawn_ordered(controller, async move {
        let result = async {
            match paths {
                Some(paths) => {
                    for path in paths {
                        store
                            .invalidate_cache(&workspace, HUNKS_CACHE, Some(&path))
                            .await?;
                    }
                }
                None => store.invalidate_cache(&workspace, HUNKS_CACHE, None).await?,
            }
            anyhow::Ok(())
        }
        .await
        .map_err(|e| format!("Failed to invalidate hunk cache: {e}"));
        AsyncAction::CacheUpdated(result)
    });
}
