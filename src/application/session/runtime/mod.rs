pub mod files;
pub mod operations;
pub mod review;


use super::DiffSessionController;
use super::action::{Action, AsyncAction};
use super::command::Command;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Cache type under which per-file hunks are stored.
pub const HUNKS_CACHE: &str = "hunks";

pub fn run(controller: &mut DiffSessionController, command: Command) {
    if controller.skip_runtime {
        return;
    }
    match command {
        Command::LoadFiles {
            workspace,
            reason,
            force,
        } => files::load_files(controller, workspace, reason, force),
        Command::LoadCachedHunks {
            workspace,
            file_path,
        } => files::load_cached_hunks(controller, workspace, file_path),
        Command::FetchHunks {
            workspace,
            file_path,
        } => files::fetch_hunks(controller, workspace, file_path),
        Command::WriteHunkCache {
            workspace,
            file_path,
            hunks,
        } => files::write_hunk_cache(controller, workspace, file_path, hunks),
        Command::InvalidateHunkCache { workspace, paths } => {
            files::invalidate_hunk_cache(controller, workspace, paths)
        }
        Command::LoadViewed { workspace } => review::load_viewed(controller, workspace),
        Command::MarkViewed {
            workspace,
            file_path,
            content_hash,
        } => review::mark_viewed(controller, workspace, file_path, content_hash),
        Command::UnmarkViewed {
            workspace,
            file_path,
        } => review::unmark_viewed(controller, workspace, file_path),
        Command::LoadPendingReview {
            repo_path,
            workspace_id,
        } => review::load_pending_review(controller, repo_path, workspace_id),
        Command::SavePendingReview {
            repo_path,
            workspace_id,
            comments,
        } => review::save_pending_review(controller, repo_path, workspace_id, comments),
        Command::ClearPendingReview {
            repo_path,
            workspace_id,
        } => review::clear_pending_review(controller, repo_path, workspace_id),
        Command::RunVcs {
            workspace,
            operation,
        } => operations::run_vcs(controller, workspace, operation),
        Command::FetchContextLines { workspace, request } => {
            operations::fetch_context_lines(controller, workspace, request)
        }
        Command::InjectReview {
            workspace_id,
            markdown,
        } => review::inject_review(controller, workspace_id, markdown),
    }
}

type StoreTask = Pin<Box<dyn Future<Output = AsyncAction> + Send>>;

/// A store call waiting for the writes queued before it, with its generation.
pub(super) type StoreWrite = (u64, StoreTask);

/// Runs `task` on the tokio runtime and feeds its result back as an action.
pub(super) fn spawn<F>(controller: &mut DiffSessionController, task: F)
where
    F: Future<Output = AsyncAction> + Send + 'static,
{
    controller.in_flight += 1;
    let generation = controller.state.generation;
    let tx = controller.action_tx.clone();
    tokio::spawn(async move {
        let action = task.await;
        if tx.send(Action::Async { generation, action }).await.is_err() {
            log::debug!("Session closed before a result arrived");
        }
    });
}

/// Like [`spawn`], but `task` only starts once every store call queued before
/// it has finished, so writes land in the order they were issued.
pub(super) fn spawn_ordered<F>(controller: &mut DiffSessionController, task: F)
where
    F: Future<Output = AsyncAction> + Send + 'static,
{
    let generation = controller.state.generation;
    let action_tx = controller.action_tx.clone();
    let queue = controller
        .store_writes
        .get_or_insert_with(|| start_store_writer(action_tx));
    let task: StoreTask = Box::pin(task);
    match queue.send((generation, task)) {
        Ok(()) => controller.in_flight += 1,
        Err(_) => log::warn!("Store writer stopped, dropping a write"),
    }
}

fn start_store_writer(action_tx: mpsc::Sender<Action>) -> mpsc::UnboundedSender<StoreWrite> {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<StoreWrite>();
    tokio::spawn(async move {
        while let Some((generation, task)) = queue_rx.recv().await {
            let action = task.await;
            if action_tx.send(Action::Async { generation, action }).await.is_err() {
                log::debug!("Session closed before a store write finished");
                break;
            }
        }
    });
    queue_tx
}
