use super::super::DiffSessionController;
use super::super::action::AsyncAction;
use super::super::command::VcsOperation;
use super::super::expansion::ContextRequest;
use super::spawn;
use std::path::PathBuf;

pub fn run_vcs(controller: &mut DiffSessionController, workspace: PathBuf, operation: VcsOperation) {
    let vcs = controller.collaborators.vcs.clone();
    spawn(controller, async move {
        let ws = workspace.as_path();
        let result = match &operation {
            VcsOperation::Stage(paths) => vcs.stage_files(ws, paths).await,
            VcsOperation::Unstage(paths) => vcs.unstage_files(ws, paths).await,
            VcsOperation::Discard(targets) => vcs.discard_files(ws, targets).await,
            VcsOperation::StageLines {
                file_path,
                selections,
            } => vcs.stage_lines(ws, file_path, selections).await,
            VcsOperation::UnstageLines {
                file_path,
                selections,
            } => vcs.unstage_lines(ws, file_path, selections).await,
            VcsOperation::Commit { message } => vcs.commit(ws, message).await,
            VcsOperation::CommitPaths { message, paths } => {
                vcs.commit_paths(ws, message, paths).await
            }
            VcsOperation::CommitAmend { message } => vcs.commit_amend(ws, message).await,
            VcsOperation::Push => vcs.push(ws).await,
            VcsOperation::Pull => vcs.pull(ws).await,
        }
        .map_err(|e| format!("Failed to {}: {e}", operation.kind().verb()));
        AsyncAction::OperationCompleted { operation, result }
    });
}

pub fn fetch_context_lines(
    controller: &mut DiffSessionController,
    workspace: PathBuf,
    request: ContextRequest,
) {
    let vcs = controller.collaborators.vcs.clone();
    spawn(controller, async move {
        let result = vcs
            .get_file_lines(
                &workspace,
                &request.file_path,
                request.from_parent_revision,
                request.start_line,
                request.end_line,
            )
            .await
            .map_err(|e| format!("Failed to read {}: {e}", request.file_path));
        AsyncAction::ContextLinesLoaded { request, result }
    });
}
