use super::super::action::SessionAction;
use super::super::command::{Command, RefreshReason};
use super::super::state::SessionState;
use super::load_files;

pub fn reduce(state: &mut SessionState, action: SessionAction) -> Vec<Command> {
    match action {
        SessionAction::Mount => mount(state),
        SessionAction::WorkspaceChanged(workspace) => {
            if state.workspace.as_ref() == Some(&workspace) {
                return Vec::new();
            }
            log::info!("Switching to workspace {}", workspace.path.display());
            state.reset_workspace_state();
            state.workspace = Some(workspace);
            mount(state)
        }
        SessionAction::FocusChanged { focused } => {
            let regained = focused && !state.focused;
            state.focused = focused;
            if regained {
                load_files(state, RefreshReason::Focus, false)
            } else {
                Vec::new()
            }
        }
        SessionAction::FilesChanged {
            workspace_id,
            paths,
        } => {
            let ours = state
                .workspace
                .as_ref()
                .is_some_and(|w| w.id == workspace_id);
            if !ours {
                log::debug!("Ignoring file events for workspace {workspace_id}");
                return Vec::new();
            }
            load_files(state, RefreshReason::FilesChanged(paths), false)
        }
        SessionAction::TimerTick => load_files(state, RefreshReason::Timer, false),
        SessionAction::Refresh { force } => load_files(state, RefreshReason::Manual, force),
        SessionAction::DismissNotification(id) => {
            state.dismiss_notification(id);
            Vec::new()
        }
    }
}

fn mount(state: &mut SessionState) -> Vec<Command> {
    let Some(workspace) = state.workspace.clone() else {
        return Vec::new();
    };
    let mut commands = load_files(state, RefreshReason::Mount, false);
    commands.push(Command::LoadViewed {
        workspace: workspace.path.clone(),
    });
    commands.push(Command::LoadPendingReview {
        repo_path: workspace.repo_path.clone(),
        workspace_id: workspace.id.clone(),
    });
    commands
}
