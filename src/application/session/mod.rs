//! Diff Session Controller.
//!
//! Reducer-style state updates plus side-effect commands: `dispatch` runs the
//! pure reducer over [`SessionState`], and every returned [`Command`] is
//! executed on a tokio task whose single result comes back as an
//! [`AsyncAction`] over the action channel.

mod action;
mod command;
pub mod driver;
pub mod expansion;
pub mod gates;
mod reducer;
mod runtime;
pub mod state;

pub use action::{Action, AsyncAction, DiffAction, FileAction, ReviewAction, SessionAction};
pub use command::{Command, RefreshReason, VcsOperation, VcsOperationKind};
pub use driver::{SessionDriver, SessionEvent};
pub use expansion::{ContextBlock, ContextRequest, ExpansionSide, HunkExpansion};
pub use gates::DiffGates;
pub use runtime::HUNKS_CACHE;
pub use state::{Notification, NotificationLevel, SessionState};

use crate::domain::Workspace;
use crate::infra::app_config::SessionConfig;
use crate::infra::vcs::Collaborators;
use tokio::sync::mpsc;

const ACTION_CHANNEL_CAPACITY: usize = 64;

pub struct DiffSessionController {
    pub state: SessionState,
    collaborators: Collaborators,
    action_tx: mpsc::Sender<Action>,
    action_rx: mpsc::Receiver<Action>,
    /// Spawned commands whose result has not been dispatched yet.
    in_flight: usize,
    /// Single worker running store calls in issue order; started on first use.
    store_writes: Option<mpsc::UnboundedSender<runtime::StoreWrite>>,
    /// Drop commands instead of running them.
    pub skip_runtime: bool,
}

impl DiffSessionController {
    pub fn new(collaborators: Collaborators, config: SessionConfig) -> Self {
        let (action_tx, action_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
        Self {
            state: SessionState::new(config),
            collaborators,
            action_tx,
            action_rx,
            in_flight: 0,
            store_writes: None,
            skip_runtime: false,
        }
    }

    /// Binds the session to `workspace` and starts the first fetch cycle.
    pub fn open(&mut self, workspace: Workspace) {
        self.dispatch(Action::Session(SessionAction::WorkspaceChanged(workspace)));
    }

    pub fn dispatch(&mut self, action: Action) {
        let commands = reducer::reduce(&mut self.state, action);
        for command in commands {
            runtime::run(self, command);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Dispatches every result that has already arrived. Returns whether any did.
    pub fn poll_action_messages(&mut self) -> bool {
        let mut any = false;
        while let Ok(action) = self.action_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(action);
            any = true;
        }
        any
    }

    /// Waits for the next result and dispatches it.
    pub async fn process_next(&mut self) -> bool {
        match self.action_rx.recv().await {
            Some(action) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Runs until no spawned command is outstanding, including the ones
    /// spawned while handling results.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.process_next().await {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests;
