//! Event loop around a [`DiffSessionController`].

use super::DiffSessionController;
use super::action::{Action, SessionAction};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Notifications delivered from outside the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    FilesChanged {
        workspace_id: String,
        paths: Vec<String>,
    },
    FocusChanged {
        focused: bool,
    },
    /// Any user action, forwarded as-is.
    Dispatch(Box<Action>),
}

impl From<SessionEvent> for Action {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::FilesChanged {
                workspace_id,
                paths,
            } => Action::Session(SessionAction::FilesChanged {
                workspace_id,
                paths,
            }),
            SessionEvent::FocusChanged { focused } => {
                Action::Session(SessionAction::FocusChanged { focused })
            }
            SessionEvent::Dispatch(action) => *action,
        }
    }
}

pub struct SessionDriver {
    controller: DiffSessionController,
}

impl SessionDriver {
    pub fn new(controller: DiffSessionController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &DiffSessionController {
        &self.controller
    }

    /// Runs until `cancel` fires, or until the event sender is dropped and
    /// outstanding work has settled, then hands the controller back.
    ///
    /// The first timer tick is skipped; the caller mounts the session.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        cancel: CancellationToken,
    ) -> DiffSessionController {
        let period = self.controller.state.config.poll_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        log::debug!("Session driver started, polling every {period:?}");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("Session driver cancelled");
                    break;
                }
                processed = self.controller.process_next() => {
                    if !processed || (!events_open && self.controller.in_flight() == 0) {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.controller.dispatch(Action::Session(SessionAction::TimerTick));
                }
                event = events.recv(), if events_open => match event {
                    Some(event) => self.controller.dispatch(event.into()),
                    None => {
                        events_open = false;
                        if self.controller.in_flight() == 0 {
                            break;
                        }
                    }
                },
            }
        }
        self.controller
    }
}
