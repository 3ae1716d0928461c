//! Owned state of one diff session.
//!
//! Only the reducer mutates this; views read it through the accessors.

use super::expansion::ExpansionState;
use super::gates::{DiffGates, compute_gates};
use crate::application::review::{
    LineSelectionEngine, ReviewAnnotationStore, ReviewModeInputs, StalenessReconciler,
};
use crate::domain::{CommentDraft, FileChange, FileHunksEntry, HunkMap, LineComment, Workspace};
use crate::infra::app_config::SessionConfig;
use crate::infra::diff::{LineNumbers, compute_line_numbers};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A dismissible, non-blocking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub config: SessionConfig,
    pub workspace: Option<Workspace>,
    /// Bumped on every workspace switch.
    pub generation: u64,
    pub focused: bool,

    pub files: Vec<FileChange>,
    pub files_loaded: bool,
    pub is_loading_files: bool,
    pub files_error: Option<String>,
    pub hunks: HunkMap,

    /// Viewed files and the content hash they were marked with.
    pub viewed: BTreeMap<String, String>,
    /// Explicit multi-selection in the file list.
    pub selected_files: BTreeSet<String>,
    pub revealed_files: BTreeSet<String>,
    pub changeset_revealed: bool,
    pub expansion: ExpansionState,

    pub annotations: ReviewAnnotationStore,
    pub selection: LineSelectionEngine,
    pub reconciler: StalenessReconciler,
    pub draft: Option<CommentDraft>,
    pub composer_open: bool,
    pub finish_popover_open: bool,
    pub summary: String,
    pub is_submitting_review: bool,

    pub operations_in_flight: usize,
    pub notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            focused: true,
            ..Default::default()
        }
    }

    pub fn review_mode_inputs(&self) -> ReviewModeInputs {
        ReviewModeInputs {
            has_comments: !self.annotations.is_empty(),
            composer_open: self.composer_open,
            finish_popover_open: self.finish_popover_open,
            has_summary: !self.summary.trim().is_empty(),
        }
    }

    pub fn in_review_mode(&self) -> bool {
        self.review_mode_inputs().is_active()
    }

    pub fn comments(&self) -> &[LineComment] {
        self.annotations.comments()
    }

    pub fn file(&self, path: &str) -> Option<&FileChange> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    pub fn hunks_entry(&self, path: &str) -> Option<&FileHunksEntry> {
        self.hunks.get(path)
    }

    /// Old/new line numbers of every line of one displayed hunk.
    pub fn line_numbers(&self, path: &str, hunk_index: usize) -> Option<Vec<LineNumbers>> {
        let hunk = self.hunks.get(path)?.hunks.get(hunk_index)?;
        Some(compute_line_numbers(hunk))
    }

    pub fn is_viewed(&self, path: &str) -> bool {
        self.viewed.contains_key(path)
    }

    pub fn stale_files(&self) -> &BTreeSet<String> {
        self.reconciler.stale_files()
    }

    pub fn gates(&self) -> DiffGates {
        compute_gates(
            &self.files,
            &self.hunks,
            &self.config,
            &self.revealed_files,
            self.changeset_revealed,
        )
    }

    /// Selected files in file-list order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| self.selected_files.contains(&f.path))
            .map(|f| f.path.clone())
            .collect()
    }

    pub fn notify(
        &mut self,
        level: NotificationLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> u64 {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push(Notification {
            id,
            level,
            title: title.into(),
            description: description.into(),
        });
        id
    }

    pub fn dismiss_notification(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Drops everything tied to the current workspace. Results still in
    /// flight for it are ignored once they arrive.
    pub fn reset_workspace_state(&mut self) {
        self.generation += 1;
        self.files.clear();
        self.files_loaded = false;
        self.is_loading_files = false;
        self.files_error = None;
        self.hunks.clear();
        self.viewed.clear();
        self.selected_files.clear();
        self.revealed_files.clear();
        self.changeset_revealed = false;
        self.expansion.clear();
        self.annotations.clear();
        self.selection.clear();
        self.reconciler.clear();
        self.draft = None;
        self.composer_open = false;
        self.finish_popover_open = false;
        self.summary.clear();
        self.is_submitting_review = false;
        self.operations_in_flight = 0;
    }
}
