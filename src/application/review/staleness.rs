//! Staleness Reconciler.
//!
//! While the user is composing a review, background refreshes must not swap
//! the diff underneath them. Incoming snapshots are compared against the
//! displayed ones and buffered; the user applies them with an explicit reload.

use crate::domain::{DiffHunk, FileChange, FileHunksEntry, HunkMap, LineComment};
use std::collections::BTreeSet;

/// The four inputs review mode is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewModeInputs {
    pub has_comments: bool,
    pub composer_open: bool,
    pub finish_popover_open: bool,
    pub has_summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    Idle,
    /// A comment box is open.
    Composing,
    /// Comments, a summary or the finish popover exist.
    Reviewing,
}

impl ReviewModeInputs {
    pub fn mode(&self) -> ReviewMode {
        if self.composer_open {
            ReviewMode::Composing
        } else if self.has_comments || self.finish_popover_open || self.has_summary {
            ReviewMode::Reviewing
        } else {
            ReviewMode::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.mode() != ReviewMode::Idle
    }
}

/// Outcome of routing a snapshot through the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// Replace the live view.
    Apply,
    /// Buffered; these paths changed.
    Buffered(BTreeSet<String>),
    /// In review mode and identical to what is displayed.
    Unchanged,
}

/// Snapshots taken out of the buffer by a reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReloadPlan {
    pub files: Option<Vec<FileChange>>,
    pub hunks: Option<HunkMap>,
    pub stale_files: BTreeSet<String>,
}

impl ReloadPlan {
    /// Hunks `file_path` will show after the reload.
    pub fn hunks_for<'a>(&'a self, current: &'a HunkMap, file_path: &str) -> Option<&'a [DiffHunk]> {
        self.hunks
            .as_ref()
            .and_then(|pending| pending.get(file_path))
            .or_else(|| current.get(file_path))
            .map(|entry| entry.hunks.as_slice())
    }

    /// Whether `file_path` is still listed after the reload.
    pub fn has_file(&self, current: &[FileChange], file_path: &str) -> bool {
        self.files
            .as_deref()
            .unwrap_or(current)
            .iter()
            .any(|f| f.path == file_path)
    }

    /// A comment is orphaned when its file or its hunk is gone.
    pub fn is_orphaned(
        &self,
        comment: &LineComment,
        current_files: &[FileChange],
        current_hunks: &HunkMap,
    ) -> bool {
        if !self.has_file(current_files, &comment.file_path) {
            return true;
        }
        match self.hunks_for(current_hunks, &comment.file_path) {
            Some(hunks) => !hunks.iter().any(|h| h.id == comment.hunk_id),
            None => true,
        }
    }
}

/// Paths added, removed, or present in both with a different status.
pub fn changed_files(current: &[FileChange], incoming: &[FileChange]) -> BTreeSet<String> {
    let mut changed = BTreeSet::new();
    for file in incoming {
        match current.iter().find(|f| f.path == file.path) {
            Some(existing) if existing.same_status(file) => {}
            _ => {
                changed.insert(file.path.clone());
            }
        }
    }
    for file in current {
        if !incoming.iter().any(|f| f.path == file.path) {
            changed.insert(file.path.clone());
        }
    }
    changed
}

#[derive(Debug, Clone, Default)]
pub struct StalenessReconciler {
    stale_files: BTreeSet<String>,
    pending_files: Option<Vec<FileChange>>,
    pending_hunks: Option<HunkMap>,
    reloading: bool,
}

impl StalenessReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stale_files(&self) -> &BTreeSet<String> {
        &self.stale_files
    }

    pub fn is_stale(&self, file_path: &str) -> bool {
        self.stale_files.contains(file_path)
    }

    pub fn pending_files(&self) -> Option<&[FileChange]> {
        self.pending_files.as_deref()
    }

    pub fn pending_hunks(&self) -> Option<&HunkMap> {
        self.pending_hunks.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        !self.stale_files.is_empty()
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn clear(&mut self) {
        self.stale_files.clear();
        self.pending_files = None;
        self.pending_hunks = None;
    }

    /// Routes a new file list.
    pub fn on_files_snapshot(
        &mut self,
        review_mode: bool,
        force: bool,
        current: &[FileChange],
        incoming: &[FileChange],
    ) -> Reconciled {
        if !review_mode || force || self.reloading {
            if self.has_pending() {
                log::debug!("Dropping {} buffered stale files", self.stale_files.len());
            }
            self.clear();
            return Reconciled::Apply;
        }

        let changed = changed_files(current, incoming);
        if changed.is_empty() {
            return Reconciled::Unchanged;
        }
        log::debug!("Buffering file list, changed: {changed:?}");
        self.stale_files.extend(changed.iter().cloned());
        self.pending_files = Some(incoming.to_vec());
        Reconciled::Buffered(changed)
    }

    /// Routes freshly fetched hunks of `file_path`.
    ///
    /// In review mode the complete hunk map is buffered, seeded from the live
    /// map, so a reload replaces it wholesale. A file still loading its first
    /// hunks has nothing on screen to protect and is always applied.
    pub fn on_file_hunks(
        &mut self,
        review_mode: bool,
        current: &HunkMap,
        file_path: &str,
        hunks: &[DiffHunk],
    ) -> Reconciled {
        let first_load = current.get(file_path).is_some_and(|entry| entry.is_loading);
        if !review_mode || self.reloading || first_load {
            if let Some(pending) = self.pending_hunks.as_mut() {
                pending.insert(
                    file_path.to_string(),
                    FileHunksEntry::loaded(file_path, hunks.to_vec()),
                );
            }
            return Reconciled::Apply;
        }

        let displayed = current.get(file_path).map(|entry| entry.hunks.as_slice());
        let pending = self
            .pending_hunks
            .get_or_insert_with(|| current.clone());
        pending.insert(
            file_path.to_string(),
            FileHunksEntry::loaded(file_path, hunks.to_vec()),
        );

        if displayed == Some(hunks) {
            return Reconciled::Unchanged;
        }
        log::debug!("Buffering changed hunks of {file_path}");
        self.stale_files.insert(file_path.to_string());
        Reconciled::Buffered(BTreeSet::from([file_path.to_string()]))
    }

    /// Takes the buffers for an explicit reload and suppresses buffering until
    /// [`Self::finish_reload`].
    pub fn begin_reload(&mut self) -> ReloadPlan {
        self.reloading = true;
        ReloadPlan {
            files: self.pending_files.take(),
            hunks: self.pending_hunks.take(),
            stale_files: std::mem::take(&mut self.stale_files),
        }
    }

    pub fn finish_reload(&mut self) {
        self.reloading = false;
    }
}
