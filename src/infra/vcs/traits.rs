use crate::domain::{DiffHunk, DiscardTarget, FileLines, LineComment};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A file the user marked as viewed, with the fingerprint of what they saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedFile {
    pub path: String,
    pub content_hash: String,
}

/// Lines of one hunk picked for line-level staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLineSelection {
    pub hunk: DiffHunk,
    pub line_indices: Vec<usize>,
}

/// Version-control operations, executed against a working tree.
///
/// Mutating operations return the tool's human-readable output.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Raw status lines: a two-character code followed by the path.
    async fn list_changed_files(&self, workspace: &Path) -> Result<Vec<String>>;
    async fn get_file_hunks(&self, workspace: &Path, file_path: &str) -> Result<Vec<DiffHunk>>;
    async fn get_file_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        from_parent_revision: bool,
        start_line: u32,
        end_line: u32,
    ) -> Result<FileLines>;
    async fn stage_files(&self, workspace: &Path, paths: &[String]) -> Result<String>;
    async fn unstage_files(&self, workspace: &Path, paths: &[String]) -> Result<String>;
    async fn discard_files(&self, workspace: &Path, targets: &[DiscardTarget]) -> Result<String>;
    async fn stage_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        selections: &[HunkLineSelection],
    ) -> Result<String>;
    async fn unstage_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        selections: &[HunkLineSelection],
    ) -> Result<String>;
    async fn commit(&self, workspace: &Path, message: &str) -> Result<String>;
    /// Commits exactly `paths`, leaving other staged changes staged.
    async fn commit_paths(&self, workspace: &Path, message: &str, paths: &[String])
    -> Result<String>;
    async fn commit_amend(&self, workspace: &Path, message: &str) -> Result<String>;
    async fn push(&self, workspace: &Path) -> Result<String>;
    async fn pull(&self, workspace: &Path) -> Result<String>;
}

/// Persistent per-workspace state: viewed marks, blob cache, pending review.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_viewed_files(&self, workspace: &Path) -> Result<Vec<ViewedFile>>;
    async fn mark_file_viewed(
        &self,
        workspace: &Path,
        file_path: &str,
        content_hash: &str,
    ) -> Result<()>;
    async fn unmark_file_viewed(&self, workspace: &Path, file_path: &str) -> Result<()>;

    async fn get_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key: Option<&str>,
    ) -> Result<Option<String>>;
    async fn set_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key: Option<&str>,
        value: &str,
    ) -> Result<()>;
    /// Drops one key, or every key of `cache_type` when `key` is `None`.
    async fn invalidate_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key: Option<&str>,
    ) -> Result<()>;

    async fn load_pending_review(
        &self,
        repo_path: &Path,
        workspace_id: &str,
    ) -> Result<Vec<LineComment>>;
    async fn save_pending_review(
        &self,
        repo_path: &Path,
        workspace_id: &str,
        comments: &[LineComment],
    ) -> Result<()>;
    async fn clear_pending_review(&self, repo_path: &Path, workspace_id: &str) -> Result<()>;
}

/// Destination for a finished review, e.g. an agent's terminal session.
#[async_trait]
pub trait TerminalSink: Send + Sync {
    async fn inject(&self, workspace_id: &str, text: &str) -> Result<()>;
}

/// Everything the session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub vcs: Arc<dyn VcsBackend>,
    pub store: Arc<dyn SessionStore>,
    pub terminal: Arc<dyn TerminalSink>,
}

impl Collaborators {
    pub fn new(
        vcs: Arc<dyn VcsBackend>,
        store: Arc<dyn SessionStore>,
        terminal: Arc<dyn TerminalSink>,
    ) -> Self {
        Self {
            vcs,
            store,
            terminal,
        }
    }
}
