use super::expansion::ContextRequest;
use crate::domain::{DiffHunk, DiscardTarget, LineComment};
use crate::infra::vcs::HunkLineSelection;
use std::path::PathBuf;

/// Why a file-list refresh was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReason {
    Mount,
    Focus,
    Timer,
    /// External notification naming changed paths.
    FilesChanged(Vec<String>),
    AfterOperation,
    AfterReview,
    Manual,
}

/// A version-control mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOperation {
    Stage(Vec<String>),
    Unstage(Vec<String>),
    Discard(Vec<DiscardTarget>),
    StageLines {
        file_path: String,
        selections: Vec<HunkLineSelection>,
    },
    UnstageLines {
        file_path: String,
        selections: Vec<HunkLineSelection>,
    },
    Commit {
        message: String,
    },
    /// Commits exactly `paths`.
    CommitPaths {
        message: String,
        paths: Vec<String>,
    },
    CommitAmend {
        message: String,
    },
    Push,
    Pull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOperationKind {
    Stage,
    Unstage,
    Discard,
    Commit,
    Amend,
    Push,
    Pull,
}

impl VcsOperationKind {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Unstage => "unstage",
            Self::Discard => "discard",
            Self::Commit => "commit",
            Self::Amend => "amend",
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }
}

impl VcsOperation {
    pub fn kind(&self) -> VcsOperationKind {
        match self {
            Self::Stage(_) | Self::StageLines { .. } => VcsOperationKind::Stage,
            Self::Unstage(_) | Self::UnstageLines { .. } => VcsOperationKind::Unstage,
            Self::Discard(_) => VcsOperationKind::Discard,
            Self::Commit { .. } | Self::CommitPaths { .. } => VcsOperationKind::Commit,
            Self::CommitAmend { .. } => VcsOperationKind::Amend,
            Self::Push => VcsOperationKind::Push,
            Self::Pull => VcsOperationKind::Pull,
        }
    }

    /// Files whose cached hunks the operation invalidates; `None` means all.
    pub fn touched_paths(&self) -> Option<Vec<String>> {
        match self {
            Self::Stage(paths) | Self::Unstage(paths) => Some(paths.clone()),
            Self::Discard(targets) => Some(targets.iter().map(|t| t.path.clone()).collect()),
            Self::StageLines { file_path, .. } | Self::UnstageLines { file_path, .. } => {
                Some(vec![file_path.clone()])
            }
            Self::CommitPaths { paths, .. } => Some(paths.clone()),
            Self::Commit { .. } | Self::CommitAmend { .. } | Self::Push | Self::Pull => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    LoadFiles {
        workspace: PathBuf,
        reason: RefreshReason,
        force: bool,
    },
    LoadCachedHunks {
        workspace: PathBuf,
        file_path: String,
    },
    FetchHunks {
        workspace: PathBuf,
        file_path: String,
    },
    WriteHunkCache {
        workspace: PathBuf,
        file_path: String,
        hunks: Vec<DiffHunk>,
    },
    InvalidateHunkCache {
        workspace: PathBuf,
        paths: Option<Vec<String>>,
    },
    LoadViewed {
        workspace: PathBuf,
    },
    MarkViewed {
        workspace: PathBuf,
        file_path: String,
        content_hash: String,
    },
    UnmarkViewed {
        workspace: PathBuf,
        file_path: String,
    },
    LoadPendingReview {
        repo_path: PathBuf,
        workspace_id: String,
    },
    SavePendingReview {
        repo_path: PathBuf,
        workspace_id: String,
        comments: Vec<LineComment>,
    },
    ClearPendingReview {
        repo_path: PathBuf,
        workspace_id: String,
    },
    RunVcs {
        workspace: PathBuf,
        operation: VcsOperation,
    },
    FetchContextLines {
        workspace: PathBuf,
        request: ContextRequest,
    },
    InjectReview {
        workspace_id: String,
        markdown: String,
    },
}
