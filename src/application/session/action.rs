use super::command::{RefreshReason, VcsOperation};
use super::expansion::{ContextRequest, ExpansionSide};
use crate::application::review::PointerButton;
use crate::domain::{DiffHunk, FileLines, LineComment, LinePointer, Workspace};
use crate::infra::vcs::ViewedFile;

#[derive(Debug, Clone)]
pub enum Action {
    Session(SessionAction),
    Files(FileAction),
    Diff(DiffAction),
    Review(ReviewAction),
    /// A runtime result, tagged with the session generation that issued it.
    Async {
        generation: u64,
        action: AsyncAction,
    },
}

/// Lifecycle and refresh triggers.
#[derive(Debug, Clone)]
pub enum SessionAction {
    Mount,
    WorkspaceChanged(Workspace),
    FocusChanged { focused: bool },
    /// External file-change notification for a workspace.
    FilesChanged {
        workspace_id: String,
        paths: Vec<String>,
    },
    TimerTick,
    Refresh { force: bool },
    DismissNotification(u64),
}

#[derive(Debug, Clone)]
pub enum FileAction {
    Stage(Vec<String>),
    Unstage(Vec<String>),
    Discard(String),
    Commit { message: String },
    CommitAmend { message: String },
    Push,
    Pull,
    ToggleSelected(String),
    SelectAll,
    ClearSelected,
    MarkViewed(String),
    UnmarkViewed(String),
    RevealFile(String),
    RevealChangeset,
}

#[derive(Debug, Clone)]
pub enum DiffAction {
    HunkRendered {
        file_path: String,
        hunk_index: usize,
    },
    ExpandMore {
        file_path: String,
        hunk_index: usize,
        side: ExpansionSide,
    },
    PointerDown {
        pointer: LinePointer,
        button: PointerButton,
    },
    PointerEnter(LinePointer),
    PointerUp,
    Escape,
    BackgroundClick,
    StageSelection,
    UnstageSelection,
    CommentOnSelection,
    CommentOnLine(LinePointer),
}

#[derive(Debug, Clone)]
pub enum ReviewAction {
    CancelComposer,
    SubmitComment { text: String },
    EditComment { id: String, text: String },
    DeleteComment { id: String },
    SetSummary(String),
    SetFinishPopover(bool),
    SubmitReview,
    ReloadStale,
}

/// Results of runtime commands; each command yields exactly one.
#[derive(Debug, Clone)]
pub enum AsyncAction {
    FilesLoaded {
        reason: RefreshReason,
        force: bool,
        result: Result<Vec<String>, String>,
    },
    HunkCacheLoaded {
        file_path: String,
        hunks: Option<Vec<DiffHunk>>,
    },
    HunksLoaded {
        file_path: String,
        result: Result<Vec<DiffHunk>, String>,
    },
    CacheUpdated(Result<(), String>),
    ViewedLoaded(Result<Vec<ViewedFile>, String>),
    ViewedSaved(Result<(), String>),
    PendingReviewLoaded(Result<Vec<LineComment>, String>),
    PendingReviewSaved(Result<(), String>),
    OperationCompleted {
        operation: VcsOperation,
        result: Result<String, String>,
    },
    ContextLinesLoaded {
        request: ContextRequest,
        result: Result<FileLines, String>,
    },
    ReviewSent(Result<(), String>),
}
