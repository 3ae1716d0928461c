use serde::{Deserialize, Serialize};

/// A changed file as reported by the collaborator's status listing.
///
/// Identity is the path; two entries with the same path but different status
/// codes describe the same file in a different state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    /// Index-side status code (`M`, `A`, `D`, `R`, ...), `None` when unchanged.
    pub staged_status: Option<char>,
    /// Working-tree status code, `None` when unchanged.
    pub work_tree_status: Option<char>,
    pub is_untracked: bool,
}

impl FileChange {
    pub fn has_staged_changes(&self) -> bool {
        self.staged_status.is_some()
    }

    pub fn has_unstaged_changes(&self) -> bool {
        self.work_tree_status.is_some() || self.is_untracked
    }

    pub fn is_deleted(&self) -> bool {
        self.work_tree_status == Some('D')
            || (self.work_tree_status.is_none() && self.staged_status == Some('D'))
    }

    /// Same path, same codes.
    pub fn same_status(&self, other: &FileChange) -> bool {
        self.staged_status == other.staged_status
            && self.work_tree_status == other.work_tree_status
            && self.is_untracked == other.is_untracked
    }
}

/// A discard target; untracked files are removed rather than checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardTarget {
    pub path: String,
    pub is_untracked: bool,
}

impl From<&FileChange> for DiscardTarget {
    fn from(file: &FileChange) -> Self {
        Self {
            path: file.path.clone(),
            is_untracked: file.is_untracked,
        }
    }
}

/// The workspace a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Identifier used to scope file-change events and pending reviews.
    pub id: String,
    /// Working tree the VCS commands run in.
    pub path: std::path::PathBuf,
    /// Repository root, used as the pending-review key.
    pub repo_path: std::path::PathBuf,
}

impl Workspace {
    pub fn new(id: impl Into<String>, path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: id.into(),
            repo_path: path.clone(),
            path,
        }
    }
}
