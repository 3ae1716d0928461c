//! Domain types for diffdesk.
//! Plain data shared by the review engine, the session controller and the adapters.

pub mod comment;
pub mod error;
pub mod file;
pub mod hunk;
pub mod selection;

pub use comment::*;
pub use error::*;
pub use file::*;
pub use hunk::*;
pub use selection::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_change_flags() {
        let file = FileChange {
            path: "a.txt".into(),
            staged_status: Some('M'),
            work_tree_status: None,
            is_untracked: false,
        };
        assert!(file.has_staged_changes());
        assert!(!file.has_unstaged_changes());

        let deleted = FileChange {
            path: "b.txt".into(),
            staged_status: None,
            work_tree_status: Some('D'),
            is_untracked: false,
        };
        assert!(deleted.is_deleted());
        assert!(!file.same_status(&deleted));
    }

    #[test]
    fn test_selection_groups_by_hunk() {
        let line = |hunk_index, line_index, is_staged| SelectedLine {
            hunk_index,
            line_index,
            content: String::new(),
            is_staged,
        };
        let selection = DiffLineSelection {
            file_path: "a.txt".into(),
            lines: vec![line(0, 3, false), line(0, 4, false), line(1, 0, true)],
        };
        assert_eq!(selection.by_hunk(), vec![(0, vec![3, 4]), (1, vec![0])]);
        assert!(selection.has_staged());
        assert!(selection.has_unstaged());
    }
}
