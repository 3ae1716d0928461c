//! Review Annotation Store: the single owner of a session's line comments.

use crate::domain::{CommentDraft, DiffHunk, LineComment, ValidationError};
use crate::infra::diff::compute_line_numbers;
use chrono::Utc;

/// Whether `comment` no longer anchors to `current_hunks`.
///
/// A comment is outdated when its hunk id is gone, or when none of that hunk's
/// real line numbers falls within `[start_line, end_line]`.
pub fn is_outdated(comment: &LineComment, current_hunks: &[DiffHunk]) -> bool {
    let Some(hunk) = current_hunks.iter().find(|h| h.id == comment.hunk_id) else {
        return true;
    };
    !compute_line_numbers(hunk)
        .iter()
        .filter_map(|numbers| numbers.real())
        .any(|line| line >= comment.start_line && line <= comment.end_line)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewAnnotationStore {
    comments: Vec<LineComment>,
}

impl ReviewAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_comments(comments: Vec<LineComment>) -> Self {
        Self { comments }
    }

    pub fn comments(&self) -> &[LineComment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LineComment> {
        self.comments.iter().find(|c| c.id == id)
    }

    /// Appends a comment built from the pending draft.
    ///
    /// Nothing changes when the draft is missing or `text` is blank; the caller
    /// clears its draft and line selection on success.
    pub fn add_comment(
        &mut self,
        draft: Option<&CommentDraft>,
        text: &str,
    ) -> Result<LineComment, ValidationError> {
        let draft = draft.ok_or(ValidationError::NoPendingDraft)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyComment);
        }

        let comment = LineComment {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: draft.file_path.clone(),
            hunk_id: draft.hunk_id.clone(),
            start_line: draft.start_line.min(draft.end_line),
            end_line: draft.start_line.max(draft.end_line),
            line_content: draft.line_content.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }

    /// Replaces the text of comment `id`. Returns false when nothing changed.
    pub fn edit_comment(&mut self, id: &str, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return false;
        }
        match self.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.text = new_text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete_comment(&mut self, id: &str) -> Option<LineComment> {
        let index = self.comments.iter().position(|c| c.id == id)?;
        Some(self.comments.remove(index))
    }

    pub fn clear(&mut self) {
        self.comments.clear();
    }

    pub fn comments_for_file(&self, file_path: &str) -> Vec<&LineComment> {
        self.comments
            .iter()
            .filter(|c| c.file_path == file_path)
            .collect()
    }

    /// Inline comments rendered under `real_line` of hunk `hunk_id`.
    ///
    /// A comment is shown under the last line of its range. Outdated comments
    /// are excluded; see [`Self::outdated_comments_for_file`].
    pub fn comments_for_line(
        &self,
        file_path: &str,
        hunk_id: &str,
        real_line: u32,
        current_hunks: &[DiffHunk],
    ) -> Vec<&LineComment> {
        self.comments
            .iter()
            .filter(|c| c.file_path == file_path && c.hunk_id == hunk_id && c.end_line == real_line)
            .filter(|c| !is_outdated(c, current_hunks))
            .collect()
    }

    /// Comments of `file_path` that no longer anchor, grouped at the top of the file.
    pub fn outdated_comments_for_file(
        &self,
        file_path: &str,
        current_hunks: &[DiffHunk],
    ) -> Vec<&LineComment> {
        self.comments
            .iter()
            .filter(|c| c.file_path == file_path && is_outdated(c, current_hunks))
            .collect()
    }

    /// Removes and returns every comment for which `is_orphaned` holds.
    pub fn take_orphans(
        &mut self,
        mut is_orphaned: impl FnMut(&LineComment) -> bool,
    ) -> Vec<LineComment> {
        let (orphaned, kept): (Vec<_>, Vec<_>) =
            self.comments.drain(..).partition(|c| is_orphaned(c));
        self.comments = kept;
        orphaned
    }
}
