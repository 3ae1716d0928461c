//! Domain error types for diffdesk.
//!
//! Validation failures are rejected before any collaborator call is made;
//! collaborator failures are caught at the call site and surfaced as
//! notifications. Neither ever aborts the session.

use thiserror::Error;

/// Input rejected locally, before any RPC is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Commit message is empty")]
    EmptyCommitMessage,

    #[error("Commit message is {len} characters, the limit is {max}")]
    CommitMessageTooLong { len: usize, max: usize },

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("No comment anchor is pending")]
    NoPendingDraft,

    #[error("Review has no comments and no summary")]
    EmptyReview,

    #[error("Selection contains no added or removed lines")]
    NoChangedLinesSelected,

    #[error("Nothing is selected")]
    NothingSelected,

    #[error("File {0} has no loaded hunks")]
    HunksNotLoaded(String),
}

impl ValidationError {
    /// Short notification title for this failure.
    pub fn title(&self) -> &'static str {
        match self {
            Self::EmptyCommitMessage | Self::CommitMessageTooLong { .. } => "Cannot commit",
            Self::EmptyComment | Self::NoPendingDraft => "Cannot add comment",
            Self::EmptyReview => "Nothing to submit",
            Self::NoChangedLinesSelected | Self::NothingSelected => "Nothing to stage",
            Self::HunksNotLoaded(_) => "Diff not loaded",
        }
    }
}

/// A collaborator RPC failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct CollaboratorError {
    pub operation: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Unified error for session-level handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl SessionError {
    pub fn title(&self) -> String {
        match self {
            Self::Validation(err) => err.title().to_string(),
            Self::Collaborator(err) => format!("{} failed", err.operation),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Collaborator(err) => err.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_titles_and_messages() {
        let err = ValidationError::CommitMessageTooLong { len: 501, max: 500 };
        assert_eq!(err.title(), "Cannot commit");
        assert_eq!(
            err.to_string(),
            "Commit message is 501 characters, the limit is 500"
        );
    }

    #[test]
    fn session_error_splits_title_and_description() {
        let err: SessionError = CollaboratorError::new("Stage", "index.lock exists").into();
        assert_eq!(err.title(), "Stage failed");
        assert_eq!(err.description(), "index.lock exists");
    }
}
