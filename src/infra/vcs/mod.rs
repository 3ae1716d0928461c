//! Version-control collaborator: contracts, the git CLI backend and output scanning.

pub mod git;
pub mod output;
pub mod traits;

pub use git::GitCliBackend;
pub use output::{extract_commit_hash, summary_line};
pub use traits::{
    Collaborators, HunkLineSelection, SessionStore, TerminalSink, VcsBackend, ViewedFile,
};
