//! Application layer (use-cases, policies).
//!
//! Review logic and the diff session state machine. Collaborators are reached
//! only through the traits in `infra::vcs`.

pub mod review;
pub mod session;
