//! Repository implementations for data access in diffdesk.
//!
//! Provides database operations for viewed marks, the blob cache and pending reviews.

mod cache;
mod pending_review;
mod viewed;

pub use cache::CacheRepository;
pub use pending_review::PendingReviewRepository;
pub use viewed::ViewedFileRepository;

use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

pub type DbConn = Arc<Mutex<Connection>>;

#[cfg(test)]
mod tests;
