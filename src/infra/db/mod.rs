//! SQLite persistence (infrastructure).

pub mod database;
pub mod repository;
pub mod store;

pub use database::Database;
pub use repository::{CacheRepository, PendingReviewRepository, ViewedFileRepository};
pub use store::SqliteSessionStore;
