//! [`SessionStore`] backed by the SQLite repositories.

use super::Database;
use super::repository::{CacheRepository, PendingReviewRepository, ViewedFileRepository};
use crate::domain::LineComment;
use crate::infra::vcs::traits::{SessionStore, ViewedFile};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

pub struct SqliteSessionStore {
    viewed: ViewedFileRepository,
    cache: CacheRepository,
    pending: PendingReviewRepository,
}

impl SqliteSessionStore {
    pub fn new(db: &Database) -> Self {
        Self {
            viewed: db.viewed_repo(),
            cache: db.cache_repo(),
            pending: db.pending_review_repo(),
        }
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_viewed_files(&self, workspace: &Path) -> Result<Vec<ViewedFile>> {
        self.viewed.list(&key(workspace))
    }

    async fn mark_file_viewed(
        &self,
        workspace: &Path,
        file_path: &str,
        content_hash: &str,
    ) -> Result<()> {
        self.viewed.mark(&key(workspace), file_path, content_hash)
    }

    async fn unmark_file_viewed(&self, workspace: &Path, file_path: &str) -> Result<()> {
        self.viewed.unmark(&key(workspace), file_path).map(|_| ())
    }

    async fn get_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key_name: Option<&str>,
    ) -> Result<Option<String>> {
        self.cache.get(&key(workspace), cache_type, key_name)
    }

    async fn set_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key_name: Option<&str>,
        value: &str,
    ) -> Result<()> {
        self.cache.set(&key(workspace), cache_type, key_name, value)
    }

    async fn invalidate_cache(
        &self,
        workspace: &Path,
        cache_type: &str,
        key_name: Option<&str>,
    ) -> Result<()> {
        self.cache
            .invalidate(&key(workspace), cache_type, key_name)
            .map(|_| ())
    }

    async fn load_pending_review(
        &self,
        repo_path: &Path,
        workspace_id: &str,
    ) -> Result<Vec<LineComment>> {
        self.pending.load(&key(repo_path), workspace_id)
    }

    async fn save_pending_review(
        &self,
        repo_path: &Path,
        workspace_id: &str,
        comments: &[LineComment],
    ) -> Result<()> {
        if comments.is_empty() {
            return self.pending.clear(&key(repo_path), workspace_id).map(|_| ());
        }
        self.pending.save(&key(repo_path), workspace_id, comments)
    }

    async fn clear_pending_review(&self, repo_path: &Path, workspace_id: &str) -> Result<()> {
        self.pending.clear(&key(repo_path), workspace_id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_round_trips_viewed_marks() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSessionStore::new(&db);
        let ws = Path::new("/tmp/ws");

        store.mark_file_viewed(ws, "a.rs", "abc").await.unwrap();
        let viewed = store.get_viewed_files(ws).await.unwrap();
        assert_eq!(
            viewed,
            vec![ViewedFile {
                path: "a.rs".into(),
                content_hash: "abc".into()
            }]
        );

        store.unmark_file_viewed(ws, "a.rs").await.unwrap();
        assert!(store.get_viewed_files(ws).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_empty_review_clears_it() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSessionStore::new(&db);
        let repo = Path::new("/tmp/repo");
        store.save_pending_review(repo, "ws", &[]).await.unwrap();
        assert!(store.load_pending_review(repo, "ws").await.unwrap().is_empty());
    }
}
