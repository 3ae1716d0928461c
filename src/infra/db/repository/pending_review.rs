use super::DbConn;
use crate::domain::LineComment;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

/// In-progress review comments, persisted across sessions per workspace.
pub struct PendingReviewRepository {
    conn: DbConn,
}

impl PendingReviewRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, repo_path: &str, workspace_id: &str, comments: &[LineComment]) -> Result<()> {
        let json = serde_json::to_string(comments).context("serialize pending review")?;
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO pending_reviews (repo_path, workspace_id, comments_json, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            rusqlite::params![repo_path, workspace_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load(&self, repo_path: &str, workspace_id: &str) -> Result<Vec<LineComment>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT comments_json FROM pending_reviews WHERE repo_path = ?1 AND workspace_id = ?2",
                rusqlite::params![repo_path, workspace_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => serde_json::from_str(&json).context("parse pending review"),
            None => Ok(Vec::new()),
        }
    }

    pub fn clear(&self, repo_path: &str, workspace_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM pending_reviews WHERE repo_path = ?1 AND workspace_id = ?2",
            rusqlite::params![repo_path, workspace_id],
        )?;
        Ok(affected)
    }
}
