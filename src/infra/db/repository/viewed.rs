use super::DbConn;
use crate::infra::vcs::traits::ViewedFile;
use anyhow::Result;
use chrono::Utc;
use rusqlite::Row;

pub struct ViewedFileRepository {
    conn: DbConn,
}

impl ViewedFileRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn mark(&self, workspace: &str, file_path: &str, content_hash: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO viewed_files (workspace, file_path, content_hash, viewed_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            rusqlite::params![workspace, file_path, content_hash, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn unmark(&self, workspace: &str, file_path: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM viewed_files WHERE workspace = ?1 AND file_path = ?2",
            rusqlite::params![workspace, file_path],
        )?;
        Ok(affected)
    }

    pub fn list(&self, workspace: &str) -> Result<Vec<ViewedFile>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT file_path, content_hash
            FROM viewed_files
            WHERE workspace = ?1
            ORDER BY file_path
            "#,
        )?;
        let rows = stmt.query_map([workspace], Self::row_to_viewed)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn row_to_viewed(row: &Row) -> rusqlite::Result<ViewedFile> {
        Ok(ViewedFile {
            path: row.get(0)?,
            content_hash: row.get(1)?,
        })
    }
}
