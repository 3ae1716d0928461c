use super::DbConn;
use anyhow::Result;
use chrono::Utc;
use rusqlite::OptionalExtension;

/// Opaque string blobs keyed by workspace, cache type and optional key.
pub struct CacheRepository {
    conn: DbConn,
}

impl CacheRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn get(&self, workspace: &str, cache_type: &str, key: Option<&str>) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                r#"
                SELECT value FROM cache_entries
                WHERE workspace = ?1 AND cache_type = ?2 AND cache_key = ?3
                "#,
                rusqlite::params![workspace, cache_type, key.unwrap_or_default()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, workspace: &str, cache_type: &str, key: Option<&str>, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO cache_entries (workspace, cache_type, cache_key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            rusqlite::params![
                workspace,
                cache_type,
                key.unwrap_or_default(),
                value,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn invalidate(&self, workspace: &str, cache_type: &str, key: Option<&str>) -> Result<usize> {
        let conn = self.conn.lock();
        let affected = match key {
            Some(key) => conn.execute(
                "DELETE FROM cache_entries WHERE workspace = ?1 AND cache_type = ?2 AND cache_key = ?3",
                rusqlite::params![workspace, cache_type, key],
            )?,
            None => conn.execute(
                "DELETE FROM cache_entries WHERE workspace = ?1 AND cache_type = ?2",
                rusqlite::params![workspace, cache_type],
            )?,
        };
        Ok(affected)
    }
}
