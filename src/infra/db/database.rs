//! The SQLite file behind the session store: location, schema and versioning.

use super::repository::{CacheRepository, DbConn, PendingReviewRepository, ViewedFileRepository};
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;

const SCHEMA_VERSION: i32 = 2;

/// Owns the session database connection and hands out repositories over it.
pub struct Database {
    conn: DbConn,
}

impl Database {
    /// Opens `$DIFFDESK_DB_PATH`, or `diffdesk.sqlite` in the data dir.
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_path())
    }

    /// Fresh schema in memory, for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let db = Self::from_connection(Connection::open(&path)?)?;
        log::debug!("Opened session database at {}", path.display());
        Ok(db)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    fn default_path() -> PathBuf {
        match std::env::var("DIFFDESK_DB_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => crate::infra::app_config::app_data_dir().join("diffdesk.sqlite"),
        }
    }

    /// Brings the schema to [`SCHEMA_VERSION`]. A new file gets the current
    /// schema directly.
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();
        let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            Self::create_schema(&conn)?;
        } else {
            for step in (version + 1)..=SCHEMA_VERSION {
                Self::run_migration(&conn, step)?;
            }
        }
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    pub fn connection(&self) -> DbConn {
        self.conn.clone()
    }

    pub fn viewed_repo(&self) -> ViewedFileRepository {
        ViewedFileRepository::new(self.connection())
    }

    pub fn cache_repo(&self) -> CacheRepository {
        CacheRepository::new(self.connection())
    }

    pub fn pending_review_repo(&self) -> PendingReviewRepository {
        PendingReviewRepository::new(self.connection())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS viewed_files (
                workspace TEXT NOT NULL,
                file_path TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                viewed_at TEXT NOT NULL,
                PRIMARY KEY(workspace, file_path)
            );

            CREATE TABLE IF NOT EXISTS cache_entries (
                workspace TEXT NOT NULL,
                cache_type TEXT NOT NULL,
                cache_key TEXT NOT NULL DEFAULT '',
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY(workspace, cache_type, cache_key)
            );

            CREATE TABLE IF NOT EXISTS pending_reviews (
                repo_path TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                comments_json TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY(repo_path, workspace_id)
            );
            "#,
        )?;
        Ok(())
    }

    fn run_migration(conn: &Connection, version: i32) -> Result<()> {
        match version {
            1 => Self::create_schema(conn),
            // v2 added the pending review table.
            2 => {
                conn.execute_batch(
                    r#"
                    CREATE TABLE IF NOT EXISTS pending_reviews (
                        repo_path TEXT NOT NULL,
                        workspace_id TEXT NOT NULL,
                        comments_json TEXT NOT NULL,
                        updated_at TEXT NOT NULL,
                        PRIMARY KEY(repo_path, workspace_id)
                    );
                    "#,
                )?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
