use crate::domain::LineComment;
use crate::infra::db::Database;
use crate::infra::db::repository::*;
use chrono::Utc;

fn comment(id: &str, text: &str) -> LineComment {
    LineComment {
        id: id.into(),
        file_path: "src/lib.rs".into(),
        hunk_id: "unstaged:-1,2+1,3".into(),
        start_line: 2,
        end_line: 3,
        line_content: vec!["+fn a() {}".into(), "+fn b() {}".into()],
        text: text.into(),
        created_at: Utc::now(),
    }
}

#[test]
fn test_viewed_file_repository() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let repo = ViewedFileRepository::new(db.connection());

    repo.mark("/ws", "b.rs", "0000beef")?;
    repo.mark("/ws", "a.rs", "0000cafe")?;
    repo.mark("/other", "a.rs", "ffffffff")?;

    let viewed = repo.list("/ws")?;
    assert_eq!(viewed.len(), 2);
    assert_eq!(viewed[0].path, "a.rs");
    assert_eq!(viewed[0].content_hash, "0000cafe");

    repo.mark("/ws", "a.rs", "00000001")?;
    assert_eq!(repo.list("/ws")?[0].content_hash, "00000001");

    assert_eq!(repo.unmark("/ws", "a.rs")?, 1);
    assert_eq!(repo.unmark("/ws", "a.rs")?, 0);
    assert_eq!(repo.list("/ws")?.len(), 1);
    Ok(())
}

#[test]
fn test_cache_repository() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let repo = CacheRepository::new(db.connection());

    assert_eq!(repo.get("/ws", "hunks", Some("a.rs"))?, None);
    repo.set("/ws", "hunks", Some("a.rs"), "[1]")?;
    repo.set("/ws", "hunks", Some("b.rs"), "[2]")?;
    repo.set("/ws", "files", None, "[3]")?;
    assert_eq!(repo.get("/ws", "hunks", Some("a.rs"))?.as_deref(), Some("[1]"));
    assert_eq!(repo.get("/ws", "files", None)?.as_deref(), Some("[3]"));

    assert_eq!(repo.invalidate("/ws", "hunks", Some("a.rs"))?, 1);
    assert_eq!(repo.get("/ws", "hunks", Some("a.rs"))?, None);
    assert_eq!(repo.invalidate("/ws", "hunks", None)?, 1);
    assert_eq!(repo.get("/ws", "files", None)?.as_deref(), Some("[3]"));
    Ok(())
}

#[test]
fn test_pending_review_repository() -> anyhow::Result<()> {
    let db = Database::open_in_memory()?;
    let repo = PendingReviewRepository::new(db.connection());

    assert!(repo.load("/repo", "ws-1")?.is_empty());

    let comments = vec![comment("c1", "first"), comment("c2", "second")];
    repo.save("/repo", "ws-1", &comments)?;
    assert_eq!(repo.load("/repo", "ws-1")?, comments);
    assert!(repo.load("/repo", "ws-2")?.is_empty());

    repo.save("/repo", "ws-1", &comments[..1])?;
    assert_eq!(repo.load("/repo", "ws-1")?.len(), 1);

    assert_eq!(repo.clear("/repo", "ws-1")?, 1);
    assert!(repo.load("/repo", "ws-1")?.is_empty());
    Ok(())
}

#[test]
fn test_reopen_keeps_schema_version() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("db.sqlite");
    {
        let db = Database::open_at(path.clone())?;
        db.viewed_repo().mark("/ws", "a.rs", "1")?;
    }
    let db = Database::open_at(path)?;
    assert_eq!(db.viewed_repo().list("/ws")?.len(), 1);
    Ok(())
}
