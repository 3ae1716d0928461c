use super::fixtures::*;
use crate::application::session::{Action, DiffAction, ReviewAction};
use crate::application::review::PointerButton;
use crate::domain::{DiffHunk, LinePointer};
use crate::infra::vcs::SessionStore;

fn review(action: ReviewAction) -> Action {
    Action::Review(action)
}

fn single_hunk(id: &str, added: &str) -> Vec<DiffHunk> {
    vec![hunk(id, "@@ -1,1 +1,1 @@", &["-old", added])]
}

async fn open_with_file() -> TestSession {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("h1", "+new"));
    session.open().await;
    session
}

async fn comment_on_added_line(session: &mut TestSession, text: &str) {
    session
        .controller
        .dispatch(Action::Diff(DiffAction::CommentOnLine(LinePointer::new(
            "file.txt", 0, 1,
        ))));
    session.controller.dispatch(review(ReviewAction::SubmitComment {
        text: text.to_string(),
    }));
    session.controller.settle().await;
}

#[tokio::test]
async fn test_comment_on_line_is_anchored_and_persisted() {
    let mut session = open_with_file().await;

    session
        .controller
        .dispatch(Action::Diff(DiffAction::CommentOnLine(LinePointer::new(
            "file.txt", 0, 1,
        ))));
    let state = &session.controller.state;
    assert!(state.composer_open);
    assert!(state.in_review_mode());
    let draft = state.draft.as_ref().unwrap();
    assert_eq!(draft.hunk_id, "h1");
    assert_eq!((draft.start_line, draft.end_line), (1, 1));

    session.controller.dispatch(review(ReviewAction::SubmitComment {
        text: "  why?  ".into(),
    }));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert!(!state.composer_open);
    assert!(state.draft.is_none());
    assert_eq!(state.comments().len(), 1);
    assert_eq!(state.comments()[0].text, "why?");
    assert_eq!(state.comments()[0].location(), "file.txt:1");

    let stored = session
        .store
        .load_pending_review(&workspace().repo_path, WORKSPACE_ID)
        .await
        .unwrap();
    assert_eq!(stored, state.comments().to_vec());
}

#[tokio::test]
async fn test_blank_comment_keeps_composer_open() {
    let mut session = open_with_file().await;
    session
        .controller
        .dispatch(Action::Diff(DiffAction::CommentOnLine(LinePointer::new(
            "file.txt", 0, 0,
        ))));

    session
        .controller
        .dispatch(review(ReviewAction::SubmitComment { text: "  ".into() }));

    let state = &session.controller.state;
    assert!(state.composer_open);
    assert!(state.draft.is_some());
    assert!(state.comments().is_empty());
    assert_eq!(state.notifications.last().unwrap().title, "Cannot add comment");
}

#[tokio::test]
async fn test_escape_closes_composer_before_selection() {
    let mut session = open_with_file().await;
    session.controller.dispatch(Action::Diff(DiffAction::PointerDown {
        pointer: LinePointer::new("file.txt", 0, 1),
        button: PointerButton::Primary,
    }));
    session.controller.dispatch(Action::Diff(DiffAction::PointerUp));
    session
        .controller
        .dispatch(Action::Diff(DiffAction::CommentOnSelection));
    assert!(session.controller.state.composer_open);

    session.controller.dispatch(Action::Diff(DiffAction::Escape));
    assert!(!session.controller.state.composer_open);
    assert!(session.controller.state.selection.selection().is_some());

    session.controller.dispatch(Action::Diff(DiffAction::Escape));
    assert!(session.controller.state.selection.is_idle());
}

#[tokio::test]
async fn test_edit_and_delete_comment() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "first").await;
    let id = session.controller.state.comments()[0].id.clone();

    session.controller.dispatch(review(ReviewAction::EditComment {
        id: id.clone(),
        text: "second".into(),
    }));
    session.controller.settle().await;
    assert_eq!(session.controller.state.comments()[0].text, "second");

    session
        .controller
        .dispatch(review(ReviewAction::DeleteComment { id }));
    session.controller.settle().await;
    assert!(session.controller.state.comments().is_empty());

    let stored = session
        .store
        .load_pending_review(&workspace().repo_path, WORKSPACE_ID)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_changes_during_review_are_buffered() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "keep this").await;

    session.vcs.set_hunks("file.txt", single_hunk("h1", "+new2"));
    session.refresh().await;

    let state = &session.controller.state;
    assert_eq!(
        state.hunks_entry("file.txt").unwrap().hunks,
        single_hunk("h1", "+new")
    );
    assert!(state.stale_files().contains("file.txt"));
    assert!(state.reconciler.has_pending());
}

#[tokio::test]
async fn test_new_files_during_review_are_buffered() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "keep this").await;

    session.vcs.set_status(&["M file.txt", "?? extra.txt"]);
    session.vcs.set_hunks("extra.txt", vec![hunk("x1", "@@ -0,0 +1,1 @@", &["+hi"])]);
    session.refresh().await;

    let state = &session.controller.state;
    assert_eq!(state.files.len(), 1);
    assert!(state.hunks_entry("extra.txt").is_none());
    assert!(state.stale_files().contains("extra.txt"));

    session.controller.dispatch(review(ReviewAction::ReloadStale));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert_eq!(state.files.len(), 2);
    assert_eq!(state.hunks_entry("extra.txt").unwrap().hunks.len(), 1);
    assert!(state.stale_files().is_empty());
    // The comment still anchors, so nothing moved.
    assert_eq!(state.comments().len(), 1);
    assert!(state.summary.is_empty());
}

#[tokio::test]
async fn test_reload_moves_orphaned_comments_to_summary() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "was fine before").await;

    session.vcs.set_hunks("file.txt", single_hunk("h2", "+new2"));
    session.refresh().await;
    session.controller.dispatch(review(ReviewAction::ReloadStale));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert_eq!(
        state.hunks_entry("file.txt").unwrap().hunks,
        single_hunk("h2", "+new2")
    );
    assert!(state.comments().is_empty());
    assert!(state.summary.contains("### Outdated comments"));
    assert!(state.summary.contains("was fine before"));
    assert!(state.stale_files().is_empty());
    assert!(!state.reconciler.is_reloading());
    // The summary keeps the session in review mode.
    assert!(state.in_review_mode());

    let stored = session
        .store
        .load_pending_review(&workspace().repo_path, WORKSPACE_ID)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_leaving_review_mode_applies_changes_on_next_refresh() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "temp").await;
    let id = session.controller.state.comments()[0].id.clone();

    session.vcs.set_hunks("file.txt", single_hunk("h1", "+new2"));
    session.refresh().await;
    assert!(session.controller.state.reconciler.has_pending());

    session
        .controller
        .dispatch(review(ReviewAction::DeleteComment { id }));
    session.refresh().await;

    let state = &session.controller.state;
    assert!(!state.in_review_mode());
    assert_eq!(
        state.hunks_entry("file.txt").unwrap().hunks,
        single_hunk("h1", "+new2")
    );
}

#[tokio::test]
async fn test_submit_review_sends_markdown_and_clears() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "rename this").await;
    session
        .controller
        .dispatch(review(ReviewAction::SetSummary("Looks good".into())));
    session
        .controller
        .dispatch(review(ReviewAction::SetFinishPopover(true)));

    session.controller.dispatch(review(ReviewAction::SubmitReview));
    assert!(session.controller.state.is_submitting_review);
    session.controller.settle().await;

    let sent = session.terminal.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, WORKSPACE_ID);
    let markdown = &sent[0].1;
    assert!(markdown.starts_with("## Code Review\n\n### Summary\n\nLooks good"));
    assert!(markdown.contains("**file.txt:1**"));
    assert!(markdown.contains("> rename this"));

    let state = &session.controller.state;
    assert!(!state.is_submitting_review);
    assert!(state.comments().is_empty());
    assert!(state.summary.is_empty());
    assert!(!state.finish_popover_open);
    assert!(!state.in_review_mode());
    assert_eq!(state.notifications.last().unwrap().title, "Review sent");

    let stored = session
        .store
        .load_pending_review(&workspace().repo_path, WORKSPACE_ID)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_empty_review_is_rejected() {
    let mut session = open_with_file().await;

    session.controller.dispatch(review(ReviewAction::SubmitReview));

    assert_eq!(session.controller.in_flight(), 0);
    assert!(session.terminal.sent.lock().is_empty());
    assert_eq!(
        session.controller.state.notifications.last().unwrap().title,
        "Nothing to submit"
    );
}

#[tokio::test]
async fn test_failed_submit_keeps_review() {
    let mut session = open_with_file().await;
    comment_on_added_line(&mut session, "keep me").await;
    *session.terminal.fail.lock() = true;

    session.controller.dispatch(review(ReviewAction::SubmitReview));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert!(!state.is_submitting_review);
    assert_eq!(state.comments().len(), 1);
    assert_eq!(state.notifications.last().unwrap().title, "Send review failed");
}

#[tokio::test]
async fn test_pending_review_is_restored_and_hunks_still_load() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("h1", "+new"));
    session
        .store
        .save_pending_review(
            &workspace().repo_path,
            WORKSPACE_ID,
            &[comment("c1", "file.txt", "h1", 1)],
        )
        .await
        .unwrap();

    session.open().await;

    let state = &session.controller.state;
    assert_eq!(state.comments().len(), 1);
    assert!(state.in_review_mode());
    assert_eq!(
        state.hunks_entry("file.txt").unwrap().hunks,
        single_hunk("h1", "+new")
    );
    assert!(state.stale_files().is_empty());
}
