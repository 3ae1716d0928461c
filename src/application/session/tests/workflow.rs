use super::fixtures::*;
use crate::application::session::{
    Action, DiffAction, ExpansionSide, FileAction, HUNKS_CACHE, NotificationLevel, SessionAction,
};
use crate::application::review::PointerButton;
use crate::domain::{DiffHunk, LinePointer, Workspace};
use crate::infra::app_config::SessionConfig;
use crate::infra::hash::compute_hunks_hash;
use crate::infra::vcs::SessionStore;

fn files(action: FileAction) -> Action {
    Action::Files(action)
}

fn diff(action: DiffAction) -> Action {
    Action::Diff(action)
}

fn single_hunk(added: &str) -> Vec<DiffHunk> {
    vec![hunk("h1", "@@ -1,1 +1,1 @@", &["-old", added])]
}

fn last_notification_title(session: &TestSession) -> Option<String> {
    session
        .controller
        .state
        .notifications
        .last()
        .map(|n| n.title.clone())
}

#[tokio::test]
async fn test_open_loads_files_and_hunks() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+new"));

    session.open().await;

    let state = &session.controller.state;
    assert!(state.files_loaded);
    assert!(!state.is_loading_files);
    assert_eq!(state.files.len(), 1);
    assert_eq!(state.files[0].path, "file.txt");
    assert_eq!(state.files[0].work_tree_status, Some('M'));

    let entry = state.hunks_entry("file.txt").unwrap();
    assert!(!entry.is_loading);
    assert_eq!(entry.hunks, single_hunk("+new"));

    let numbers = state.line_numbers("file.txt", 0).unwrap();
    assert_eq!(numbers[0].old, Some(1));
    assert_eq!(numbers[0].new, None);
    assert_eq!(numbers[1].old, None);
    assert_eq!(numbers[1].new, Some(1));
    assert_eq!(session.controller.in_flight(), 0);
}

#[tokio::test]
async fn test_viewed_mark_follows_content_hash() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+new"));
    session.open().await;

    session
        .controller
        .dispatch(files(FileAction::MarkViewed("file.txt".into())));
    session.controller.settle().await;

    let expected = compute_hunks_hash(&single_hunk("+new"));
    assert_eq!(
        session.controller.state.viewed.get("file.txt"),
        Some(&expected)
    );
    let stored = session
        .store
        .get_viewed_files(&workspace().path)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_hash, expected);

    // Identical content keeps the mark.
    session.refresh().await;
    assert!(session.controller.state.is_viewed("file.txt"));

    // New content clears it, in memory and in the store.
    session.vcs.set_hunks("file.txt", single_hunk("+new2"));
    session.refresh().await;
    assert!(!session.controller.state.is_viewed("file.txt"));
    let stored = session
        .store
        .get_viewed_files(&workspace().path)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_stored_viewed_mark_is_checked_on_load() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+changed"));
    session
        .store
        .mark_file_viewed(&workspace().path, "file.txt", "deadbeef")
        .await
        .unwrap();

    session.open().await;

    assert!(!session.controller.state.is_viewed("file.txt"));
}

#[tokio::test]
async fn test_mark_viewed_before_hunks_load_is_rejected() {
    let mut session = TestSession::new();
    session.controller.skip_runtime = true;
    session.controller.open(workspace());

    session
        .controller
        .dispatch(files(FileAction::MarkViewed("file.txt".into())));

    assert!(!session.controller.state.is_viewed("file.txt"));
    assert_eq!(
        last_notification_title(&session).as_deref(),
        Some("Diff not loaded")
    );
}

#[tokio::test]
async fn test_fresh_hunks_replace_cached_ones() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+fresh"));
    let cached = serde_json::to_string(&single_hunk("+cached")).unwrap();
    session
        .store
        .set_cache(&workspace().path, HUNKS_CACHE, Some("file.txt"), &cached)
        .await
        .unwrap();

    session.open().await;

    let entry = session.controller.state.hunks_entry("file.txt").unwrap();
    assert_eq!(entry.hunks, single_hunk("+fresh"));

    let blob = session
        .store
        .get_cache(&workspace().path, HUNKS_CACHE, Some("file.txt"))
        .await
        .unwrap()
        .unwrap();
    let written: Vec<DiffHunk> = serde_json::from_str(&blob).unwrap();
    assert_eq!(written, single_hunk("+fresh"));
}

#[tokio::test]
async fn test_unreadable_cache_is_a_miss() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+new"));
    session
        .store
        .set_cache(&workspace().path, HUNKS_CACHE, Some("file.txt"), "{not json")
        .await
        .unwrap();

    session.open().await;

    let entry = session.controller.state.hunks_entry("file.txt").unwrap();
    assert_eq!(entry.hunks, single_hunk("+new"));
    assert!(entry.error.is_none());
}

#[tokio::test]
async fn test_hunk_failure_keeps_previous_hunks_and_notifies_once() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks("file.txt", single_hunk("+new"));
    session.open().await;

    *session.vcs.fail_hunks.lock() = true;
    session.refresh().await;
    session.refresh().await;

    let state = &session.controller.state;
    let entry = state.hunks_entry("file.txt").unwrap();
    assert_eq!(entry.hunks, single_hunk("+new"));
    assert!(entry.error.as_deref().unwrap().contains("diff exploded"));
    let errors = state
        .notifications
        .iter()
        .filter(|n| n.level == NotificationLevel::Error)
        .count();
    assert_eq!(errors, 1);

    *session.vcs.fail_hunks.lock() = false;
    session.refresh().await;
    assert!(
        session
            .controller
            .state
            .hunks_entry("file.txt")
            .unwrap()
            .error
            .is_none()
    );
}

#[tokio::test]
async fn test_removed_files_drop_their_state() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt", "M b.txt"]);
    session.vcs.set_hunks("a.txt", single_hunk("+a"));
    session.vcs.set_hunks("b.txt", single_hunk("+b"));
    session.open().await;
    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("b.txt".into())));

    session.vcs.set_status(&["M a.txt"]);
    session.refresh().await;

    let state = &session.controller.state;
    assert_eq!(state.files.len(), 1);
    assert!(state.hunks_entry("b.txt").is_none());
    assert!(state.selected_files.is_empty());
}

#[tokio::test]
async fn test_file_events_are_scoped_to_the_workspace() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt", "M b.txt"]);
    session.open().await;
    let before = session.vcs.calls().len();

    session
        .controller
        .dispatch(Action::Session(SessionAction::FilesChanged {
            workspace_id: "someone-else".into(),
            paths: vec!["a.txt".into()],
        }));
    assert_eq!(session.controller.in_flight(), 0);

    session
        .controller
        .dispatch(Action::Session(SessionAction::FilesChanged {
            workspace_id: WORKSPACE_ID.into(),
            paths: vec!["a.txt".into()],
        }));
    session.controller.settle().await;

    let calls = session.vcs.calls()[before..].to_vec();
    assert_eq!(calls, vec!["status".to_string(), "hunks a.txt".to_string()]);
}

#[tokio::test]
async fn test_regaining_focus_refreshes() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.open().await;

    session
        .controller
        .dispatch(Action::Session(SessionAction::FocusChanged { focused: true }));
    assert_eq!(session.controller.in_flight(), 0);

    session
        .controller
        .dispatch(Action::Session(SessionAction::FocusChanged { focused: false }));
    assert_eq!(session.controller.in_flight(), 0);

    session
        .controller
        .dispatch(Action::Session(SessionAction::FocusChanged { focused: true }));
    assert_eq!(session.controller.in_flight(), 1);
    session.controller.settle().await;
}

#[tokio::test]
async fn test_commit_with_strict_subset_commits_selected_paths() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt", "M b.txt", "M c.txt"]);
    session.open().await;

    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("c.txt".into())));
    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("a.txt".into())));
    session.controller.dispatch(files(FileAction::Commit {
        message: "  fix parser  ".into(),
    }));
    session.controller.settle().await;

    assert_eq!(
        session.vcs.calls_starting_with("commit"),
        vec!["commit-paths fix parser -- a.txt c.txt".to_string()]
    );
    let state = &session.controller.state;
    assert!(state.selected_files.is_empty());
    assert_eq!(state.operations_in_flight, 0);
    assert_eq!(
        last_notification_title(&session).as_deref(),
        Some("Committed 1a2b3c4")
    );
}

#[tokio::test]
async fn test_commit_without_selection_commits_everything_staged() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt", "M b.txt", "M c.txt"]);
    session.open().await;

    session.controller.dispatch(files(FileAction::Commit {
        message: "release".into(),
    }));
    session.controller.settle().await;

    session.controller.dispatch(files(FileAction::SelectAll));
    session.controller.dispatch(files(FileAction::Commit {
        message: "again".into(),
    }));
    session.controller.settle().await;

    assert_eq!(
        session.vcs.calls_starting_with("commit"),
        vec!["commit release".to_string(), "commit again".to_string()]
    );
}

#[tokio::test]
async fn test_invalid_commit_messages_never_reach_vcs() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt"]);
    session.open().await;

    session.controller.dispatch(files(FileAction::Commit {
        message: " \n\t ".into(),
    }));
    assert_eq!(
        last_notification_title(&session).as_deref(),
        Some("Cannot commit")
    );

    session.controller.dispatch(files(FileAction::Commit {
        message: "x".repeat(501),
    }));
    let last = session.controller.state.notifications.last().unwrap();
    assert_eq!(
        last.description,
        "Commit message is 501 characters, the limit is 500"
    );

    assert_eq!(session.controller.in_flight(), 0);
    assert!(session.vcs.calls_starting_with("commit").is_empty());

    session.controller.dispatch(files(FileAction::Commit {
        message: "x".repeat(500),
    }));
    session.controller.settle().await;
    assert_eq!(session.vcs.calls_starting_with("commit").len(), 1);
}

#[tokio::test]
async fn test_amend_accepts_empty_message() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt"]);
    session.open().await;

    session.controller.dispatch(files(FileAction::CommitAmend {
        message: "   ".into(),
    }));
    session.controller.settle().await;

    assert_eq!(session.vcs.calls_starting_with("amend"), vec!["amend ".to_string()]);
}

#[tokio::test]
async fn test_failed_operation_is_reported() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt"]);
    session.open().await;
    *session.vcs.fail_operations.lock() = true;

    session
        .controller
        .dispatch(files(FileAction::Stage(vec!["a.txt".into()])));
    assert_eq!(session.controller.state.operations_in_flight, 1);
    session.controller.settle().await;

    let state = &session.controller.state;
    assert_eq!(state.operations_in_flight, 0);
    let last = state.notifications.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.title, "Stage failed");
    assert!(last.description.contains("index.lock"));
}

#[tokio::test]
async fn test_successful_operation_refreshes_files() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["?? new.txt"]);
    session.open().await;

    session.vcs.set_status(&["A  new.txt"]);
    session
        .controller
        .dispatch(files(FileAction::Stage(vec!["new.txt".into()])));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert_eq!(state.files[0].staged_status, Some('A'));
    assert!(!state.files[0].is_untracked);
    assert_eq!(
        last_notification_title(&session).as_deref(),
        Some("Staged 1 file")
    );
}

#[tokio::test]
async fn test_discard_of_selected_file_discards_selection() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt", "M b.txt", "M c.txt"]);
    session.open().await;

    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("a.txt".into())));
    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("b.txt".into())));
    session
        .controller
        .dispatch(files(FileAction::Discard("b.txt".into())));
    session.controller.settle().await;
    session
        .controller
        .dispatch(files(FileAction::Discard("c.txt".into())));
    session.controller.settle().await;

    assert_eq!(
        session.vcs.calls_starting_with("discard"),
        vec!["discard a.txt b.txt".to_string(), "discard c.txt".to_string()]
    );
}

#[tokio::test]
async fn test_stage_selected_lines() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks(
        "file.txt",
        vec![hunk("h1", "@@ -1,2 +1,2 @@", &["-old", "+new", " ctx"])],
    );
    session.open().await;

    let at = |line| LinePointer::new("file.txt", 0, line);
    session.controller.dispatch(diff(DiffAction::PointerDown {
        pointer: at(2),
        button: PointerButton::Primary,
    }));
    session.controller.dispatch(diff(DiffAction::PointerEnter(at(0))));
    session.controller.dispatch(diff(DiffAction::PointerUp));
    assert_eq!(
        session
            .controller
            .state
            .selection
            .selection()
            .unwrap()
            .lines
            .len(),
        3
    );

    session.controller.dispatch(diff(DiffAction::StageSelection));
    assert!(session.controller.state.selection.is_idle());
    session.controller.settle().await;

    assert_eq!(
        session.vcs.calls_starting_with("stage-lines"),
        vec!["stage-lines file.txt [0, 1]".to_string()]
    );
}

#[tokio::test]
async fn test_staging_context_only_selection_is_rejected() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session.vcs.set_hunks(
        "file.txt",
        vec![hunk("h1", "@@ -1,2 +1,2 @@", &[" ctx", "-old", "+new"])],
    );
    session.open().await;

    session.controller.dispatch(diff(DiffAction::PointerDown {
        pointer: LinePointer::new("file.txt", 0, 0),
        button: PointerButton::Primary,
    }));
    session.controller.dispatch(diff(DiffAction::PointerUp));
    session.controller.dispatch(diff(DiffAction::StageSelection));

    assert_eq!(session.controller.in_flight(), 0);
    assert_eq!(
        last_notification_title(&session).as_deref(),
        Some("Nothing to stage")
    );
    // A rejected stage keeps the selection.
    assert!(session.controller.state.selection.selection().is_some());
}

#[tokio::test]
async fn test_unstage_uses_staged_hunks_only() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["MM file.txt"]);
    session.vcs.set_hunks(
        "file.txt",
        vec![
            staged_hunk("s1", "@@ -1,1 +1,1 @@", &["-a", "+b"]),
            hunk("u1", "@@ -9,1 +9,1 @@", &["-c", "+d"]),
        ],
    );
    session.open().await;

    session.controller.dispatch(diff(DiffAction::PointerDown {
        pointer: LinePointer::new("file.txt", 0, 0),
        button: PointerButton::Primary,
    }));
    session
        .controller
        .dispatch(diff(DiffAction::PointerEnter(LinePointer::new("file.txt", 1, 1))));
    session.controller.dispatch(diff(DiffAction::PointerUp));
    session.controller.dispatch(diff(DiffAction::UnstageSelection));
    session.controller.settle().await;

    assert_eq!(
        session.vcs.calls_starting_with("unstage-lines"),
        vec!["unstage-lines file.txt [0, 1]".to_string()]
    );
}

#[tokio::test]
async fn test_context_expansion_around_hunk() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M file.txt"]);
    session
        .vcs
        .set_hunks("file.txt", vec![hunk("h1", "@@ -20,2 +20,2 @@", &[" a", " b"])]);
    let lines: Vec<String> = (1..=25).map(|n| format!("line {n}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    session.vcs.set_file_lines("file.txt", &refs);
    session.open().await;

    let rendered = || {
        diff(DiffAction::HunkRendered {
            file_path: "file.txt".into(),
            hunk_index: 0,
        })
    };
    session.controller.dispatch(rendered());
    assert_eq!(session.controller.in_flight(), 2);
    session.controller.settle().await;

    // Rendering again does not re-request.
    session.controller.dispatch(rendered());
    assert_eq!(session.controller.in_flight(), 0);

    let expansion = session
        .controller
        .state
        .expansion
        .get("file.txt", "h1")
        .unwrap()
        .clone();
    let before = expansion.before.unwrap();
    assert_eq!(before.start_line, 10);
    assert_eq!(before.lines.len(), 10);
    assert_eq!(before.lines[0], "line 10");
    let after = expansion.after.unwrap();
    assert_eq!(after.start_line, 22);
    assert_eq!(after.lines, vec!["line 22", "line 23", "line 24", "line 25"]);
    assert!(expansion.after_exhausted);

    session.controller.dispatch(diff(DiffAction::ExpandMore {
        file_path: "file.txt".into(),
        hunk_index: 0,
        side: ExpansionSide::After,
    }));
    assert_eq!(session.controller.in_flight(), 0);

    session.controller.dispatch(diff(DiffAction::ExpandMore {
        file_path: "file.txt".into(),
        hunk_index: 0,
        side: ExpansionSide::Before,
    }));
    session.controller.settle().await;
    let before = session
        .controller
        .state
        .expansion
        .get("file.txt", "h1")
        .unwrap()
        .before
        .clone()
        .unwrap();
    assert_eq!(before.start_line, 1);
    assert_eq!(before.lines.len(), 19);
    assert!(
        session
            .vcs
            .calls()
            .contains(&"lines file.txt 1-9 parent=false".to_string())
    );
}

#[tokio::test]
async fn test_deleted_file_expands_from_parent_revision() {
    let mut session = TestSession::new();
    session.vcs.set_status(&[" D gone.txt"]);
    session
        .vcs
        .set_hunks("gone.txt", vec![hunk("h1", "@@ -30,1 +0,0 @@", &["-bye"])]);
    session.open().await;

    session.controller.dispatch(diff(DiffAction::HunkRendered {
        file_path: "gone.txt".into(),
        hunk_index: 0,
    }));
    session.controller.settle().await;

    let calls = session.vcs.calls_starting_with("lines");
    assert!(calls.contains(&"lines gone.txt 20-29 parent=true".to_string()));
    assert!(calls.contains(&"lines gone.txt 31-40 parent=true".to_string()));
}

#[tokio::test]
async fn test_large_file_gate_and_reveal() {
    let config = SessionConfig {
        file_collapse_threshold: 2,
        ..SessionConfig::default()
    };
    let mut session = TestSession::with_config(config);
    session.vcs.set_status(&["M big.txt", "M small.txt"]);
    session.vcs.set_hunks(
        "big.txt",
        vec![hunk("h1", "@@ -1,2 +1,1 @@", &["-a", "-b", "+c"])],
    );
    session.vcs.set_hunks("small.txt", single_hunk("+new"));
    session.open().await;

    let gates = session.controller.state.gates();
    assert_eq!(gates.total_changed_lines, 5);
    assert!(gates.is_file_collapsed("big.txt"));
    assert!(!gates.is_file_collapsed("small.txt"));
    assert!(!gates.changeset_collapsed);
    // Gated files are still fetched.
    assert_eq!(
        session.controller.state.hunks_entry("big.txt").unwrap().hunks.len(),
        1
    );

    session
        .controller
        .dispatch(files(FileAction::RevealFile("big.txt".into())));
    assert!(!session.controller.state.gates().is_file_collapsed("big.txt"));
}

#[tokio::test]
async fn test_switching_workspace_resets_state() {
    let mut session = TestSession::new();
    session.vcs.set_status(&["M a.txt"]);
    session.open().await;
    session
        .controller
        .dispatch(files(FileAction::ToggleSelected("a.txt".into())));

    session.vcs.set_status(&["M other.txt"]);
    session
        .controller
        .open(Workspace::new("ws-2", "/tmp/diffdesk-other"));
    session.controller.settle().await;

    let state = &session.controller.state;
    assert_eq!(state.workspace.as_ref().unwrap().id, "ws-2");
    assert!(state.selected_files.is_empty());
    assert_eq!(state.files.len(), 1);
    assert_eq!(state.files[0].path, "other.txt");
}

#[tokio::test]
async fn test_late_results_of_previous_workspace_are_ignored() {
    let mut session = TestSession::new();
    let first = workspace();
    let second = Workspace::new("ws-2", "/tmp/diffdesk-other");
    session
        .vcs
        .set_workspace_status(&first.path, &["M only_in_first.txt"]);
    session
        .vcs
        .set_workspace_status(&second.path, &["M only_in_second.txt"]);
    session
        .store
        .save_pending_review(
            &first.repo_path,
            &first.id,
            &[comment("c1", "only_in_first.txt", "h1", 1)],
        )
        .await
        .unwrap();

    // Switch before anything issued for the first workspace has reported back.
    session.controller.open(first.clone());
    session.controller.open(second.clone());
    session.controller.settle().await;

    assert_eq!(session.controller.in_flight(), 0);
    assert_eq!(session.vcs.calls_starting_with("status").len(), 2);
    let state = &session.controller.state;
    assert_eq!(state.workspace.as_ref().unwrap().id, "ws-2");
    let paths: Vec<&str> = state.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["only_in_second.txt"]);
    assert!(state.comments().is_empty());
    assert!(!state.in_review_mode());

    // Nothing from the first workspace was written under the second one.
    assert!(
        session
            .store
            .load_pending_review(&second.repo_path, &second.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        session
            .store
            .load_pending_review(&first.repo_path, &first.id)
            .await
            .unwrap()
            .len(),
        1
    );
}
