//! diffdesk CLI entry point.
//!
//! Drives a diff session over a git working tree from the terminal.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use diffdesk::application::review::ReviewExporter;
use diffdesk::application::session::{DiffSessionController, SessionDriver, SessionState};
use diffdesk::domain::Workspace;
use diffdesk::infra::app_config::load_config;
use diffdesk::infra::db::{Database, SqliteSessionStore};
use diffdesk::infra::terminal::StdoutTerminal;
use diffdesk::infra::vcs::{Collaborators, GitCliBackend};

#[derive(Parser, Debug)]
#[command(name = "diffdesk")]
#[command(version)]
#[command(about = "Review and stage working-tree changes line by line", long_about = None)]
struct Args {
    /// Working tree to open (defaults to the current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List changed files and their large-diff gates
    Files,

    /// Print the hunks of one file with old/new line numbers
    Diff {
        /// Path relative to the working tree
        path: String,
    },

    /// Keep the session open and follow changes until Ctrl-C
    Watch,

    /// Print the pending review as markdown
    Review,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let root = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir().context("read current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("open workspace {}", root.display()))?;

    let db = Database::open().context("open session database")?;
    let collaborators = Collaborators::new(
        Arc::new(GitCliBackend::new()?),
        Arc::new(SqliteSessionStore::new(&db)),
        Arc::new(StdoutTerminal),
    );
    let mut controller = DiffSessionController::new(collaborators, load_config());
    controller.open(Workspace::new(workspace_id(&root), &root));
    controller.settle().await;

    if let Some(err) = &controller.state.files_error {
        bail!("{err}");
    }

    match args.command {
        Commands::Files => print_files(&controller.state),
        Commands::Diff { path } => print_diff(&controller.state, &path)?,
        Commands::Watch => watch(controller).await?,
        Commands::Review => print!(
            "{}",
            ReviewExporter::format_as_markdown(
                controller.state.comments(),
                &controller.state.summary
            )
        ),
    }
    Ok(())
}

fn workspace_id(root: &Path) -> String {
    root.to_string_lossy().to_string()
}

fn status_label(staged: Option<char>, work_tree: Option<char>, untracked: bool) -> String {
    if untracked {
        return "??".to_string();
    }
    format!("{}{}", staged.unwrap_or(' '), work_tree.unwrap_or(' '))
}

fn print_files(state: &SessionState) {
    let gates = state.gates();
    if state.files.is_empty() {
        println!("No changes.");
        return;
    }
    for file in &state.files {
        let changed = state
            .hunks_entry(&file.path)
            .map(|entry| entry.changed_line_count())
            .unwrap_or(0);
        let label = status_label(file.staged_status, file.work_tree_status, file.is_untracked);
        let collapsed = if gates.is_file_collapsed(&file.path) {
            "  (large diff)"
        } else {
            ""
        };
        let viewed = if state.is_viewed(&file.path) { "  viewed" } else { "" };
        println!("{label} {}  {changed} lines{collapsed}{viewed}", file.path);
    }
    if gates.changeset_collapsed {
        println!(
            "Large changeset: {} changed lines across {} files",
            gates.total_changed_lines,
            state.files.len()
        );
    }
}

fn print_diff(state: &SessionState, path: &str) -> Result<()> {
    let Some(entry) = state.hunks_entry(path) else {
        bail!("{path} has no changes");
    };
    if let Some(err) = &entry.error {
        bail!("{err}");
    }
    for (index, hunk) in entry.hunks.iter().enumerate() {
        let side = if hunk.is_staged { "staged" } else { "unstaged" };
        println!("{} ({side})", hunk.header);
        let numbers = state.line_numbers(path, index).unwrap_or_default();
        for (line, n) in hunk.lines.iter().zip(numbers) {
            let old = n.old.map(|v| v.to_string()).unwrap_or_default();
            let new = n.new.map(|v| v.to_string()).unwrap_or_default();
            println!("{old:>5} {new:>5} {line}");
        }
    }
    Ok(())
}

async fn watch(controller: DiffSessionController) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    // No external watcher: the sender is kept alive so only the timer and
    // Ctrl-C drive the loop.
    let (_events_tx, events_rx) = tokio::sync::mpsc::channel(16);
    log::info!("Watching {} changed files, Ctrl-C to stop", controller.state.files.len());
    let controller = SessionDriver::new(controller).run(events_rx, cancel).await;

    let stale = controller.state.stale_files();
    if !stale.is_empty() {
        log::info!("{} files changed during review: {:?}", stale.len(), stale);
    }
    Ok(())
}
