//! `git` command-line implementation of [`VcsBackend`].

use super::traits::{HunkLineSelection, VcsBackend};
use crate::domain::{DiffHunk, DiscardTarget, FileLines};
use crate::infra::diff::parser::parse_file_hunks;
use crate::infra::diff::{PatchDirection, build_partial_patch};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DIFF_ARGS: [&str; 4] = ["diff", "--no-color", "--no-ext-diff", "-U3"];

#[derive(Debug, Clone)]
pub struct GitCliBackend {
    git: PathBuf,
}

impl GitCliBackend {
    /// Locates `git` on the `PATH`.
    pub fn new() -> Result<Self> {
        let git = which::which("git").context("git executable not found on PATH")?;
        Ok(Self { git })
    }

    pub fn with_binary(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }

    fn command(&self, workspace: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.arg("-C").arg(workspace).args(args);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run(&self, workspace: &Path, args: &[&str]) -> Result<String> {
        self.run_accepting(workspace, args, &[0]).await
    }

    /// Runs git, treating any of `ok_codes` as success.
    async fn run_accepting(&self, workspace: &Path, args: &[&str], ok_codes: &[i32]) -> Result<String> {
        let output = self
            .command(workspace, args)
            .output()
            .await
            .with_context(|| format!("run git {}", args.join(" ")))?;

        let code = output.status.code().unwrap_or(-1);
        if !ok_codes.contains(&code) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }
        Ok(text)
    }

    async fn run_with_stdin(&self, workspace: &Path, args: &[&str], input: &str) -> Result<String> {
        let mut child = self
            .command(workspace, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context("write patch to git stdin")?;
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("wait for git {}", args.join(" ")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn is_untracked(&self, workspace: &Path, file_path: &str) -> Result<bool> {
        let out = self
            .run(
                workspace,
                &["ls-files", "--others", "--exclude-standard", "--", file_path],
            )
            .await?;
        Ok(!out.trim().is_empty())
    }

    async fn apply_selections(
        &self,
        workspace: &Path,
        file_path: &str,
        selections: &[HunkLineSelection],
        direction: PatchDirection,
    ) -> Result<String> {
        let mut args = vec!["apply", "--cached", "--whitespace=nowarn"];
        if direction == PatchDirection::Unstage {
            args.push("--reverse");
        }
        args.push("-");

        let parts: Vec<(&DiffHunk, &[usize])> = selections
            .iter()
            .map(|s| (&s.hunk, s.line_indices.as_slice()))
            .collect();
        let patch = build_partial_patch(file_path, &parts, direction)
            .ok_or_else(|| anyhow!("no changed lines selected in {file_path}"))?;
        self.run_with_stdin(workspace, &args, &patch.text)
            .await
            .with_context(|| format!("apply partial patch to {file_path}"))?;

        let verb = match direction {
            PatchDirection::Stage => "Staged",
            PatchDirection::Unstage => "Unstaged",
        };
        Ok(format!(
            "{verb} lines in {} hunk(s) of {file_path}",
            patch.hunk_count
        ))
    }
}

fn slice_lines(content: &str, start_line: u32, end_line: u32) -> FileLines {
    let all: Vec<&str> = content.lines().collect();
    let start = start_line.max(1);
    let first = (start - 1) as usize;
    let last = (end_line as usize).min(all.len());
    let lines: Vec<String> = if first < last {
        all[first..last].iter().map(|l| l.to_string()).collect()
    } else {
        Vec::new()
    };
    let end = start + lines.len() as u32 - 1;
    FileLines {
        lines,
        start_line: start,
        end_line: end,
    }
}

#[async_trait]
impl VcsBackend for GitCliBackend {
    async fn list_changed_files(&self, workspace: &Path) -> Result<Vec<String>> {
        let out = self
            .run(
                workspace,
                &["status", "--porcelain=v1", "--untracked-files=all"],
            )
            .await?;
        Ok(out
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn get_file_hunks(&self, workspace: &Path, file_path: &str) -> Result<Vec<DiffHunk>> {
        let mut unstaged_args = DIFF_ARGS.to_vec();
        unstaged_args.extend(["--", file_path]);
        let unstaged = self.run(workspace, &unstaged_args).await?;

        let mut staged_args = DIFF_ARGS.to_vec();
        staged_args.extend(["--cached", "--", file_path]);
        let staged = self.run(workspace, &staged_args).await?;

        let mut hunks = parse_file_hunks(&unstaged, false)
            .with_context(|| format!("parse unstaged diff of {file_path}"))?;
        hunks.extend(
            parse_file_hunks(&staged, true)
                .with_context(|| format!("parse staged diff of {file_path}"))?,
        );

        if hunks.is_empty() && self.is_untracked(workspace, file_path).await? {
            let mut args = DIFF_ARGS.to_vec();
            args.extend(["--no-index", "--", "/dev/null", file_path]);
            // `--no-index` exits with 1 when the inputs differ.
            let out = self.run_accepting(workspace, &args, &[0, 1]).await?;
            hunks = parse_file_hunks(&out, false)
                .with_context(|| format!("parse untracked diff of {file_path}"))?;
        }
        Ok(hunks)
    }

    async fn get_file_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        from_parent_revision: bool,
        start_line: u32,
        end_line: u32,
    ) -> Result<FileLines> {
        let content = if from_parent_revision {
            let object = format!("HEAD:{file_path}");
            self.run(workspace, &["show", &object]).await?
        } else {
            let path = workspace.join(file_path);
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("read {}", path.display()))?
        };
        Ok(slice_lines(&content, start_line, end_line))
    }

    async fn stage_files(&self, workspace: &Path, paths: &[String]) -> Result<String> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(workspace, &args).await?;
        Ok(format!("Staged {} file(s)", paths.len()))
    }

    async fn unstage_files(&self, workspace: &Path, paths: &[String]) -> Result<String> {
        let mut args = vec!["restore", "--staged", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(workspace, &args).await?;
        Ok(format!("Unstaged {} file(s)", paths.len()))
    }

    async fn discard_files(&self, workspace: &Path, targets: &[DiscardTarget]) -> Result<String> {
        let (untracked, tracked): (Vec<_>, Vec<_>) =
            targets.iter().partition(|target| target.is_untracked);

        if !tracked.is_empty() {
            let mut args = vec!["checkout", "--"];
            args.extend(tracked.iter().map(|t| t.path.as_str()));
            self.run(workspace, &args).await?;
        }
        if !untracked.is_empty() {
            let mut args = vec!["clean", "-f", "--"];
            args.extend(untracked.iter().map(|t| t.path.as_str()));
            self.run(workspace, &args).await?;
        }
        Ok(format!("Discarded {} file(s)", targets.len()))
    }

    async fn stage_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        selections: &[HunkLineSelection],
    ) -> Result<String> {
        self.apply_selections(workspace, file_path, selections, PatchDirection::Stage)
            .await
    }

    async fn unstage_lines(
        &self,
        workspace: &Path,
        file_path: &str,
        selections: &[HunkLineSelection],
    ) -> Result<String> {
        self.apply_selections(workspace, file_path, selections, PatchDirection::Unstage)
            .await
    }

    async fn commit(&self, workspace: &Path, message: &str) -> Result<String> {
        self.run(workspace, &["commit", "-m", message]).await
    }

    async fn commit_paths(
        &self,
        workspace: &Path,
        message: &str,
        paths: &[String],
    ) -> Result<String> {
        let mut args = vec!["commit", "--only", "-m", message, "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(workspace, &args).await
    }

    async fn commit_amend(&self, workspace: &Path, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return self.run(workspace, &["commit", "--amend", "--no-edit"]).await;
        }
        self.run(workspace, &["commit", "--amend", "-m", message])
            .await
    }

    async fn push(&self, workspace: &Path) -> Result<String> {
        self.run(workspace, &["push"]).await
    }

    async fn pull(&self, workspace: &Path) -> Result<String> {
        self.run(workspace, &["pull", "--ff-only"]).await
    }
}
