//! Terminal sinks that receive a finished review.

use crate::infra::vcs::traits::TerminalSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Writes injected text to the process's standard output.
#[derive(Debug, Default, Clone)]
pub struct StdoutTerminal;

#[async_trait]
impl TerminalSink for StdoutTerminal {
    async fn inject(&self, workspace_id: &str, text: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(text.as_bytes())
            .await
            .with_context(|| format!("write review for workspace {workspace_id}"))?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;
        Ok(())
    }
}

/// Appends injected text to a file, one review after another.
#[derive(Debug, Clone)]
pub struct FileTerminal {
    path: PathBuf,
}

impl FileTerminal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TerminalSink for FileTerminal {
    async fn inject(&self, workspace_id: &str, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("open {}", self.path.display()))?;
        file.write_all(text.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        log::debug!(
            "Injected {} bytes for workspace {} into {}",
            text.len(),
            workspace_id,
            self.path.display()
        );
        Ok(())
    }
}
