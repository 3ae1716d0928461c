use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Tunables of a diff session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Interval of the background re-validation timer.
    pub poll_interval_secs: u64,
    /// Files with more added+deleted lines start collapsed.
    pub file_collapse_threshold: usize,
    /// Changesets with more added+deleted lines start behind a single gate.
    pub changeset_collapse_threshold: usize,
    /// Context lines fetched around a hunk on first render.
    pub auto_context_lines: u32,
    /// Lines added per manual "expand more".
    pub expand_step: u32,
    pub max_commit_message_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            file_collapse_threshold: 250,
            changeset_collapse_threshold: 1000,
            auto_context_lines: 10,
            expand_step: 25,
            max_commit_message_len: 500,
        }
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

pub fn load_config() -> SessionConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &std::path::Path) -> SessionConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return SessionConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring invalid config at {}: {}", path.display(), err);
            SessionConfig::default()
        }
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFDESK_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

pub fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("DIFFDESK_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("diffdesk");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("diffdesk");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("diffdesk");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("diffdesk");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".diffdesk")
}
