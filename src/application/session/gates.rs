//! Large-diff gates. Purely presentational: hunks are always fetched.

use crate::domain::{FileChange, HunkMap};
use crate::infra::app_config::SessionConfig;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffGates {
    pub total_changed_lines: usize,
    /// The whole multi-file view sits behind one "Large changeset" gate.
    pub changeset_collapsed: bool,
    /// Files shown behind a "View changes" affordance.
    pub collapsed_files: BTreeSet<String>,
}

impl DiffGates {
    pub fn is_file_collapsed(&self, file_path: &str) -> bool {
        self.collapsed_files.contains(file_path)
    }
}

pub fn compute_gates(
    files: &[FileChange],
    hunks: &HunkMap,
    config: &SessionConfig,
    revealed_files: &BTreeSet<String>,
    changeset_revealed: bool,
) -> DiffGates {
    let mut gates = DiffGates::default();
    for file in files {
        let changed = hunks
            .get(&file.path)
            .map(|entry| entry.changed_line_count())
            .unwrap_or(0);
        gates.total_changed_lines += changed;
        if changed > config.file_collapse_threshold && !revealed_files.contains(&file.path) {
            gates.collapsed_files.insert(file.path.clone());
        }
    }
    gates.changeset_collapsed =
        gates.total_changed_lines > config.changeset_collapse_threshold && !changeset_revealed;
    gates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiffHunk, FileHunksEntry};

    fn entry(path: &str, added: usize) -> FileHunksEntry {
        FileHunksEntry::loaded(
            path,
            vec![DiffHunk {
                id: "h".into(),
                header: format!("@@ -0,0 +1,{added} @@"),
                lines: vec!["+x".to_string(); added],
                is_staged: false,
                raw_patch: String::new(),
            }],
        )
    }

    fn file(path: &str) -> FileChange {
        FileChange {
            path: path.into(),
            staged_status: None,
            work_tree_status: Some('M'),
            is_untracked: false,
        }
    }

    #[test]
    fn thresholds_are_exclusive() {
        let config = SessionConfig::default();
        let files = vec![file("small.rs"), file("big.rs")];
        let mut hunks = HunkMap::new();
        hunks.insert("small.rs".into(), entry("small.rs", 250));
        hunks.insert("big.rs".into(), entry("big.rs", 251));

        let gates = compute_gates(&files, &hunks, &config, &BTreeSet::new(), false);
        assert_eq!(gates.total_changed_lines, 501);
        assert!(!gates.is_file_collapsed("small.rs"));
        assert!(gates.is_file_collapsed("big.rs"));
        assert!(!gates.changeset_collapsed);
    }

    #[test]
    fn reveal_lifts_gates() {
        let config = SessionConfig::default();
        let files = vec![file("a.rs"), file("b.rs"), file("c.rs"), file("d.rs"), file("e.rs")];
        let mut hunks = HunkMap::new();
        for f in &files {
            hunks.insert(f.path.clone(), entry(&f.path, 240));
        }

        let gates = compute_gates(&files, &hunks, &config, &BTreeSet::new(), false);
        assert!(gates.changeset_collapsed);

        let revealed = BTreeSet::from(["a.rs".to_string()]);
        let gates = compute_gates(&files, &hunks, &config, &revealed, true);
        assert!(!gates.changeset_collapsed);
        assert!(gates.collapsed_files.is_empty());
    }
}
