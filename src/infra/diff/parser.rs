use crate::domain::DiffHunk;
use anyhow::Result;
use unidiff::PatchSet;

const NO_NEWLINE_MARKER: &str = "\\";

pub fn normalize_diff_path(path: &str) -> String {
    path.trim()
        .trim_start_matches("./")
        .trim_start_matches("a/")
        .trim_start_matches("b/")
        .to_string()
}

/// Stable hunk id: the side plus the header ranges.
pub fn hunk_id(is_staged: bool, old: (usize, usize), new: (usize, usize)) -> String {
    let side = if is_staged { "staged" } else { "unstaged" };
    format!("{side}:-{},{}+{},{}", old.0, old.1, new.0, new.1)
}

/// Parses `git diff` output for a single file into hunks.
pub fn parse_file_hunks(diff_text: &str, is_staged: bool) -> Result<Vec<DiffHunk>> {
    let trimmed = diff_text.trim_end();
    if trimmed.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut patch_set = PatchSet::new();
    patch_set.parse(trimmed)?;

    let mut hunks = Vec::new();
    for file in patch_set.files() {
        let mut file_path = normalize_diff_path(&file.target_file);
        if file_path == "dev/null" || file_path == "/dev/null" {
            file_path = normalize_diff_path(&file.source_file);
        }

        for hunk in file.hunks() {
            let old = (hunk.source_start, hunk.source_length);
            let new = (hunk.target_start, hunk.target_length);
            let header = format!("@@ -{},{} +{},{} @@", old.0, old.1, new.0, new.1);
            let lines: Vec<String> = hunk
                .lines()
                .iter()
                .filter(|line| line.line_type != NO_NEWLINE_MARKER)
                .map(|line| format!("{}{}", line.line_type, line.value))
                .collect();

            let mut raw_patch = format!("--- a/{file_path}\n+++ b/{file_path}\n{header}\n");
            for line in &lines {
                raw_patch.push_str(line);
                raw_patch.push('\n');
            }

            hunks.push(DiffHunk {
                id: hunk_id(is_staged, old, new),
                header,
                lines,
                is_staged,
                raw_patch,
            });
        }
    }
    Ok(hunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
+    println!(\"hello\");
     let x = 1;
 }
";

    #[test]
    fn parses_single_hunk() {
        let hunks = parse_file_hunks(DIFF, false).unwrap();
        assert_eq!(hunks.len(), 1);
        let hunk = &hunks[0];
        assert_eq!(hunk.header, "@@ -1,3 +1,4 @@");
        assert_eq!(hunk.id, "unstaged:-1,3+1,4");
        assert_eq!(hunk.lines.len(), 4);
        assert_eq!(hunk.lines[1], "+    println!(\"hello\");");
        assert!(hunk.raw_patch.starts_with("--- a/src/main.rs\n+++ b/src/main.rs\n@@"));
    }

    #[test]
    fn empty_diff_has_no_hunks() {
        assert!(parse_file_hunks("\n", true).unwrap().is_empty());
    }

    #[test]
    fn normalizes_prefixed_paths() {
        assert_eq!(normalize_diff_path("b/src/lib.rs"), "src/lib.rs");
        assert_eq!(normalize_diff_path("./a.txt"), "a.txt");
    }
}
