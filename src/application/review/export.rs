//! Markdown rendering of a review.
//!
//! The output is pasted verbatim into agent prompts, so heading text, fence
//! style and the `> ` quote prefix are fixed.

use crate::domain::LineComment;

pub const TITLE_HEADING: &str = "## Code Review";
pub const SUMMARY_HEADING: &str = "### Summary";
pub const COMMENTS_HEADING: &str = "### Comments";
pub const OUTDATED_HEADING: &str = "### Outdated comments";

pub struct ReviewExporter;

impl ReviewExporter {
    /// Full review: title, optional summary, then comments grouped by file.
    pub fn format_as_markdown(comments: &[LineComment], summary: &str) -> String {
        let mut md = String::new();
        md.push_str(TITLE_HEADING);
        md.push_str("\n\n");

        let summary = summary.trim();
        if !summary.is_empty() {
            md.push_str(SUMMARY_HEADING);
            md.push_str("\n\n");
            md.push_str(summary);
            md.push_str("\n\n");
        }

        if !comments.is_empty() {
            md.push_str(COMMENTS_HEADING);
            md.push_str("\n\n");
            for comment in Self::grouped_by_file(comments) {
                md.push_str(&Self::render_comment(comment));
            }
        }

        md.trim_end().to_string() + "\n"
    }

    /// Comments that lost their anchor, rendered for the summary field.
    pub fn format_outdated_block(comments: &[LineComment]) -> String {
        if comments.is_empty() {
            return String::new();
        }
        let mut md = String::new();
        md.push_str(OUTDATED_HEADING);
        md.push_str("\n\n");
        for comment in Self::grouped_by_file(comments) {
            md.push_str(&Self::render_comment(comment));
        }
        md.trim_end().to_string()
    }

    /// Appends the outdated block to `summary`, separated by a blank line.
    pub fn append_outdated_to_summary(summary: &str, orphans: &[LineComment]) -> String {
        let block = Self::format_outdated_block(orphans);
        if block.is_empty() {
            return summary.to_string();
        }
        let existing = summary.trim_end();
        if existing.is_empty() {
            block
        } else {
            format!("{existing}\n\n{block}")
        }
    }

    pub fn render_comment(comment: &LineComment) -> String {
        let mut md = String::new();
        md.push_str(&format!("**{}**\n\n", comment.location()));

        if !comment.line_content.is_empty() {
            let fence = Self::fence_for(&comment.line_content);
            md.push_str(&fence);
            md.push('\n');
            for line in &comment.line_content {
                md.push_str(line);
                md.push('\n');
            }
            md.push_str(&fence);
            md.push_str("\n\n");
        }

        for line in comment.text.lines() {
            if line.is_empty() {
                md.push_str(">\n");
            } else {
                md.push_str(&format!("> {line}\n"));
            }
        }
        md.push('\n');
        md
    }

    /// File order follows first appearance; within a file, comments sort by line.
    fn grouped_by_file(comments: &[LineComment]) -> Vec<&LineComment> {
        let mut files: Vec<&str> = Vec::new();
        for comment in comments {
            if !files.contains(&comment.file_path.as_str()) {
                files.push(&comment.file_path);
            }
        }

        let mut ordered = Vec::with_capacity(comments.len());
        for file in files {
            let mut in_file: Vec<&LineComment> =
                comments.iter().filter(|c| c.file_path == file).collect();
            in_file.sort_by_key(|c| (c.start_line, c.end_line));
            ordered.extend(in_file);
        }
        ordered
    }

    // Snapshots may themselves contain backtick fences.
    fn fence_for(lines: &[String]) -> String {
        let longest = lines
            .iter()
            .map(|line| {
                let mut run = 0;
                let mut best = 0;
                for ch in line.chars() {
                    if ch == '`' {
                        run += 1;
                        best = best.max(run);
                    } else {
                        run = 0;
                    }
                }
                best
            })
            .max()
            .unwrap_or(0);
        "`".repeat(longest.max(2) + 1)
    }
}
