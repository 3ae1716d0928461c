use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A review comment anchored to a line range of one hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComment {
    pub id: String,
    pub file_path: String,
    pub hunk_id: String,
    /// 1-indexed real file line, `start_line <= end_line`.
    pub start_line: u32,
    pub end_line: u32,
    /// Text of the commented lines at the time the comment was written.
    pub line_content: Vec<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl LineComment {
    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    /// `path:line` or `path:start:end`.
    pub fn location(&self) -> String {
        if self.is_single_line() {
            format!("{}:{}", self.file_path, self.start_line)
        } else {
            format!("{}:{}:{}", self.file_path, self.start_line, self.end_line)
        }
    }
}

/// Anchor prepared by the caller before the comment text is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub file_path: String,
    pub hunk_id: String,
    pub start_line: u32,
    pub end_line: u32,
    pub line_content: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_formats_single_and_range() {
        let mut comment = LineComment {
            id: "c1".into(),
            file_path: "src/lib.rs".into(),
            hunk_id: "h".into(),
            start_line: 4,
            end_line: 4,
            line_content: vec![],
            text: "x".into(),
            created_at: Utc::now(),
        };
        assert_eq!(comment.location(), "src/lib.rs:4");
        comment.end_line = 9;
        assert_eq!(comment.location(), "src/lib.rs:4:9");
    }
}
