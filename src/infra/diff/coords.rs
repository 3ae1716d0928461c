//! Mapping between hunk-line indices and real file line numbers.
//!
//! A hunk header `@@ -old_start[,old_count] +new_start[,new_count] @@` fixes the
//! first line on each side; walking the lines advances the old counter on `-`,
//! the new counter on `+`, and both on context.

use crate::domain::DiffHunk;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Parsed hunk header ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
}

impl Default for HunkHeader {
    fn default() -> Self {
        Self {
            old_start: 1,
            old_count: 1,
            new_start: 1,
            new_count: 1,
        }
    }
}

impl HunkHeader {
    /// First and last new-side line covered by the hunk.
    ///
    /// For a hunk with no new-side lines the span is empty and sits right after
    /// `new_start` (`first == last + 1`).
    pub fn new_span(&self) -> (u32, u32) {
        span(self.new_start, self.new_count)
    }

    /// Same as [`Self::new_span`] for the old side.
    pub fn old_span(&self) -> (u32, u32) {
        span(self.old_start, self.old_count)
    }
}

fn span(start: u32, count: u32) -> (u32, u32) {
    if count == 0 {
        (start + 1, start)
    } else {
        (start, start + count - 1)
    }
}

/// Old/new file line numbers of one hunk line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineNumbers {
    pub old: Option<u32>,
    pub new: Option<u32>,
}

impl LineNumbers {
    /// The line number used for anchoring comments: new side if present, else old.
    pub fn real(&self) -> Option<u32> {
        self.new.or(self.old)
    }
}

/// Parses a hunk header; a missing count defaults to 1.
pub fn parse_hunk_header(header: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER.captures(header)?;
    let num = |idx: usize| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };
    Some(HunkHeader {
        old_start: num(1)?,
        old_count: num(2)?,
        new_start: num(3)?,
        new_count: num(4)?,
    })
}

/// Header of `hunk`, falling back to starts of 1 when unparseable.
pub fn header_or_default(hunk: &DiffHunk) -> HunkHeader {
    parse_hunk_header(&hunk.header).unwrap_or_default()
}

/// One `LineNumbers` per entry of `hunk.lines`, in order.
pub fn compute_line_numbers(hunk: &DiffHunk) -> Vec<LineNumbers> {
    let header = header_or_default(hunk);
    let mut old_line = header.old_start;
    let mut new_line = header.new_start;

    hunk.lines
        .iter()
        .map(|line| {
            if line.starts_with('+') {
                let numbers = LineNumbers {
                    old: None,
                    new: Some(new_line),
                };
                new_line += 1;
                numbers
            } else if line.starts_with('-') {
                let numbers = LineNumbers {
                    old: Some(old_line),
                    new: None,
                };
                old_line += 1;
                numbers
            } else {
                let numbers = LineNumbers {
                    old: Some(old_line),
                    new: Some(new_line),
                };
                old_line += 1;
                new_line += 1;
                numbers
            }
        })
        .collect()
}

/// Real line number of `hunk.lines[line_index]`.
pub fn real_line_number(hunk: &DiffHunk, line_index: usize) -> Option<u32> {
    compute_line_numbers(hunk)
        .get(line_index)
        .and_then(LineNumbers::real)
}
