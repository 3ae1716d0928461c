//! Context-line expansion around hunks.
//!
//! Each hunk can grow a block of context above and below it. Blocks never
//! reach into a neighbouring hunk, a range is requested at most once, and only
//! one request per side is in flight.

use crate::domain::{DiffHunk, FileLines};
use crate::infra::diff::header_or_default;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpansionSide {
    Before,
    After,
}

/// Consecutive file lines shown next to a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    pub start_line: u32,
    pub lines: Vec<String>,
}

impl ContextBlock {
    pub fn end_line(&self) -> u32 {
        self.start_line + self.lines.len() as u32 - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HunkExpansion {
    pub before: Option<ContextBlock>,
    pub after: Option<ContextBlock>,
    /// The end of the file was reached below the hunk.
    pub after_exhausted: bool,
    auto_requested: bool,
    requested: BTreeSet<(ExpansionSide, u32, u32)>,
    in_flight: BTreeSet<ExpansionSide>,
}

/// A range of file lines to fetch for one side of one hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    pub file_path: String,
    pub hunk_id: String,
    pub side: ExpansionSide,
    pub from_parent_revision: bool,
    pub start_line: u32,
    pub end_line: u32,
}

impl ContextRequest {
    pub fn line_count(&self) -> usize {
        (self.end_line - self.start_line + 1) as usize
    }
}

/// First and last file line covered by `hunk` on the side being read.
fn hunk_span(hunk: &DiffHunk, from_parent_revision: bool) -> (u32, u32) {
    let header = header_or_default(hunk);
    if from_parent_revision {
        header.old_span()
    } else {
        header.new_span()
    }
}

/// Lines available between `hunks[index]` and its neighbours: the last line of
/// the previous hunk and the first line of the next, among hunks of the same
/// staged side.
fn neighbour_bounds(
    hunks: &[DiffHunk],
    index: usize,
    from_parent_revision: bool,
) -> (Option<u32>, Option<u32>) {
    let target = &hunks[index];
    let (first, last) = hunk_span(target, from_parent_revision);
    let mut prev_end = None;
    let mut next_start = None;

    for (i, hunk) in hunks.iter().enumerate() {
        if i == index || hunk.is_staged != target.is_staged {
            continue;
        }
        let (start, end) = hunk_span(hunk, from_parent_revision);
        if end < first {
            prev_end = Some(prev_end.map_or(end, |p: u32| p.max(end)));
        } else if start > last {
            // An empty span sits below line `end`, which its Before block owns.
            let start = start.min(end);
            next_start = Some(next_start.map_or(start, |n: u32| n.min(start)));
        }
    }
    (prev_end, next_start)
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    hunks: BTreeMap<(String, String), HunkExpansion>,
}

impl ExpansionState {
    pub fn get(&self, file_path: &str, hunk_id: &str) -> Option<&HunkExpansion> {
        self.hunks.get(&(file_path.to_string(), hunk_id.to_string()))
    }

    fn entry(&mut self, file_path: &str, hunk_id: &str) -> &mut HunkExpansion {
        self.hunks
            .entry((file_path.to_string(), hunk_id.to_string()))
            .or_default()
    }

    /// Requests issued the first time a hunk is rendered. Empty afterwards.
    pub fn auto_expand(
        &mut self,
        file_path: &str,
        hunks: &[DiffHunk],
        hunk_index: usize,
        lines: u32,
        from_parent_revision: bool,
    ) -> Vec<ContextRequest> {
        let Some(hunk) = hunks.get(hunk_index) else {
            return Vec::new();
        };
        let expansion = self.entry(file_path, &hunk.id);
        if expansion.auto_requested {
            return Vec::new();
        }
        expansion.auto_requested = true;

        [ExpansionSide::Before, ExpansionSide::After]
            .into_iter()
            .filter_map(|side| {
                self.plan(file_path, hunks, hunk_index, side, lines, from_parent_revision)
            })
            .collect()
    }

    /// Next range to fetch on `side` of `hunks[hunk_index]`, if any is left.
    pub fn plan(
        &mut self,
        file_path: &str,
        hunks: &[DiffHunk],
        hunk_index: usize,
        side: ExpansionSide,
        lines: u32,
        from_parent_revision: bool,
    ) -> Option<ContextRequest> {
        if lines == 0 {
            return None;
        }
        let hunk = hunks.get(hunk_index)?;
        let (first, last) = hunk_span(hunk, from_parent_revision);
        let (prev_end, next_start) = neighbour_bounds(hunks, hunk_index, from_parent_revision);
        let expansion = self.entry(file_path, &hunk.id);
        if expansion.in_flight.contains(&side) {
            return None;
        }

        let (start_line, end_line) = match side {
            ExpansionSide::Before => {
                let top = expansion.before.as_ref().map_or(first, |b| b.start_line);
                let end = top.checked_sub(1)?;
                let floor = prev_end.map_or(1, |p| p + 1);
                let start = end.saturating_sub(lines - 1).max(floor).max(1);
                (start, end)
            }
            ExpansionSide::After => {
                if expansion.after_exhausted {
                    return None;
                }
                let bottom = expansion.after.as_ref().map_or(last, |a| a.end_line());
                let start = bottom + 1;
                let ceiling = next_start.map_or(u32::MAX, |n| n.saturating_sub(1));
                let end = start.saturating_add(lines - 1).min(ceiling);
                (start, end)
            }
        };
        if start_line > end_line {
            return None;
        }
        if !expansion.requested.insert((side, start_line, end_line)) {
            log::debug!("Context {start_line}-{end_line} of {file_path} already requested");
            return None;
        }
        expansion.in_flight.insert(side);

        Some(ContextRequest {
            file_path: file_path.to_string(),
            hunk_id: hunk.id.clone(),
            side,
            from_parent_revision,
            start_line,
            end_line,
        })
    }

    /// Merges fetched lines into the block on the request's side.
    pub fn apply(&mut self, request: &ContextRequest, fetched: FileLines) {
        let Some(expansion) = self
            .hunks
            .get_mut(&(request.file_path.clone(), request.hunk_id.clone()))
        else {
            return;
        };
        expansion.in_flight.remove(&request.side);

        let fetched_count = fetched.lines.len();
        let numbered = fetched
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| (fetched.start_line + i as u32, line));

        match request.side {
            ExpansionSide::Before => {
                let existing_start = expansion.before.as_ref().map(|b| b.start_line);
                let fresh: Vec<(u32, String)> = numbered
                    .filter(|(n, _)| existing_start.is_none_or(|s| *n < s))
                    .collect();
                if fresh.is_empty() {
                    return;
                }
                let start_line = fresh[0].0;
                let mut lines: Vec<String> = fresh.into_iter().map(|(_, l)| l).collect();
                if let Some(block) = expansion.before.take() {
                    lines.extend(block.lines);
                }
                expansion.before = Some(ContextBlock { start_line, lines });
            }
            ExpansionSide::After => {
                if fetched_count < request.line_count() {
                    expansion.after_exhausted = true;
                }
                let existing_end = expansion.after.as_ref().map(ContextBlock::end_line);
                let fresh: Vec<(u32, String)> = numbered
                    .filter(|(n, _)| existing_end.is_none_or(|e| *n > e))
                    .collect();
                let Some(&(first_fresh, _)) = fresh.first() else {
                    return;
                };
                let fresh_lines = fresh.into_iter().map(|(_, l)| l);
                match expansion.after.as_mut() {
                    Some(block) => block.lines.extend(fresh_lines),
                    None => {
                        expansion.after = Some(ContextBlock {
                            start_line: first_fresh,
                            lines: fresh_lines.collect(),
                        })
                    }
                }
            }
        }
    }

    /// A failed fetch may be retried.
    pub fn fail(&mut self, request: &ContextRequest) {
        if let Some(expansion) = self
            .hunks
            .get_mut(&(request.file_path.clone(), request.hunk_id.clone()))
        {
            expansion.in_flight.remove(&request.side);
            expansion
                .requested
                .remove(&(request.side, request.start_line, request.end_line));
        }
    }

    /// Drops expansions of hunks that are no longer part of `file_path`.
    pub fn prune_file(&mut self, file_path: &str, hunks: &[DiffHunk]) {
        self.hunks.retain(|(path, hunk_id), _| {
            path != file_path || hunks.iter().any(|h| &h.id == hunk_id)
        });
    }

    pub fn retain_files(&mut self, keep: impl Fn(&str) -> bool) {
        self.hunks.retain(|(path, _), _| keep(path));
    }

    pub fn clear(&mut self) {
        self.hunks.clear();
    }
}
