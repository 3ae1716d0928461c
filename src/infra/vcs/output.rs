use once_cell::sync::Lazy;
use regex::Regex;

// `[main 1a2b3c4] message` as printed by `git commit`.
static BRACKETED_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\s([0-9a-f]{7,40})\]").expect("valid commit regex"));
static BARE_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9a-f]{7,40})\b").expect("valid hash regex"));

/// Finds the commit hash in a VCS command's output.
pub fn extract_commit_hash(output: &str) -> Option<String> {
    BRACKETED_HASH
        .captures(output)
        .or_else(|| BARE_HASH.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First non-empty line, for notification descriptions.
pub fn summary_line(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
