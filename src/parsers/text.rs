use regex::Regex;
use std::sync::LazyLock;

/// Integers and decimals, with optional thousands separators
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").expect("number pattern is valid"));

/// Normalises plain text for comparison
///
/// Lines are trimmed, blank lines dropped and runs of whitespace collapsed
/// to single spaces, so reflowed text compares equal.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    normalize_whitespace_in_segment(&lines.join(" "))
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes numbers from text, collapsing the whitespace left behind
pub fn strip_numbers(text: &str) -> String {
    let stripped = NUMBER_RE.replace_all(text, "");
    normalize_whitespace_in_segment(&stripped)
}
