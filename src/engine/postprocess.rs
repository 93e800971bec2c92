//! Deterministic cleanup of model-generated Markdown.
//!
//! Models sometimes wrap their answer in a ```` ```markdown ```` fence, emit
//! CRLF line endings or pad lines with spaces. These rules fix that without
//! touching content. Order matters: fences are stripped before line endings
//! are normalised so the fence regex sees the raw output.

use once_cell::sync::Lazy;
use regex::Regex;

static OUTER_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*```(?:markdown|md)?[ \t]*\r?\n(.*?)\r?\n```\s*\z").expect("valid regex")
});

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Apply every cleanup rule to one page of output.
pub fn clean_markdown(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = s
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let s = BLANK_RUN.replace_all(&s, "\n\n");
    let trimmed = s.trim_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Join cleaned pages into one document separated by blank lines.
pub fn join_pages(pages: &[String]) -> String {
    let parts: Vec<&str> = pages
        .iter()
        .map(|p| p.trim_end_matches('\n'))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    format!("{}\n", parts.join("\n\n"))
}

fn strip_outer_fence(input: &str) -> String {
    match OUTER_FENCE.captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}
