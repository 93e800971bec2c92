//! Default model and instruction sent to the conversion engine.
//!
//! Callers can override both via [`crate::config::BatchConfig`]; the
//! constants here are used only when no override is provided.

/// Model identifier used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default extraction instruction for every engine invocation.
pub const DEFAULT_INSTRUCTION: &str = "Convert the document to clean, well-formatted Markdown. \
Use standard Markdown syntax for tables, headings, lists, and other elements. \
Do not include HTML tags.";

/// Build the context message passed alongside a page when formatting must
/// stay consistent with the previous page.
pub fn maintain_format_context(prior_page: &str) -> String {
    format!(
        "Markdown must maintain consistent formatting with the following page:\n\n\"\"\"{}\"\"\"",
        prior_page
    )
}
