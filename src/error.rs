//! Error types for the edgequake-docs2md library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`Docs2MdError`] — **Fatal**: the batch cannot start at all (input
//!   directory missing, output root cannot be created, invalid config).
//!   Returned as `Err(Docs2MdError)` from the top-level `convert*` functions.
//!
//! * [`EngineError`] — **Per-invocation**: the conversion engine failed on a
//!   single file. Engines return it from
//!   [`crate::engine::ConversionEngine::convert`]; the pipeline turns it into
//!   data inside [`crate::output::ConversionResult`].
//!
//! * [`TaskError`] — **Per-file, pipeline side**: the pipeline's own work
//!   around one file failed (target directory creation, artifact rename).
//!   Also recorded as data, never propagated.
//!
//! One bad file never aborts the batch; only `Docs2MdError` does.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the batch entry points.
#[derive(Debug, Error)]
pub enum Docs2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Input path exists but is not a directory.
    #[error("Input path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Walking the input tree failed at the root.
    #[error("Failed to read input directory '{path}': {source}")]
    DiscoveryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output root directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Credential errors ─────────────────────────────────────────────────
    /// No API credential was supplied for the run.
    #[error("API credential is not set.\nSet OPENAI_API_KEY or pass --api-key.")]
    MissingCredential,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure raised by a conversion engine for one source file.
///
/// The pipeline does not branch on the variant; only the `Display` text is
/// kept in the file's [`crate::output::ConversionResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source could not be turned into a PDF for rasterisation.
    #[error("Office conversion failed for '{path}': {detail}")]
    OfficeConversion { path: PathBuf, detail: String },

    /// pdfium could not open or rasterise the document.
    #[error("Rasterisation failed for '{path}': {detail}")]
    Render { path: PathBuf, detail: String },

    /// The document has no pages to convert.
    #[error("Document '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// The LLM provider could not be created.
    #[error("LLM provider is not configured: {0}")]
    ProviderNotConfigured(String),

    /// The LLM call for a page failed.
    #[error("LLM call failed on page {page}: {detail}")]
    Llm { page: usize, detail: String },

    /// Reading or writing engine files failed.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other engine failure.
    #[error("{0}")]
    Other(String),
}

/// A per-file failure raised by the pipeline around the engine call.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The source file does not live under the input root.
    #[error("'{path}' is not under input root '{root}'")]
    OutsideInputRoot { path: PathBuf, root: PathBuf },

    /// The mirrored target directory could not be created.
    #[error("Failed to create target directory '{path}': {source}")]
    CreateTargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scanning the target directory for artifacts failed.
    #[error("Failed to scan '{path}' for Markdown output: {source}")]
    ScanArtifacts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stale canonical artifact could not be removed.
    #[error("Failed to remove stale '{path}': {source}")]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fresh artifact could not be renamed to its canonical name.
    #[error("Failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine reported success but left no Markdown file behind.
    #[error("Engine produced no Markdown output in '{dir}'")]
    NoArtifact { dir: PathBuf },

    /// The engine raised an error.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
