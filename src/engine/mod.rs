//! The conversion engine seam.
//!
//! The pipeline knows nothing about how a document becomes Markdown. It hands
//! an [`EngineInvocation`] to a [`ConversionEngine`] and, once the call
//! returns, looks in the target directory for what the engine wrote.
//!
//! [`VisionEngine`] is the bundled implementation:
//!
//! ```text
//! source ──▶ office ──▶ render ──▶ llm ──▶ postprocess ──▶ <name>.md
//!           (soffice)  (pdfium)   (VLM)    (cleanup)
//! ```
//!
//! 1. [`office`] — convert non-PDF sources to PDF with LibreOffice
//! 2. [`render`] — rasterise pages and wrap them as base64 PNGs
//! 3. [`llm`]    — one vision call per page
//! 4. [`postprocess`] — deterministic cleanup of model output

pub mod llm;
pub mod office;
pub mod postprocess;
pub mod render;
mod vision;

pub use vision::VisionEngine;

use crate::config::{BatchConfig, Credential};
use crate::error::EngineError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything an engine needs to convert one file.
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    /// File to convert.
    pub source: PathBuf,
    /// Secret authorising the call.
    pub credential: Credential,
    /// Directory the engine writes its Markdown into.
    pub output_dir: PathBuf,
    /// Remove intermediate files once done.
    pub cleanup: bool,
    /// Upper bound on the engine's own parallel work for this file.
    pub concurrency: usize,
    /// Keep formatting consistent across pages.
    pub maintain_format: bool,
    /// Model identifier.
    pub model: String,
    /// Extraction instruction.
    pub instruction: String,
}

impl EngineInvocation {
    /// Build an invocation from the batch configuration.
    pub fn new(
        source: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        credential: &Credential,
        config: &BatchConfig,
    ) -> Self {
        Self {
            source: source.into(),
            credential: credential.clone(),
            output_dir: output_dir.into(),
            cleanup: config.cleanup,
            concurrency: config.concurrency,
            maintain_format: config.maintain_format,
            model: config.model.clone(),
            instruction: config.instruction.clone(),
        }
    }
}

/// Converts one document into one or more Markdown files.
///
/// On `Ok(())` the engine has written its output into
/// `invocation.output_dir` under a name of its choosing. Any error fails the
/// file; the pipeline keeps only the error's `Display` text.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    async fn convert(&self, invocation: &EngineInvocation) -> Result<(), EngineError>;
}
