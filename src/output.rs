//! Result types for batch conversion.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of converting one file.
///
/// `error()` is `Some` exactly when `success()` is `false`; the constructors
/// are the only way to build a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    file_path: PathBuf,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<PathBuf>,
    duration_ms: u64,
}

impl ConversionResult {
    /// A successful conversion; `output_path` is the canonical artifact if
    /// one was found.
    pub fn succeeded(
        file_path: impl Into<PathBuf>,
        output_path: Option<PathBuf>,
        duration_ms: u64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            success: true,
            error: None,
            output_path,
            duration_ms,
        }
    }

    /// A failed conversion with a human-readable description.
    pub fn failed(file_path: impl Into<PathBuf>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            file_path: file_path.into(),
            success: false,
            error: Some(error.into()),
            output_path: None,
            duration_ms,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Aggregate counts over one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Sum of per-file durations.
    pub total_duration_ms: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[ConversionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_duration_ms: results.iter().map(|r| r.duration_ms()).sum(),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Every per-file result of a batch, in discovery order, plus its summary.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub results: Vec<ConversionResult>,
    pub summary: BatchSummary,
}

impl BatchOutput {
    pub fn new(results: Vec<ConversionResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self { results, summary }
    }

    /// Failed results, in discovery order.
    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.success())
    }
}
