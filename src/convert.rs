//! Batch conversion entry points.
//!
//! [`convert_directory`] is the one-call API: it wires the bundled
//! [`VisionEngine`] into a [`ConversionPipeline`] and returns every per-file
//! result plus a summary. Use [`convert_directory_with_engine`] to supply a
//! different engine.

use crate::config::{BatchConfig, Credential};
use crate::engine::{ConversionEngine, VisionEngine};
use crate::error::Docs2MdError;
use crate::output::BatchOutput;
use crate::pipeline::ConversionPipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Convert every supported document under `input_dir` into `output_dir`
/// using the default [`VisionEngine`].
///
/// # Errors
/// Returns `Err(Docs2MdError)` only for setup failures: missing input
/// directory or an output directory that cannot be created. Per-file
/// failures, including a missing credential, are reported in the output.
pub async fn convert_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    credential: Option<&Credential>,
    config: &BatchConfig,
) -> Result<BatchOutput, Docs2MdError> {
    convert_directory_with_engine(
        Arc::new(VisionEngine::default()),
        input_dir,
        output_dir,
        credential,
        config,
    )
    .await
}

/// Like [`convert_directory`], with a caller-supplied engine.
pub async fn convert_directory_with_engine(
    engine: Arc<dyn ConversionEngine>,
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    credential: Option<&Credential>,
    config: &BatchConfig,
) -> Result<BatchOutput, Docs2MdError> {
    let start = Instant::now();
    let (input_dir, output_dir) = (input_dir.as_ref(), output_dir.as_ref());
    info!(
        "Starting batch: {} → {}",
        input_dir.display(),
        output_dir.display()
    );

    let pipeline = ConversionPipeline::new(engine, config.clone());
    let results = pipeline
        .convert_all(input_dir, output_dir, credential)
        .await?;
    let output = BatchOutput::new(results);

    info!(
        "Batch complete: {}/{} files in {}ms",
        output.summary.succeeded,
        output.summary.total,
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_directory_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    credential: Option<&Credential>,
    config: &BatchConfig,
) -> Result<BatchOutput, Docs2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Docs2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(input_dir, output_dir, credential, config))
}

/// Timestamped sibling of `input_dir`: `<parent>/<name>_<timestamp>`.
///
/// `input_dir` should be absolute so the parent is meaningful.
pub fn timestamped_output_dir(input_dir: &Path, timestamp: &str) -> PathBuf {
    let name = input_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let parent = input_dir.parent().unwrap_or(input_dir);
    parent.join(format!("{name}_{timestamp}"))
}
