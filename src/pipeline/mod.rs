//! The conversion orchestration pipeline.
//!
//! ## Data Flow
//!
//! ```text
//! discovery ──▶ task ──▶ engine ──▶ artifact ──▶ ConversionResult
//! (walk tree)  (paths)   (convert)  (find+rename)
//! ```
//!
//! Files are processed strictly one after another: task N+1 starts only
//! after task N's result is recorded, so results come out in discovery order
//! and the output tree is never written by two tasks at once. A failing file
//! becomes a failed [`ConversionResult`]; only setup errors (bad input root,
//! output root creation) are returned as `Err`.

pub mod artifact;
pub mod task;

pub use task::ConversionTask;

use crate::config::{BatchConfig, Credential};
use crate::discovery::{self, ConvertibleFile};
use crate::engine::{ConversionEngine, EngineInvocation};
use crate::error::{Docs2MdError, TaskError};
use crate::output::ConversionResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Error text recorded for every file when no credential is available.
pub const MISSING_CREDENTIAL: &str = "API credential is not set";

/// Drives a [`ConversionEngine`] over discovered files.
#[derive(Clone)]
pub struct ConversionPipeline {
    engine: Arc<dyn ConversionEngine>,
    config: BatchConfig,
}

impl ConversionPipeline {
    pub fn new(engine: Arc<dyn ConversionEngine>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Convert every supported file under `input_root` into `output_root`.
    ///
    /// Returns one result per discovered file, in discovery order. Fails only
    /// if discovery or creation of `output_root` fails.
    pub async fn convert_all(
        &self,
        input_root: &Path,
        output_root: &Path,
        credential: Option<&Credential>,
    ) -> Result<Vec<ConversionResult>, Docs2MdError> {
        let input_root = discovery::resolve_root(input_root)?;
        let files = discovery::find_convertible_files(&input_root)?;
        info!(
            "Found {} convertible files under {}",
            files.len(),
            input_root.display()
        );

        tokio::fs::create_dir_all(output_root)
            .await
            .map_err(|e| Docs2MdError::OutputDirFailed {
                path: output_root.to_path_buf(),
                source: e,
            })?;

        Ok(self
            .convert_files(&files, &input_root, output_root, credential)
            .await)
    }

    /// Convert an already-discovered list of files, sequentially.
    ///
    /// A missing or blank credential fails every file without calling the
    /// engine.
    pub async fn convert_files(
        &self,
        files: &[ConvertibleFile],
        input_root: &Path,
        output_root: &Path,
        credential: Option<&Credential>,
    ) -> Vec<ConversionResult> {
        let total = files.len();
        let credential = credential.filter(|c| !c.is_blank());
        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_batch_start(total);
        }

        let mut results = Vec::with_capacity(total);
        for (index, file) in files.iter().enumerate() {
            if let Some(cb) = callback {
                cb.on_file_start(index, total, file.path());
            }

            let result = match credential {
                Some(credential) => {
                    self.convert_one(file, output_root, credential, input_root)
                        .await
                }
                None => ConversionResult::failed(file.path(), MISSING_CREDENTIAL, 0),
            };

            if let Some(cb) = callback {
                match result.error() {
                    None => cb.on_file_complete(index, total, file.path()),
                    Some(e) => cb.on_file_error(index, total, file.path(), e),
                }
            }
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.success()).count();
        info!("Conversion completed: {}/{} files", succeeded, total);
        if let Some(cb) = callback {
            cb.on_batch_complete(total, succeeded);
        }
        results
    }

    /// Convert one file, never failing: errors become a failed result.
    pub async fn convert_one(
        &self,
        file: &ConvertibleFile,
        output_root: &Path,
        credential: &Credential,
        input_root: &Path,
    ) -> ConversionResult {
        let start = Instant::now();
        let outcome = self.run_task(file, output_root, credential, input_root).await;
        let elapsed = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => ConversionResult::succeeded(file.path(), output, elapsed),
            Err(e) => {
                warn!("Failed to convert {}: {}", file.path().display(), e);
                ConversionResult::failed(file.path(), e.to_string(), elapsed)
            }
        }
    }

    async fn run_task(
        &self,
        file: &ConvertibleFile,
        output_root: &Path,
        credential: &Credential,
        input_root: &Path,
    ) -> Result<Option<PathBuf>, TaskError> {
        let task = ConversionTask::derive(file, input_root, output_root)?;
        debug!("{} → {}", task.source.display(), task.target_dir.display());

        tokio::fs::create_dir_all(&task.target_dir)
            .await
            .map_err(|e| TaskError::CreateTargetDir {
                path: task.target_dir.clone(),
                source: e,
            })?;

        info!("Converting {}", task.source.display());
        let invocation =
            EngineInvocation::new(&task.source, &task.target_dir, credential, &self.config);
        self.engine.convert(&invocation).await?;

        let Some(produced) = artifact::latest_markdown(&task.target_dir).await? else {
            if self.config.require_artifact {
                return Err(TaskError::NoArtifact {
                    dir: task.target_dir,
                });
            }
            warn!(
                "Engine succeeded but left no Markdown in {}",
                task.target_dir.display()
            );
            return Ok(None);
        };

        let canonical = task.canonical_artifact();
        artifact::normalize(&produced, &canonical).await?;
        Ok(Some(canonical))
    }
}
