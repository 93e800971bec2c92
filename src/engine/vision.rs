use super::{llm, office, postprocess, render, ConversionEngine, EngineInvocation};
use crate::discovery::supported_extension;
use crate::error::EngineError;
use async_trait::async_trait;
use edgequake_llm::{ImageData, LLMProvider, OpenAIProvider};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{info, warn};

/// Vision-LLM engine: office → PDF → page images → Markdown.
///
/// Writes `<stem>.<random>.md` into the invocation's output directory.
/// Any page failure fails the whole invocation.
#[derive(Clone)]
pub struct VisionEngine {
    provider: Option<Arc<dyn LLMProvider>>,
    office_binary: String,
    max_rendered_pixels: u32,
}

impl Default for VisionEngine {
    fn default() -> Self {
        Self {
            provider: None,
            office_binary: office::DEFAULT_OFFICE_BINARY.to_string(),
            max_rendered_pixels: render::DEFAULT_MAX_RENDERED_PIXELS,
        }
    }
}

impl std::fmt::Debug for VisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionEngine")
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("office_binary", &self.office_binary)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .finish()
    }
}

impl VisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-built provider instead of creating one from the
    /// invocation's credential and model.
    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// LibreOffice binary used for non-PDF sources. Default: `soffice`.
    pub fn with_office_binary(mut self, binary: impl Into<String>) -> Self {
        self.office_binary = binary.into();
        self
    }

    pub fn with_max_rendered_pixels(mut self, px: u32) -> Self {
        self.max_rendered_pixels = px.max(100);
        self
    }

    fn provider_for(&self, invocation: &EngineInvocation) -> Arc<dyn LLMProvider> {
        match self.provider {
            Some(ref provider) => Arc::clone(provider),
            None => Arc::new(
                OpenAIProvider::new(invocation.credential.expose()).with_model(&invocation.model),
            ),
        }
    }

    async fn to_pdf(&self, source: &Path, scratch: &Path) -> Result<PathBuf, EngineError> {
        if supported_extension(source).as_deref() == Some("pdf") {
            return Ok(source.to_path_buf());
        }
        office::convert_to_pdf(source, scratch, &self.office_binary).await
    }

    async fn convert_pages(
        &self,
        provider: &Arc<dyn LLMProvider>,
        pages: Vec<ImageData>,
        invocation: &EngineInvocation,
    ) -> Result<Vec<String>, EngineError> {
        if invocation.maintain_format {
            let mut results = Vec::with_capacity(pages.len());
            let mut prior: Option<String> = None;
            for (idx, image) in pages.into_iter().enumerate() {
                let md = llm::convert_page(
                    provider,
                    idx + 1,
                    image,
                    &invocation.instruction,
                    prior.as_deref(),
                )
                .await?;
                let md = postprocess::clean_markdown(&md);
                prior = Some(md.clone());
                results.push(md);
            }
            return Ok(results);
        }

        stream::iter(pages.into_iter().enumerate().map(|(idx, image)| {
            let provider = Arc::clone(provider);
            let instruction = invocation.instruction.clone();
            async move {
                llm::convert_page(&provider, idx + 1, image, &instruction, None)
                    .await
                    .map(|md| postprocess::clean_markdown(&md))
            }
        }))
        .buffered(invocation.concurrency.max(1))
        .try_collect()
        .await
    }
}

#[async_trait]
impl ConversionEngine for VisionEngine {
    async fn convert(&self, invocation: &EngineInvocation) -> Result<(), EngineError> {
        let source = &invocation.source;
        let scratch = tempfile::Builder::new()
            .prefix("docs2md-")
            .tempdir()
            .map_err(|e| EngineError::Io {
                path: std::env::temp_dir(),
                source: e,
            })?;

        let result = self.convert_in(invocation, &scratch).await;
        finish_scratch(scratch, invocation.cleanup);

        let markdown = result?;
        let out = write_output(&invocation.output_dir, source, markdown).await?;
        info!("{} → {}", source.display(), out.display());
        Ok(())
    }
}

impl VisionEngine {
    async fn convert_in(
        &self,
        invocation: &EngineInvocation,
        scratch: &TempDir,
    ) -> Result<String, EngineError> {
        let pdf = self.to_pdf(&invocation.source, scratch.path()).await?;
        let pages = render::render_document(&pdf, self.max_rendered_pixels).await?;
        let provider = self.provider_for(invocation);
        let markdown = self.convert_pages(&provider, pages, invocation).await?;
        Ok(postprocess::join_pages(&markdown))
    }
}

fn finish_scratch(scratch: TempDir, cleanup: bool) {
    if cleanup {
        let path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!("Failed to remove intermediates in {}: {}", path.display(), e);
        }
    } else {
        let kept = scratch.keep();
        info!("Kept intermediates in {}", kept.display());
    }
}

/// Write `markdown` to a fresh `<stem>.<random>.md` inside `dir`.
///
/// The random infix keeps the file from landing on a sibling's `<stem>.md`.
async fn write_output(dir: &Path, source: &Path, markdown: String) -> Result<PathBuf, EngineError> {
    let dir = dir.to_path_buf();
    let prefix = format!("{}.", output_stem(source));
    let io_err = {
        let dir = dir.clone();
        move |source| EngineError::Io { path: dir, source }
    };

    tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".md").rand_bytes(6);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let mut file = builder.tempfile_in(&dir)?;
        file.write_all(markdown.as_bytes())?;
        let (_, path) = file.keep()?;
        Ok(path)
    })
    .await
    .map_err(|e| EngineError::Other(format!("Write task panicked: {}", e)))?
    .map_err(io_err)
}

/// Source stem with characters that common filesystems reject replaced by `_`.
/// Case is preserved.
pub(crate) fn output_stem(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if name.trim().is_empty() {
        "document".to_string()
    } else {
        name
    }
}
