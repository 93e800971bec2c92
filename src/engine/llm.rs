//! Vision-model calls: one request per rendered page.
//!
//! Request layout, in order:
//! 1. system — the extraction instruction
//! 2. system — previous page's Markdown (maintain-format mode only)
//! 3. user   — the page image with empty text

use crate::error::EngineError;
use crate::prompts::maintain_format_context;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Sampling temperature for transcription. Low keeps the model literal.
pub const TEMPERATURE: f32 = 0.1;

/// Output token cap per page.
pub const MAX_TOKENS: usize = 4096;

/// Convert one page image to Markdown.
pub async fn convert_page(
    provider: &Arc<dyn LLMProvider>,
    page_num: usize,
    image: ImageData,
    instruction: &str,
    prior_page: Option<&str>,
) -> Result<String, EngineError> {
    let start = Instant::now();
    let messages = build_messages(image, instruction, prior_page);
    let options = CompletionOptions {
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_TOKENS),
        ..Default::default()
    };

    let response = provider
        .chat(&messages, Some(&options))
        .await
        .map_err(|e| EngineError::Llm {
            page: page_num,
            detail: e.to_string(),
        })?;

    debug!(
        "Page {}: {} input tokens, {} output tokens, {:?}",
        page_num,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );
    Ok(response.content)
}

fn build_messages(image: ImageData, instruction: &str, prior_page: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(instruction)];
    if let Some(prior) = prior_page.filter(|p| !p.trim().is_empty()) {
        messages.push(ChatMessage::system(maintain_format_context(prior)));
    }
    messages.push(ChatMessage::user_with_images("", vec![image]));
    messages
}
