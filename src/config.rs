//! Configuration types for batch conversion.
//!
//! Everything the pipeline forwards to the conversion engine lives in
//! [`BatchConfig`], built via [`BatchConfigBuilder`]. The credential is kept
//! apart in [`Credential`] so configs can be logged and shared freely.

use crate::error::Docs2MdError;
use crate::progress::ProgressCallback;
use crate::prompts::{DEFAULT_INSTRUCTION, DEFAULT_MODEL};
use std::fmt;

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use edgequake_docs2md::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .model("gpt-4o")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert!(config.cleanup);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Model identifier passed to the engine. Default: `gpt-4o-mini`.
    pub model: String,

    /// Extraction instruction passed to the engine. Default:
    /// [`crate::prompts::DEFAULT_INSTRUCTION`].
    pub instruction: String,

    /// Concurrency hint for the engine's own per-page work. Default: 10.
    ///
    /// Files are always processed one at a time; this only bounds how many
    /// pages of a single file the engine may have in flight.
    pub concurrency: usize,

    /// Remove engine intermediates (converted PDFs, page images). Default: true.
    pub cleanup: bool,

    /// Ask the engine to keep formatting consistent across pages. Default: false.
    pub maintain_format: bool,

    /// Fail a file when the engine succeeds but no Markdown file is found.
    /// Default: false.
    pub require_artifact: bool,

    /// Optional progress callback for per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            concurrency: 10,
            cleanup: true,
            maintain_format: false,
            require_artifact: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("model", &self.model)
            .field("instruction_len", &self.instruction.len())
            .field("concurrency", &self.concurrency)
            .field("cleanup", &self.cleanup)
            .field("maintain_format", &self.maintain_format)
            .field("require_artifact", &self.require_artifact)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = instruction.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn cleanup(mut self, v: bool) -> Self {
        self.config.cleanup = v;
        self
    }

    pub fn maintain_format(mut self, v: bool) -> Self {
        self.config.maintain_format = v;
        self
    }

    pub fn require_artifact(mut self, v: bool) -> Self {
        self.config.require_artifact = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Docs2MdError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Docs2MdError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(Docs2MdError::InvalidConfig("Model must not be empty".into()));
        }
        if c.instruction.trim().is_empty() {
            return Err(Docs2MdError::InvalidConfig(
                "Instruction must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// API secret authorising engine invocations.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Treat `None`, empty and whitespace-only secrets as absent.
    pub fn from_optional(secret: Option<String>) -> Option<Self> {
        secret.filter(|s| !s.trim().is_empty()).map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only secrets authorise nothing.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let c = BatchConfig::default();
        assert_eq!(c.model, "gpt-4o-mini");
        assert_eq!(c.concurrency, 10);
        assert!(c.cleanup);
        assert!(!c.maintain_format);
        assert!(!c.require_artifact);
        assert_eq!(c.instruction, DEFAULT_INSTRUCTION);
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        let err = BatchConfig::builder().concurrency(0).build().unwrap_err();
        assert!(matches!(err, Docs2MdError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_model() {
        assert!(BatchConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn builder_overrides_fields() {
        let c = BatchConfig::builder()
            .model("gpt-4o")
            .instruction("Only text.")
            .concurrency(2)
            .cleanup(false)
            .maintain_format(true)
            .require_artifact(true)
            .build()
            .unwrap();
        assert_eq!(c.model, "gpt-4o");
        assert_eq!(c.instruction, "Only text.");
        assert_eq!(c.concurrency, 2);
        assert!(!c.cleanup);
        assert!(c.maintain_format);
        assert!(c.require_artifact);
    }

    #[test]
    fn credential_from_optional_drops_blank() {
        assert!(Credential::from_optional(None).is_none());
        assert!(Credential::from_optional(Some(String::new())).is_none());
        assert!(Credential::from_optional(Some("   ".into())).is_none());
        let c = Credential::from_optional(Some("sk-test".into())).unwrap();
        assert_eq!(c.expose(), "sk-test");
    }

    #[test]
    fn credential_new_can_be_blank() {
        assert!(Credential::new("").is_blank());
        assert!(Credential::new(" \t").is_blank());
        assert!(!Credential::new("sk-test").is_blank());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("sk-secret");
        assert!(!format!("{c:?}").contains("sk-secret"));
    }
}
