//! # edgequake-docs2md
//!
//! Batch-convert a directory tree of documents (PDF, Word, Excel, PowerPoint,
//! OpenDocument, RTF, text, HTML, XML, CSV/TSV) into Markdown using Vision
//! Language Models, mirroring the input layout in the output directory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover  walk the tree, keep supported extensions
//!  ├─ 2. Task      mirror each file's directory under the output root
//!  ├─ 3. Engine    convert one file (LibreOffice → pdfium → VLM)
//!  ├─ 4. Artifact  pick the freshest *.md, rename to <name>.md
//!  └─ 5. Result    one ConversionResult per file, discovery order
//! ```
//!
//! Files run one at a time; a failing file is recorded and the batch moves on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docs2md::{convert_directory, BatchConfig, Credential};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credential = Credential::from_optional(std::env::var("OPENAI_API_KEY").ok());
//!     let config = BatchConfig::default();
//!     let output = convert_directory("docs", "docs_md", credential.as_ref(), &config).await?;
//!     for failure in output.failures() {
//!         eprintln!("{}: {}", failure.file_path().display(), failure.error().unwrap_or(""));
//!     }
//!     println!("{}/{} converted", output.summary.succeeded, output.summary.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `docs2md` binary (clap + anyhow + chrono + tracing-subscriber + indicatif) |
//! | `bundled` | off     | Embed the pdfium library in the binary at build time |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, Credential};
pub use convert::{
    convert_directory, convert_directory_sync, convert_directory_with_engine,
    timestamped_output_dir,
};
pub use discovery::{find_convertible_files, ConvertibleFile, SUPPORTED_EXTENSIONS};
pub use engine::{ConversionEngine, EngineInvocation, VisionEngine};
pub use error::{Docs2MdError, EngineError, TaskError};
pub use output::{BatchOutput, BatchSummary, ConversionResult};
pub use pipeline::{ConversionPipeline, ConversionTask, MISSING_CREDENTIAL};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
