//! Per-file task derivation: where a file's Markdown ends up.

use crate::discovery::ConvertibleFile;
use crate::error::TaskError;
use std::path::{Path, PathBuf};

/// The unit of work for one discovered file.
///
/// `target_dir` mirrors the file's directory relative to the input root,
/// re-rooted at the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub base_name: String,
}

impl ConversionTask {
    pub fn derive(
        file: &ConvertibleFile,
        input_root: &Path,
        output_root: &Path,
    ) -> Result<Self, TaskError> {
        let source = file.path().to_path_buf();
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        let relative_dir = relative_to_root(parent, input_root).ok_or_else(|| {
            TaskError::OutsideInputRoot {
                path: source.clone(),
                root: input_root.to_path_buf(),
            }
        })?;

        let base_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            target_dir: output_root.join(relative_dir),
            source,
            base_name,
        })
    }

    /// `<target_dir>/<base_name>.md`
    pub fn canonical_artifact(&self) -> PathBuf {
        self.target_dir.join(format!("{}.md", self.base_name))
    }
}

/// `dir` relative to `root`, retrying with the canonical root so a relative
/// or symlinked root still matches canonical discovery paths.
fn relative_to_root(dir: &Path, root: &Path) -> Option<PathBuf> {
    if let Ok(rel) = dir.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }
    let canonical = std::fs::canonicalize(root).ok()?;
    dir.strip_prefix(canonical).ok().map(Path::to_path_buf)
}
