//! File discovery: find every convertible document under a directory tree.

use crate::error::Docs2MdError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions (lower-case, without the dot) the engine accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "odt", "ott", "rtf", "txt", "html", "htm", "xml", "csv",
    "tsv", "ppt", "pptx", "odp", "otp",
];

/// An absolute path to a file of a supported type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertibleFile {
    path: PathBuf,
    extension: String,
}

impl ConvertibleFile {
    /// Classify `path`, returning `None` when its extension is not supported.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let extension = supported_extension(&path)?;
        Some(Self { path, extension })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_pdf(&self) -> bool {
        self.extension == "pdf"
    }
}

/// Lower-cased extension of `path` if it is in [`SUPPORTED_EXTENSIONS`].
pub fn supported_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Canonicalise an input root, mapping failures to precondition errors.
pub fn resolve_root(root: &Path) -> Result<PathBuf, Docs2MdError> {
    if !root.exists() {
        return Err(Docs2MdError::InputNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(Docs2MdError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    std::fs::canonicalize(root).map_err(|e| Docs2MdError::DiscoveryFailed {
        path: root.to_path_buf(),
        source: e,
    })
}

/// Recursively list every supported file under `root`.
///
/// Paths are absolute. Each directory lists its own files before descending
/// into subdirectories, both in file-name order, so the result is stable
/// across runs over an unchanged tree. Unreadable entries below the root are
/// logged and skipped.
pub fn find_convertible_files(root: &Path) -> Result<Vec<ConvertibleFile>, Docs2MdError> {
    let root = resolve_root(root)?;
    info!("Searching for convertible files in {}", root.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(&root).follow_links(true).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let msg = e.to_string();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
                return Err(Docs2MdError::DiscoveryFailed { path: root, source });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match ConvertibleFile::from_path(entry.into_path()) {
            Some(file) => files.push(file),
            None => continue,
        }
    }

    debug!("Discovered {} convertible files", files.len());
    Ok(files)
}
