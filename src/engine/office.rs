//! Office → PDF conversion via LibreOffice.
//!
//! pdfium only reads PDFs, so every other supported format (Word, Excel,
//! PowerPoint, OpenDocument, RTF, plain text, HTML, XML, CSV/TSV) is first
//! printed to PDF with `soffice --headless --convert-to pdf`.

use crate::error::EngineError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// LibreOffice binary looked up on `PATH` when none is configured.
pub const DEFAULT_OFFICE_BINARY: &str = "soffice";

/// Convert `source` to PDF inside `out_dir`, returning the PDF's path.
pub async fn convert_to_pdf(
    source: &Path,
    out_dir: &Path,
    binary: &str,
) -> Result<PathBuf, EngineError> {
    debug!("{} --convert-to pdf {}", binary, source.display());

    let output = Command::new(binary)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(out_dir)
        .arg(source)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EngineError::OfficeConversion {
            path: source.to_path_buf(),
            detail: if e.kind() == std::io::ErrorKind::NotFound {
                format!("LibreOffice ('{binary}') not found on PATH")
            } else {
                e.to_string()
            },
        })?;

    if !output.status.success() {
        return Err(EngineError::OfficeConversion {
            path: source.to_path_buf(),
            detail: format!(
                "{} exited with {}: {}",
                binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let pdf = pdf_path_for(source, out_dir);
    if !pdf.is_file() {
        return Err(EngineError::OfficeConversion {
            path: source.to_path_buf(),
            detail: format!("expected output '{}' was not produced", pdf.display()),
        });
    }
    Ok(pdf)
}

/// Where LibreOffice writes the PDF for `source`: same stem, `.pdf` suffix.
pub fn pdf_path_for(source: &Path, out_dir: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "document".into());
    name.push(".pdf");
    out_dir.join(name)
}
