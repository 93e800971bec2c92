//! PDF rasterisation and image encoding.
//!
//! pdfium is not async-safe, so the whole render pass runs inside
//! `spawn_blocking`. Each page is capped at `max_pixels` on its longest edge
//! and encoded as a lossless PNG (text crispness matters more than size).

use crate::error::EngineError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default cap on the longest rendered edge, in pixels.
pub const DEFAULT_MAX_RENDERED_PIXELS: u32 = 2000;

/// Rasterise every page of `pdf_path`, returning one encoded image per page
/// in page order.
pub async fn render_document(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<Vec<ImageData>, EngineError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || render_blocking(&path, max_pixels))
        .await
        .map_err(|e| EngineError::Other(format!("Render task panicked: {}", e)))?
}

fn render_blocking(pdf_path: &Path, max_pixels: u32) -> Result<Vec<ImageData>, EngineError> {
    let render_err = |detail: String| EngineError::Render {
        path: pdf_path.to_path_buf(),
        detail,
    };

    let pdfium = pdfium_auto::bind_pdfium_silent().map_err(|e| render_err(e.to_string()))?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| render_err(format!("{:?}", e)))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    if total == 0 {
        return Err(EngineError::EmptyDocument {
            path: PathBuf::from(pdf_path),
        });
    }
    info!("{}: rendering {} pages", pdf_path.display(), total);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_err(format!("page {}: {:?}", idx + 1, e)))?;
        let image = bitmap.as_image();
        debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());

        let encoded = encode_png(&image)
            .map_err(|e| render_err(format!("page {}: PNG encoding failed: {}", idx + 1, e)))?;
        images.push(encoded);
    }

    Ok(images)
}

/// Encode an image as a base64 PNG ready for a vision request.
pub fn encode_png(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(ImageData::new(STANDARD.encode(&buf), "image/png").with_detail("high"))
}
