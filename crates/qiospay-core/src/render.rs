//! PNG rendering of QRIS payloads
//!
//! Writing the image anywhere is the caller's business; this module stops
//! at bytes and data URIs.

use std::io::Cursor;

use base64::Engine;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use thiserror::Error;

/// Light modules around the symbol, per ISO/IEC 18004
const QUIET_ZONE: u32 = 4;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Payload does not fit in a QR symbol: {0}")]
    Encode(String),

    #[error("Module size must be at least 1 pixel")]
    ZeroModule,

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Rasterizes `payload` with `module_px` pixels per module
pub fn render_image(payload: &str, module_px: u32) -> Result<GrayImage, RenderError> {
    if module_px == 0 {
        return Err(RenderError::ZeroModule);
    }

    let code = QrCode::new(payload.as_bytes()).map_err(|e| RenderError::Encode(e.to_string()))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + 2 * QUIET_ZONE) * module_px;
    let mut img = GrayImage::from_pixel(side, side, Luma([255]));

    for (idx, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = idx as u32 % modules + QUIET_ZONE;
        let my = idx as u32 / modules + QUIET_ZONE;
        for dy in 0..module_px {
            for dx in 0..module_px {
                img.put_pixel(mx * module_px + dx, my * module_px + dy, Luma([0]));
            }
        }
    }

    log::debug!("Rendered {}x{} modules into {}px image", modules, modules, side);
    Ok(img)
}

/// PNG bytes of the rendered payload
pub fn render_png(payload: &str, module_px: u32) -> Result<Vec<u8>, RenderError> {
    let img = render_image(payload, module_px)?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `data:image/png;base64,...`
pub fn render_data_uri(payload: &str, module_px: u32) -> Result<String, RenderError> {
    let png = render_png(payload, module_px)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}
