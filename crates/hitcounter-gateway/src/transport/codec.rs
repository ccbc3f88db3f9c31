//! Output encoding.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use hitcounter_core::error::{HitCounterError, Result};

pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const CONTENT_DISPOSITION: &str = "attachment; filename=\"counter.png\"";

/// Encode a rendered counter as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| HitCounterError::Internal(format!("png encode failed: {e}")))?;
    Ok(buf.into_inner())
}
