//! Lays digit glyphs out left-to-right into one image.
//!
//! Pure functions: no I/O, deterministic for identical inputs.

use image::{imageops, RgbaImage};

use crate::sprite::SpriteSet;
use crate::Count;

/// Least-significant `pad_len` decimal digits of `count`, most significant
/// first, zero-padded on the left. Higher-order digits are dropped.
pub fn digits(count: Count, pad_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; pad_len];
    let mut rest = count;
    for slot in out.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    out
}

/// Render `count` as `pad_len` glyphs on a fresh transparent canvas of
/// `sprites.width() * pad_len` by `sprites.height()`.
///
/// Glyph pixels replace the canvas pixels; there is no blending.
pub fn render(count: Count, sprites: &SpriteSet, pad_len: usize) -> RgbaImage {
    let (w, h) = (sprites.width(), sprites.height());
    let cols = u32::try_from(pad_len).unwrap_or(u32::MAX);
    let mut canvas = RgbaImage::new(w.saturating_mul(cols), h);

    for (i, digit) in digits(count, pad_len).into_iter().enumerate() {
        let x = i64::from(w) * i as i64;
        imageops::replace(&mut canvas, sprites.glyph(digit), x, 0);
    }
    canvas
}
