//! Synthetic digit sprites shared by the core tests.
//!
//! Glyph `d` is a solid block whose red channel is `d * 20`, so a rendered
//! image can be decoded back into its digit sequence.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::Path;

use hitcounter_core::{SpritePaths, SpriteSet};
use image::{Rgba, RgbaImage};

pub const W: u32 = 3;
pub const H: u32 = 5;

pub fn glyph(d: u8) -> RgbaImage {
    RgbaImage::from_pixel(W, H, Rgba([d * 20, 100, 200, 255]))
}

pub fn glyphs() -> Vec<RgbaImage> {
    (0..10).map(glyph).collect()
}

pub fn sprites() -> SpriteSet {
    SpriteSet::from_images(glyphs()).expect("synthetic sprites are valid")
}

/// Write the synthetic glyphs as `<dir>/<d>.png`.
pub fn write_sprites(dir: &Path) -> SpritePaths {
    for (d, g) in (0u8..).zip(glyphs()) {
        g.save(dir.join(format!("{d}.png"))).unwrap();
    }
    SpritePaths::in_dir(dir, "png")
}

/// Read the glyph sequence back out of a rendered image.
pub fn decode_digits(img: &RgbaImage) -> Vec<u8> {
    assert_eq!(img.width() % W, 0);
    (0..img.width() / W)
        .map(|i| {
            let px = img.get_pixel(i * W, 0);
            assert_eq!(px[3], 255, "glyph {i} missing");
            px[0] / 20
        })
        .collect()
}
