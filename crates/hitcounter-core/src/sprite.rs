//! Digit sprites (one glyph per decimal digit 0-9).
//!
//! A [`SpriteSet`] is validated once on load: exactly ten glyphs, all with the
//! same pixel dimensions. After that it is immutable and can be shared across
//! any number of concurrent renders without locking.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::LoadError;

/// Number of glyphs in a set.
pub const DIGITS: usize = 10;

/// Ten immutable digit glyphs sharing one size.
#[derive(Debug, Clone)]
pub struct SpriteSet {
    glyphs: Vec<RgbaImage>,
    width: u32,
    height: u32,
}

impl SpriteSet {
    /// Load and decode ten sprites, index `i` being the glyph for digit `i`.
    ///
    /// The format is sniffed from the file contents, so any raster format the
    /// `image` build supports is accepted.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, LoadError> {
        if paths.len() != DIGITS {
            return Err(LoadError::WrongCount { found: paths.len() });
        }

        let mut glyphs = Vec::with_capacity(DIGITS);
        for (digit, path) in (0u8..).zip(paths) {
            let path = path.as_ref();
            let bytes = fs::read(path).map_err(|source| LoadError::Read {
                digit,
                path: path.to_path_buf(),
                source,
            })?;
            let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
                digit,
                path: path.to_path_buf(),
                source,
            })?;
            glyphs.push(img.to_rgba8());
        }

        let origins: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        Self::validated(glyphs, &origins)
    }

    /// Build a set from in-memory glyphs (embedded assets, tests).
    pub fn from_images(glyphs: Vec<RgbaImage>) -> Result<Self, LoadError> {
        let origins: Vec<PathBuf> = (0..glyphs.len())
            .map(|d| PathBuf::from(format!("<memory:{d}>")))
            .collect();
        Self::validated(glyphs, &origins)
    }

    fn validated(glyphs: Vec<RgbaImage>, origins: &[PathBuf]) -> Result<Self, LoadError> {
        if glyphs.len() != DIGITS {
            return Err(LoadError::WrongCount { found: glyphs.len() });
        }

        let expected = glyphs[0].dimensions();
        for (digit, (glyph, origin)) in (0u8..).zip(glyphs.iter().zip(origins)) {
            let found = glyph.dimensions();
            if found != expected {
                return Err(LoadError::DimensionMismatch {
                    digit,
                    path: origin.clone(),
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            glyphs,
            width: expected.0,
            height: expected.1,
        })
    }

    /// Glyph for `digit` (taken modulo 10).
    pub fn glyph(&self, digit: u8) -> &RgbaImage {
        &self.glyphs[usize::from(digit) % DIGITS]
    }

    /// Width of every glyph.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of every glyph.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Ordered locations of the ten sprite files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpritePaths(Vec<PathBuf>);

impl SpritePaths {
    /// `<dir>/<digit>.<extension>` for digits 0-9.
    pub fn in_dir(dir: impl AsRef<Path>, extension: &str) -> Self {
        let dir = dir.as_ref();
        Self(
            (0..DIGITS)
                .map(|d| dir.join(format!("{d}.{extension}")))
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn load(&self) -> Result<SpriteSet, LoadError> {
        SpriteSet::load(&self.0)
    }
}

impl Default for SpritePaths {
    fn default() -> Self {
        Self::in_dir("img/1", "png")
    }
}

/// Where the compositor gets its glyphs from.
#[derive(Debug, Clone)]
pub enum SpriteSource {
    /// Loaded once at startup and shared for the process lifetime.
    Preloaded(Arc<SpriteSet>),
    /// Re-read from disk on every render, so assets can be swapped without a
    /// restart. Load failures surface per request.
    OnDemand(SpritePaths),
}

impl SpriteSource {
    pub fn sprites(&self) -> Result<Arc<SpriteSet>, LoadError> {
        match self {
            SpriteSource::Preloaded(set) => Ok(Arc::clone(set)),
            SpriteSource::OnDemand(paths) => paths.load().map(Arc::new),
        }
    }
}

impl From<SpriteSet> for SpriteSource {
    fn from(set: SpriteSet) -> Self {
        SpriteSource::Preloaded(Arc::new(set))
    }
}
