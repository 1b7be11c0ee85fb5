//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the pipeline stages (which decide sizes and quality)
//! and the [`backend`](super::backend) (which does the pixel work), so a
//! mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResampleFilter`]: Interpolation kernel. Nearest-neighbour is deliberately absent.
//! - [`ResampleParams`]: Exact target dimensions plus filter.
//! - [`DecodeLimits`]: Guards against decoding pathologically large sources.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the JPEG encoder expects.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Interpolation kernel used when resampling the source onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Windowed sinc, three lobes. Sharpest result.
    #[default]
    Lanczos3,
    /// Bicubic.
    CatmullRom,
    Gaussian,
    /// Bilinear.
    Triangle,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Lanczos3 => FilterType::Lanczos3,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Triangle => FilterType::Triangle,
        }
    }
}

/// Parameters for an exact, non-aspect-preserving resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResampleFilter,
}

/// Upper bounds applied while decoding a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum `width * height` of the source.
    pub max_source_pixels: u64,
    /// Maximum bytes any single allocation may take.
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_source_pixels: 100_000_000,
            max_alloc_bytes: 1 << 30,
        }
    }
}
