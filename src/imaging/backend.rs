//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the pipeline
//! needs: sniff, decode, resize, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests substitute a recording mock.

use super::params::{DecodeLimits, Quality, ResampleParams};
use crate::types::RasterImage;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Data does not start with a known image signature")]
    Unrecognized,
    #[error("Format not supported: {0}")]
    Unsupported(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Limit exceeded: {0}")]
    Limits(String),
    #[error("Resize failed: {0}")]
    Resize(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Source encodings the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
}

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Tiff => "TIFF",
        }
    }
}

/// Trait for image processing backends.
///
/// Backends are stateless: every call receives everything it needs, so one
/// instance can be shared across concurrent pipeline runs.
pub trait ImageBackend: Send + Sync {
    /// Identify the encoding from the leading bytes.
    fn sniff(&self, bytes: &[u8]) -> Result<SourceFormat, BackendError>;

    /// Decode source bytes into an RGB8 raster.
    fn decode(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        limits: &DecodeLimits,
    ) -> Result<RasterImage, BackendError>;

    /// Resample to exactly `params.width × params.height`.
    fn resize(
        &self,
        raster: &RasterImage,
        params: &ResampleParams,
    ) -> Result<RasterImage, BackendError>;

    /// Encode pixels as a baseline JPEG.
    fn encode_jpeg(&self, pixels: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
