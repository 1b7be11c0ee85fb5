//! Image backend built on the `image` crate. No system libraries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff | `image::guess_format` (magic bytes) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::imageops::resize`, `Lanczos3` by default |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend, SourceFormat};
use super::params::{DecodeLimits, Quality, ResampleParams};
use crate::types::RasterImage;
use image::codecs::jpeg::JpegEncoder;
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageError, ImageFormat,
    ImageReader, Limits, RgbImage,
};
use std::io::Cursor;

/// Formats whose decoders are compiled in.
const SOURCE_FORMATS: &[(ImageFormat, SourceFormat)] = &[
    (ImageFormat::Jpeg, SourceFormat::Jpeg),
    (ImageFormat::Png, SourceFormat::Png),
    (ImageFormat::WebP, SourceFormat::WebP),
    (ImageFormat::Tiff, SourceFormat::Tiff),
];

fn image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Png => ImageFormat::Png,
        SourceFormat::WebP => ImageFormat::WebP,
        SourceFormat::Tiff => ImageFormat::Tiff,
    }
}

/// Returns the source formats that have working decoders compiled in.
pub fn supported_source_formats() -> Vec<SourceFormat> {
    SOURCE_FORMATS
        .iter()
        .filter(|(fmt, _)| fmt.reading_enabled())
        .map(|(_, src)| *src)
        .collect()
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `image` errors into the backend categories the pipeline cares about.
fn classify(err: ImageError) -> BackendError {
    match err {
        ImageError::Limits(e) => BackendError::Limits(e.to_string()),
        ImageError::Unsupported(e) => BackendError::Unsupported(e.to_string()),
        other => BackendError::Decode(other.to_string()),
    }
}

impl ImageBackend for RustBackend {
    fn sniff(&self, bytes: &[u8]) -> Result<SourceFormat, BackendError> {
        let format = image::guess_format(bytes).map_err(|_| BackendError::Unrecognized)?;
        SOURCE_FORMATS
            .iter()
            .find(|(fmt, _)| *fmt == format && fmt.reading_enabled())
            .map(|(_, src)| *src)
            .ok_or_else(|| BackendError::Unsupported(format!("{format:?}")))
    }

    fn decode(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        limits: &DecodeLimits,
    ) -> Result<RasterImage, BackendError> {
        let mut image_limits = Limits::default();
        image_limits.max_alloc = Some(limits.max_alloc_bytes);

        let mut reader = ImageReader::with_format(Cursor::new(bytes), image_format(format));
        reader.limits(image_limits);
        let mut decoder = reader.into_decoder().map_err(classify)?;

        // Reject from the header before any pixel buffer is allocated.
        let (width, height) = decoder.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::Decode(format!(
                "source has zero size ({width}x{height})"
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > limits.max_source_pixels {
            return Err(BackendError::Limits(format!(
                "source is {width}x{height} ({pixels} pixels), limit is {}",
                limits.max_source_pixels
            )));
        }

        // Phone cameras store rotation in EXIF; pixels must come out upright.
        let orientation = decoder.orientation().map_err(classify)?;
        let mut img = DynamicImage::from_decoder(decoder).map_err(classify)?;
        img.apply_orientation(orientation);
        Ok(RasterImage::from(img.into_rgb8()))
    }

    fn resize(
        &self,
        raster: &RasterImage,
        params: &ResampleParams,
    ) -> Result<RasterImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::Resize(format!(
                "target has zero size ({}x{})",
                params.width, params.height
            )));
        }
        let resized = image::imageops::resize(
            raster.pixels(),
            params.width,
            params.height,
            params.filter.filter_type(),
        );
        Ok(RasterImage::from(resized))
    }

    fn encode_jpeg(&self, pixels: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality.as_u8())
            .write_image(
                pixels.as_raw(),
                pixels.width(),
                pixels.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
