//! Resampler: source bytes → one raster at exactly the grid's dimensions.
//!
//! The source is stretched onto the target geometry. Its own aspect ratio is
//! not preserved, so a source whose proportions differ from the grid will
//! look distorted. That is accepted behaviour: the grid shape is what the
//! user picked, and no crop or fit mode is offered.
//!
//! ## Steps
//!
//! ```text
//! sniff  →  check target  →  decode (limits)  →  resize (Lanczos3)  →  verify size
//! ```
//!
//! Unrecognised bytes fail at the sniff with [`GridError::Decode`]; a known
//! but unsupported container fails there with [`GridError::UnsupportedFormat`].
//! Both happen before anything geometry-sized is allocated. Zero-size targets
//! and allocation limits surface as [`GridError::Resample`].
//!
//! Decoding and resizing are CPU-bound, so [`resample`] runs them on the
//! blocking pool and suspends the caller until they finish. An abandoned
//! call is not interrupted; it completes and its result is dropped.

use crate::error::{GridError, Result};
use crate::imaging::{BackendError, DecodeLimits, ImageBackend, ResampleFilter, ResampleParams};
use crate::types::{Geometry, RasterImage};
use crate::upload::SourceImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Knobs for a resample call, normally taken from
/// [`PipelineConfig`](crate::config::PipelineConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResampleOptions {
    pub filter: ResampleFilter,
    pub limits: DecodeLimits,
}

/// Decode and resample `source` onto `geometry`, off the async executor.
pub async fn resample<B>(
    backend: Arc<B>,
    source: SourceImage,
    geometry: Geometry,
    options: ResampleOptions,
) -> Result<RasterImage>
where
    B: ImageBackend + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || {
        resample_blocking(backend.as_ref(), &source, &geometry, &options)
    })
    .await
    .map_err(|e| GridError::Resample(format!("resample task failed: {e}")))?
}

/// Synchronous body of [`resample`].
pub fn resample_blocking<B>(
    backend: &B,
    source: &SourceImage,
    geometry: &Geometry,
    options: &ResampleOptions,
) -> Result<RasterImage>
where
    B: ImageBackend + ?Sized,
{
    let format = backend.sniff(source.bytes()).map_err(|e| match e {
        BackendError::Unrecognized => GridError::Decode(format!(
            "{} is not a readable image ({} bytes)",
            source.display_name(),
            source.len()
        )),
        BackendError::Unsupported(name) => GridError::UnsupportedFormat(name),
        other => GridError::Decode(other.to_string()),
    })?;

    check_target(geometry, &options.limits)?;

    let decoded = backend
        .decode(source.bytes(), format, &options.limits)
        .map_err(decode_error)?;
    debug!(
        source = source.display_name(),
        format = format.name(),
        width = decoded.width(),
        height = decoded.height(),
        "decoded source image"
    );

    let params = ResampleParams {
        width: geometry.total_width(),
        height: geometry.total_height(),
        filter: options.filter,
    };
    let resized = backend.resize(&decoded, &params).map_err(resize_error)?;
    drop(decoded);

    if resized.dimensions() != (params.width, params.height) {
        return Err(GridError::Resample(format!(
            "backend produced {}x{}, expected {}x{}",
            resized.width(),
            resized.height(),
            params.width,
            params.height
        )));
    }

    info!(
        width = params.width,
        height = params.height,
        filter = ?options.filter,
        "resampled source onto grid"
    );
    Ok(resized)
}

/// Reject targets the resize cannot or should not allocate.
fn check_target(geometry: &Geometry, limits: &DecodeLimits) -> Result<()> {
    if geometry.total_width() == 0 || geometry.total_height() == 0 {
        return Err(GridError::Resample(format!(
            "target has zero size ({}x{})",
            geometry.total_width(),
            geometry.total_height()
        )));
    }
    match geometry.raster_bytes() {
        Some(bytes) if bytes <= limits.max_alloc_bytes => Ok(()),
        Some(bytes) => Err(GridError::Resample(format!(
            "target raster needs {bytes} bytes, limit is {}",
            limits.max_alloc_bytes
        ))),
        None => Err(GridError::Resample(format!(
            "target raster {}x{} is too large to address",
            geometry.total_width(),
            geometry.total_height()
        ))),
    }
}

fn decode_error(err: BackendError) -> GridError {
    match err {
        BackendError::Limits(msg) => GridError::Resample(msg),
        BackendError::Unsupported(msg) => GridError::UnsupportedFormat(msg),
        other => GridError::Decode(other.to_string()),
    }
}

fn resize_error(err: BackendError) -> GridError {
    GridError::Resample(err.to_string())
}
