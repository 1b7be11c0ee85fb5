//! Error taxonomy for the grid pipeline.
//!
//! Every variant is terminal for the operation that produced it: no stage
//! retries and no stage hands back a partial result. The host decides how
//! to surface the message and lets the user start over with a new upload.
//!
//! | Variant | Raised by |
//! |---|---|
//! | [`GridError::UnsupportedFormat`] | upload gate, resampler (before decoding) |
//! | [`GridError::Decode`] | resampler, when the source bytes cannot be decoded |
//! | [`GridError::Resample`] | resampler, for zero-size targets and allocation limits |
//! | [`GridError::OutOfBounds`] | tiler, when the raster does not match the geometry |
//! | [`GridError::Encode`] | tiler, when a tile cannot be JPEG-encoded |
//! | [`GridError::EmptyInput`] | archiver, for an empty tile sequence |
//! | [`GridError::ArchiveBuild`] | archiver, for any failure while writing the zip |

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode source image: {0}")]
    Decode(String),
    #[error("Resampling failed: {0}")]
    Resample(String),
    #[error(
        "Raster is {actual_width}x{actual_height} but the grid needs exactly {expected_width}x{expected_height}"
    )]
    OutOfBounds {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("Tile {index} could not be encoded: {reason}")]
    Encode { index: u32, reason: String },
    #[error("Cannot build an archive from an empty tile sequence")]
    EmptyInput,
    #[error("Archive build failed: {0}")]
    ArchiveBuild(String),
}

/// Result type for pipeline stages.
pub type Result<T> = std::result::Result<T, GridError>;
