//! # Gridcut
//!
//! Turns one uploaded photo into an Instagram profile grid: the image is
//! stretched onto a fixed canvas, cut into 3, 6, or 9 JPEG tiles, and packed
//! into `instagram-grid.zip` with entries named `1.jpg`, `2.jpg`, ... in
//! posting order.
//!
//! # Architecture: Four Stages
//!
//! ```text
//! 1. Plan       layout + aspect  →  Geometry      (pure dimension math)
//! 2. Resample   source bytes     →  RasterImage   (decode + forced resize)
//! 3. Tile       raster           →  TileSequence  (crop + JPEG, row-major)
//! 4. Archive    tiles            →  ArchiveBlob   (zip, `{index}.jpg`)
//! ```
//!
//! Each stage is a function of its inputs. Nothing is cached between runs;
//! the geometry is recomputed for every upload and every intermediate value
//! is owned by the call that made it. [`Pipeline`] strings the stages
//! together and [`GridSession`] holds the result for one user.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry math, operation parameters, the [`ImageBackend`](imaging::ImageBackend) trait and its pure-Rust implementation |
//! | [`upload`] | Format gate for incoming bytes, producing a [`SourceImage`] |
//! | [`resample`] | Stage 2: decode and stretch onto the planned canvas, off the async executor |
//! | [`tile`] | Stage 3: crop cells in row-major order and encode them in parallel |
//! | [`archive`] | Stage 4: deterministic in-memory zip, plus a reader for the same layout |
//! | [`pipeline`] | Shared context: backend, validated config, encoder thread pool |
//! | [`session`] | Per-user selection, current tiles, and stale-upload handling |
//! | [`config`] | `PipelineConfig` TOML loading, merging, and validation |
//! | [`types`] | Layout, aspect, geometry, raster, tile, and archive types |
//! | [`naming`] | `{index}.jpg` entry names and numeric ordering |
//! | [`output`] | User-facing messages and the JSON preview manifest |
//! | [`error`] | [`GridError`], the one error type every stage returns |
//!
//! # Design Decisions
//!
//! ## Stretch, Don't Crop
//!
//! The source is resized to exactly `total_width × total_height` without
//! preserving its aspect ratio. Whatever the user uploads fills the whole
//! grid; there is no letterboxing and no smart crop. The result can look
//! distorted, and that is the expected behavior.
//!
//! ## Fixed Tile Width
//!
//! Every tile is 1080 pixels wide, the width Instagram displays at. Height
//! follows the aspect: 1080 for square, 1350 for 4:5 portrait. The grid is
//! always three columns, because that is the profile grid.
//!
//! ## Posting Order Lives in the Names
//!
//! Tiles are numbered row-major from the top-left, and the archive entry
//! name *is* the number. Instagram shows the newest post first, so the
//! caller posts the highest number first; no extra metadata file is needed
//! to recover that.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling, and JPEG encoding use the `image` crate only. No
//! system libraries, so the crate builds and runs the same everywhere and
//! tests can decode real fixtures without setup.

pub mod archive;
pub mod config;
pub mod error;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod resample;
pub mod session;
pub mod tile;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use archive::{ArchiveOptions, DEFAULT_ARCHIVE_NAME, build_archive, read_archive};
pub use config::PipelineConfig;
pub use error::{GridError, Result};
pub use imaging::plan_geometry;
pub use pipeline::Pipeline;
pub use session::{GridSession, UploadTicket};
pub use types::{
    ArchiveBlob, AspectMode, Geometry, LayoutSpec, RasterImage, Tile, TileSequence,
};
pub use upload::SourceImage;
