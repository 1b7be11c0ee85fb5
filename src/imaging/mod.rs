//! Image processing for the grid pipeline.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Plan** | [`plan_geometry`] (pure dimension math) |
//! | **Sniff** | `image::guess_format` |
//! | **Decode** | `image::ImageReader` with allocation limits |
//! | **Resize** | `imageops::resize`, Lanczos3 |
//! | **Encode → JPEG** | `JpegEncoder`, quality 90 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, SourceFormat};
pub use calculations::{
    CellRect, GRID_COLUMNS, TILE_WIDTH, cell_rects, plan_geometry, tile_height_for, tile_index,
};
pub use params::{DecodeLimits, Quality, ResampleFilter, ResampleParams};
pub use rust_backend::{RustBackend, supported_source_formats};
