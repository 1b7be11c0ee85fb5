//! Tiler: cut the resampled raster into encoded tiles in posting order.
//!
//! Cells come from [`cell_rects`]: row-major, edge to edge, each exactly
//! `tile_width × tile_height`. Every cell is copied out and JPEG-encoded
//! independently. Encoding runs on the current rayon pool; `collect` keeps
//! the row-major order regardless of which worker finishes first.
//!
//! The raster must match the geometry exactly. A raster of any other size is
//! rejected with [`GridError::OutOfBounds`] up front, rather than clipping a
//! cell at the edge or leaving part of the raster uncovered.

use crate::error::{GridError, Result};
use crate::imaging::{CellRect, ImageBackend, Quality, cell_rects};
use crate::types::{Geometry, RasterImage, Tile, TileSequence};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Slice `raster` into `geometry.rows() × geometry.columns()` encoded tiles.
///
/// Synchronous. Call it inside a rayon pool's `install` to bound the number
/// of encoder threads; otherwise the global pool is used.
pub fn tile<B>(
    backend: &B,
    raster: &RasterImage,
    geometry: &Geometry,
    quality: Quality,
) -> Result<TileSequence>
where
    B: ImageBackend + ?Sized,
{
    let expected = (geometry.total_width(), geometry.total_height());
    if raster.dimensions() != expected {
        return Err(GridError::OutOfBounds {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: raster.width(),
            actual_height: raster.height(),
        });
    }

    let tiles = cell_rects(geometry)
        .par_iter()
        .map(|cell| encode_cell(backend, raster, cell, quality))
        .collect::<Result<Vec<Tile>>>()?;

    let sequence = TileSequence::from(tiles);
    debug!(
        tiles = sequence.len(),
        bytes = sequence.encoded_bytes(),
        quality = quality.value(),
        "encoded tiles"
    );
    Ok(sequence)
}

fn encode_cell<B>(
    backend: &B,
    raster: &RasterImage,
    cell: &CellRect,
    quality: Quality,
) -> Result<Tile>
where
    B: ImageBackend + ?Sized,
{
    let pixels =
        image::imageops::crop_imm(raster.pixels(), cell.x, cell.y, cell.width, cell.height)
            .to_image();
    let bytes = backend
        .encode_jpeg(&pixels, quality)
        .map_err(|e| GridError::Encode {
            index: cell.index,
            reason: e.to_string(),
        })?;

    Ok(Tile {
        index: cell.index,
        width: pixels.width(),
        height: pixels.height(),
        bytes: Arc::from(bytes),
    })
}
