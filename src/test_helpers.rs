//! Shared test utilities for the gridcut test suite.
//!
//! Fixtures are synthesised in memory, so no test touches the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let jpeg = encode_fixture(&gradient_image(400, 300), ImageFormat::Jpeg);
//! let raster = RasterImage::from(cell_marked_image(&geometry));
//! assert_eq!(cell_marker(&tile_pixels), (row, column));
//! ```

use crate::types::Geometry;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Fixture images
// =========================================================================

/// Image whose red/green channels follow x/y, so positions are recognisable.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}

/// Encode an RGB image in the given container format.
pub fn encode_fixture(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

/// Insert an APP1 Exif segment carrying only an Orientation tag right
/// after the JPEG SOI marker.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut payload = b"Exif\0\0".to_vec();
    // Big-endian TIFF header, first IFD at offset 8.
    payload.extend_from_slice(b"MM\0\x2a\0\0\0\x08");
    // One entry: tag 0x0112 (Orientation), SHORT, count 1, value.
    payload.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0x00, 0x00]);
    // No next IFD.
    payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let len = u16::try_from(payload.len() + 2).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Cell-marked rasters
// =========================================================================

const MARKER_STEP: u32 = 60;

/// Fill every grid cell with a flat colour that encodes its (row, column).
///
/// Flat colours survive JPEG compression within a small tolerance, so a
/// decoded tile can be traced back to the cell it was cut from.
pub fn cell_marked_image(geometry: &Geometry) -> RgbImage {
    let (tw, th) = (geometry.tile_width(), geometry.tile_height());
    RgbImage::from_fn(geometry.total_width(), geometry.total_height(), |x, y| {
        let (row, col) = (y / th, x / tw);
        Rgb([(row * MARKER_STEP) as u8, (col * MARKER_STEP) as u8, 200])
    })
}

/// Recover `(row, column)` from a pixel of a cell-marked image.
pub fn cell_marker(pixel: &Rgb<u8>) -> (u32, u32) {
    let [r, g, _] = pixel.0;
    let nearest = |v: u8| (u32::from(v) + MARKER_STEP / 2) / MARKER_STEP;
    (nearest(r), nearest(g))
}
