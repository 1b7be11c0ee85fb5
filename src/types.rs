//! Shared types handed between pipeline stages.
//!
//! Ownership follows the stage order: the resampler owns the
//! [`RasterImage`] it produces, the tiler borrows it read-only and returns a
//! [`TileSequence`], and the archiver reads that sequence to produce an
//! [`ArchiveBlob`].

use crate::naming;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionParseError {
    #[error("unknown layout '{0}' (expected 3x1, 3x2 or 3x3)")]
    Layout(String),
    #[error("unknown aspect '{0}' (expected square or portrait)")]
    Aspect(String),
}

/// Grid layout: always three columns, one to three rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutSpec {
    #[serde(rename = "3x1")]
    ThreeByOne,
    #[serde(rename = "3x2")]
    ThreeByTwo,
    #[default]
    #[serde(rename = "3x3")]
    ThreeByThree,
}

impl LayoutSpec {
    pub const ALL: [LayoutSpec; 3] = [Self::ThreeByOne, Self::ThreeByTwo, Self::ThreeByThree];

    pub fn columns(self) -> u32 {
        3
    }

    pub fn rows(self) -> u32 {
        match self {
            Self::ThreeByOne => 1,
            Self::ThreeByTwo => 2,
            Self::ThreeByThree => 3,
        }
    }

    /// Number of tiles this layout produces.
    pub fn piece_count(self) -> u32 {
        self.columns() * self.rows()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeByOne => "3x1",
            Self::ThreeByTwo => "3x2",
            Self::ThreeByThree => "3x3",
        }
    }
}

impl fmt::Display for LayoutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutSpec {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('×', "x").as_str() {
            "3x1" => Ok(Self::ThreeByOne),
            "3x2" => Ok(Self::ThreeByTwo),
            "3x3" => Ok(Self::ThreeByThree),
            _ => Err(SelectionParseError::Layout(s.to_string())),
        }
    }
}

/// Per-tile aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// 1:1, tile height equals tile width.
    #[default]
    Square,
    /// 4:5, tile height is 5/4 of tile width.
    Portrait,
}

impl AspectMode {
    pub const ALL: [AspectMode; 2] = [Self::Square, Self::Portrait];

    /// Aspect ratio as `(width, height)`.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Portrait => (4, 5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Portrait => "portrait",
        }
    }
}

impl fmt::Display for AspectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectMode {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "1:1" => Ok(Self::Square),
            "portrait" | "4:5" => Ok(Self::Portrait),
            _ => Err(SelectionParseError::Aspect(s.to_string())),
        }
    }
}

/// Fully resolved pixel dimensions for one layout/aspect selection.
///
/// Totals are derived on construction, so `total_width == columns * tile_width`
/// and `total_height == rows * tile_height` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Geometry {
    total_width: u32,
    total_height: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
}

impl Geometry {
    /// Returns `None` when a total does not fit in `u32`.
    pub fn new(columns: u32, rows: u32, tile_width: u32, tile_height: u32) -> Option<Self> {
        Some(Self {
            total_width: columns.checked_mul(tile_width)?,
            total_height: rows.checked_mul(tile_height)?,
            tile_width,
            tile_height,
            columns,
            rows,
        })
    }

    /// Infallible constructor for the planner, whose inputs are small constants.
    pub(crate) fn planned(columns: u32, rows: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            total_width: columns * tile_width,
            total_height: rows * tile_height,
            tile_width,
            tile_height,
            columns,
            rows,
        }
    }

    pub fn total_width(&self) -> u32 {
        self.total_width
    }

    pub fn total_height(&self) -> u32 {
        self.total_height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Bytes needed for an RGB8 raster of the full grid, or `None` if that
    /// overflows `u64`.
    pub fn raster_bytes(&self) -> Option<u64> {
        u64::from(self.total_width)
            .checked_mul(u64::from(self.total_height))?
            .checked_mul(3)
    }
}

/// An owned RGB8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbImage {
        self.pixels
    }
}

impl From<RgbImage> for RasterImage {
    fn from(pixels: RgbImage) -> Self {
        Self { pixels }
    }
}

/// One encoded grid cell.
///
/// The encoded bytes are reference-counted so the preview layer and the
/// archiver can hold the same buffer without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// 1-based posting index (row-major).
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

impl Tile {
    /// Archive entry name, e.g. `3.jpg`.
    pub fn entry_name(&self) -> String {
        naming::tile_entry_name(self.index)
    }

    pub fn media_type(&self) -> &'static str {
        naming::TILE_MEDIA_TYPE
    }
}

/// Tiles in posting order: position `k` holds the tile with index `k + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileSequence {
    tiles: Vec<Tile>,
}

impl TileSequence {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    pub fn as_slice(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn get(&self, position: usize) -> Option<&Tile> {
        self.tiles.get(position)
    }

    /// Sum of encoded tile sizes in bytes.
    pub fn encoded_bytes(&self) -> usize {
        self.tiles.iter().map(|t| t.bytes.len()).sum()
    }
}

impl From<Vec<Tile>> for TileSequence {
    fn from(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }
}

impl<'a> IntoIterator for &'a TileSequence {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

impl IntoIterator for TileSequence {
    type Item = Tile;
    type IntoIter = std::vec::IntoIter<Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.into_iter()
    }
}

/// A finished zip archive, held in memory until the host saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBlob {
    bytes: Vec<u8>,
    file_name: String,
}

impl ArchiveBlob {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    /// Suggested download file name, `instagram-grid.zip` by default.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rows_and_columns() {
        assert_eq!(LayoutSpec::ThreeByOne.rows(), 1);
        assert_eq!(LayoutSpec::ThreeByTwo.rows(), 2);
        assert_eq!(LayoutSpec::ThreeByThree.rows(), 3);
        for layout in LayoutSpec::ALL {
            assert_eq!(layout.columns(), 3);
        }
        assert_eq!(LayoutSpec::ThreeByTwo.piece_count(), 6);
    }

    #[test]
    fn selection_defaults_are_3x3_square() {
        assert_eq!(LayoutSpec::default(), LayoutSpec::ThreeByThree);
        assert_eq!(AspectMode::default(), AspectMode::Square);
    }

    #[test]
    fn layout_parses_labels() {
        assert_eq!("3x1".parse::<LayoutSpec>(), Ok(LayoutSpec::ThreeByOne));
        assert_eq!("3×2".parse::<LayoutSpec>(), Ok(LayoutSpec::ThreeByTwo));
        assert_eq!(" 3X3 ".parse::<LayoutSpec>(), Ok(LayoutSpec::ThreeByThree));
        assert!(matches!(
            "4x4".parse::<LayoutSpec>(),
            Err(SelectionParseError::Layout(s)) if s == "4x4"
        ));
    }

    #[test]
    fn aspect_parses_names_and_ratios() {
        assert_eq!("square".parse::<AspectMode>(), Ok(AspectMode::Square));
        assert_eq!("Portrait".parse::<AspectMode>(), Ok(AspectMode::Portrait));
        assert_eq!("4:5".parse::<AspectMode>(), Ok(AspectMode::Portrait));
        assert!("landscape".parse::<AspectMode>().is_err());
    }

    #[test]
    fn selection_serde_uses_ui_labels() {
        assert_eq!(
            serde_json::to_string(&LayoutSpec::ThreeByTwo).unwrap(),
            "\"3x2\""
        );
        assert_eq!(
            serde_json::to_string(&AspectMode::Portrait).unwrap(),
            "\"portrait\""
        );
        let layout: LayoutSpec = serde_json::from_str("\"3x1\"").unwrap();
        assert_eq!(layout, LayoutSpec::ThreeByOne);
    }

    #[test]
    fn geometry_derives_totals() {
        let g = Geometry::new(3, 2, 1080, 1350).unwrap();
        assert_eq!(g.total_width(), 3240);
        assert_eq!(g.total_height(), 2700);
        assert_eq!(g.tile_count(), 6);
        assert_eq!(g.raster_bytes(), Some(3240 * 2700 * 3));
    }

    #[test]
    fn geometry_rejects_totals_past_u32() {
        assert_eq!(Geometry::new(3, 1, u32::MAX, 1), None);
        assert_eq!(Geometry::new(3, 3, 1080, u32::MAX / 2), None);
    }

    #[test]
    fn huge_geometry_raster_bytes_overflow_is_none() {
        let side = u32::MAX / 3;
        let g = Geometry::new(3, 3, side, side).unwrap();
        assert_eq!(g.total_width(), 3 * side);
        assert_eq!(g.raster_bytes(), None);
    }

    #[test]
    fn tile_entry_name_and_media_type() {
        let tile = Tile {
            index: 7,
            width: 1080,
            height: 1080,
            bytes: Arc::from(vec![1u8, 2, 3]),
        };
        assert_eq!(tile.entry_name(), "7.jpg");
        assert_eq!(tile.media_type(), "image/jpeg");
    }

    #[test]
    fn tile_sequence_sums_encoded_bytes() {
        let tiles: Vec<Tile> = (1..=3)
            .map(|index| Tile {
                index,
                width: 1,
                height: 1,
                bytes: Arc::from(vec![0u8; index as usize]),
            })
            .collect();
        let seq = TileSequence::from(tiles);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.encoded_bytes(), 6);
        assert_eq!(seq.get(0).map(|t| t.index), Some(1));
    }

    #[test]
    fn archive_blob_accessors() {
        let blob = ArchiveBlob::new(vec![0x50, 0x4b], "instagram-grid.zip");
        assert_eq!(blob.file_name(), "instagram-grid.zip");
        assert_eq!(blob.len(), 2);
        assert!(!blob.is_empty());
        assert_eq!(blob.into_bytes(), vec![0x50, 0x4b]);
    }
}
