//! User-facing text and the preview manifest.
//!
//! The presentation host renders these as it likes (toasts, captions, grid
//! overlays). Keeping the wording here means every host says the same thing.
//!
//! # Preview manifest
//!
//! ```json
//! {
//!   "archive_name": "instagram-grid.zip",
//!   "layout": "3x1",
//!   "aspect": "portrait",
//!   "geometry": { "total_width": 3240, "total_height": 1350, ... },
//!   "tiles": [
//!     { "index": 1, "entry_name": "1.jpg", "width": 1080, "height": 1350,
//!       "media_type": "image/jpeg", "size": 183204 },
//!     ...
//!   ]
//! }
//! ```

use crate::types::{AspectMode, Geometry, LayoutSpec, TileSequence};
use serde::Serialize;

/// Success message after an upload has been split.
pub fn format_split_summary(pieces: usize) -> String {
    format!("Your image has been processed and split into {pieces} pieces.")
}

/// Success message after the archive has been handed to the host.
pub fn format_download_summary() -> &'static str {
    "All images have been downloaded as a zip file."
}

/// Alt text for one preview tile.
pub fn piece_alt_text(index: u32) -> String {
    format!("Grid piece {index}")
}

/// Selector label and description for a layout, e.g. `("3×2", "6 pieces grid")`.
pub fn layout_label(layout: LayoutSpec) -> (String, String) {
    let label = format!("{}×{}", layout.columns(), layout.rows());
    let description = match layout {
        LayoutSpec::ThreeByOne => "3 pieces horizontal".to_string(),
        other => format!("{} pieces grid", other.piece_count()),
    };
    (label, description)
}

/// Selector label and description for an aspect, e.g. `("Portrait", "4:5 ratio (1080×1350)")`.
pub fn aspect_label(aspect: AspectMode) -> (&'static str, String) {
    let g = crate::imaging::plan_geometry(LayoutSpec::ThreeByOne, aspect);
    let (w, h) = aspect.ratio();
    let label = match aspect {
        AspectMode::Square => "Square",
        AspectMode::Portrait => "Portrait",
    };
    (
        label,
        format!("{w}:{h} ratio ({}×{})", g.tile_width(), g.tile_height()),
    )
}

/// One-line description of a geometry.
pub fn format_geometry(geometry: &Geometry) -> String {
    format!(
        "{}×{} grid, {}×{} per tile ({}×{} total)",
        geometry.columns(),
        geometry.rows(),
        geometry.tile_width(),
        geometry.tile_height(),
        geometry.total_width(),
        geometry.total_height()
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewManifest<'a> {
    pub archive_name: &'a str,
    pub layout: LayoutSpec,
    pub aspect: AspectMode,
    pub geometry: Geometry,
    pub tiles: Vec<PreviewTile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewTile {
    pub index: u32,
    pub entry_name: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
    pub media_type: &'static str,
    /// Encoded size in bytes.
    pub size: usize,
}

/// Describe a tile sequence for the host's preview grid.
pub fn preview_manifest<'a>(
    archive_name: &'a str,
    layout: LayoutSpec,
    aspect: AspectMode,
    tiles: &TileSequence,
) -> PreviewManifest<'a> {
    PreviewManifest {
        archive_name,
        layout,
        aspect,
        geometry: crate::imaging::plan_geometry(layout, aspect),
        tiles: tiles
            .iter()
            .map(|t| PreviewTile {
                index: t.index,
                entry_name: t.entry_name(),
                alt: piece_alt_text(t.index),
                width: t.width,
                height: t.height,
                media_type: t.media_type(),
                size: t.bytes.len(),
            })
            .collect(),
    }
}

impl PreviewManifest<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
