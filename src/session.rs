//! Per-user grid state: what is selected, what was produced, and which
//! upload is current.
//!
//! The pipeline itself is stateless; [`GridSession`] is where the host keeps
//! the result between the upload and the download. Each upload gets an
//! [`UploadTicket`]. Starting a newer upload, or resetting, makes every older
//! ticket stale, and a stale result is dropped when it arrives instead of
//! replacing what the user is now looking at. In-flight work is never
//! interrupted; its output is simply discarded.
//!
//! The session needs `&mut self` to change. A host that drives it from
//! several tasks wraps it in a mutex and holds the lock only around these
//! calls, never across an `.await`.

use crate::imaging::plan_geometry;
use crate::types::{AspectMode, Geometry, LayoutSpec, TileSequence};
use tracing::{debug, warn};

/// Identifies one upload and the selection it was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
    layout: LayoutSpec,
    aspect: AspectMode,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn layout(&self) -> LayoutSpec {
        self.layout
    }

    pub fn aspect(&self) -> AspectMode {
        self.aspect
    }

    /// Geometry for this upload, planned from the ticket's selection.
    pub fn geometry(&self) -> Geometry {
        plan_geometry(self.layout, self.aspect)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridSession {
    layout: LayoutSpec,
    aspect: AspectMode,
    generation: u64,
    /// Selection the current tiles were produced with.
    produced_with: Option<(LayoutSpec, AspectMode)>,
    tiles: Option<TileSequence>,
}

impl GridSession {
    /// Session with the 3x3/square fallback selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(layout: LayoutSpec, aspect: AspectMode) -> Self {
        Self {
            layout,
            aspect,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> LayoutSpec {
        self.layout
    }

    pub fn aspect(&self) -> AspectMode {
        self.aspect
    }

    /// Changing the selection does not touch tiles already produced.
    pub fn set_layout(&mut self, layout: LayoutSpec) {
        self.layout = layout;
    }

    pub fn set_aspect(&mut self, aspect: AspectMode) {
        self.aspect = aspect;
    }

    /// Number of tiles the current selection will produce.
    pub fn piece_count(&self) -> u32 {
        self.layout.piece_count()
    }

    /// Start an upload with the current selection. Any older ticket goes stale.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.generation += 1;
        UploadTicket {
            generation: self.generation,
            layout: self.layout,
            aspect: self.aspect,
        }
    }

    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store the tiles for `ticket` if it is still the newest upload.
    ///
    /// Returns `false` and drops `tiles` when the ticket is stale.
    pub fn complete_upload(&mut self, ticket: &UploadTicket, tiles: TileSequence) -> bool {
        if !self.is_current(ticket) {
            warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding result of a superseded upload"
            );
            return false;
        }
        debug!(ticket = ticket.generation, pieces = tiles.len(), "upload completed");
        self.produced_with = Some((ticket.layout, ticket.aspect));
        self.tiles = Some(tiles);
        true
    }

    /// Tiles of the last completed upload, in posting order.
    pub fn tiles(&self) -> Option<&TileSequence> {
        self.tiles.as_ref()
    }

    /// Layout and aspect the current tiles were produced with.
    pub fn produced_with(&self) -> Option<(LayoutSpec, AspectMode)> {
        self.produced_with
    }

    pub fn has_tiles(&self) -> bool {
        self.tiles.is_some()
    }

    /// Start over: release the tiles and invalidate any in-flight upload.
    ///
    /// The selection is kept.
    pub fn reset(&mut self) -> Option<TileSequence> {
        self.generation += 1;
        self.produced_with = None;
        self.tiles.take()
    }
}
