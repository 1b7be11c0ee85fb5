//! Pure calculation functions for grid geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::{AspectMode, Geometry, LayoutSpec};

/// Width of every tile, independent of aspect mode.
pub const TILE_WIDTH: u32 = 1080;

/// Number of columns in every supported layout.
pub const GRID_COLUMNS: u32 = 3;

/// Calculate tile height from the fixed tile width and an aspect mode.
///
/// # Examples
/// ```
/// # use gridcut::imaging::tile_height_for;
/// # use gridcut::AspectMode;
/// assert_eq!(tile_height_for(AspectMode::Square), 1080);
/// // 4:5 portrait scaled from 1080 wide
/// assert_eq!(tile_height_for(AspectMode::Portrait), 1350);
/// ```
pub fn tile_height_for(aspect: AspectMode) -> u32 {
    let (w, h) = aspect.ratio();
    TILE_WIDTH * h / w
}

/// Resolve a layout/aspect selection into exact pixel geometry.
///
/// Total and deterministic: every combination is valid and the same inputs
/// always give the same result.
///
/// # Examples
/// ```
/// # use gridcut::{plan_geometry, AspectMode, LayoutSpec};
/// let g = plan_geometry(LayoutSpec::ThreeByOne, AspectMode::Portrait);
/// assert_eq!((g.total_width(), g.total_height()), (3240, 1350));
/// ```
pub fn plan_geometry(layout: LayoutSpec, aspect: AspectMode) -> Geometry {
    debug_assert_eq!(layout.columns(), GRID_COLUMNS);
    Geometry::planned(
        GRID_COLUMNS,
        layout.rows(),
        TILE_WIDTH,
        tile_height_for(aspect),
    )
}

/// One grid cell's pixel rectangle in the full raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// 1-based posting index.
    pub index: u32,
    pub row: u32,
    pub column: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Posting index for a cell: row-major, 1-based.
pub fn tile_index(row: u32, column: u32, columns: u32) -> u32 {
    row * columns + column + 1
}

/// All cell rectangles of a geometry in row-major (posting) order.
///
/// Cells are laid edge to edge: together they cover the full
/// `total_width × total_height` area with no overlap.
pub fn cell_rects(geometry: &Geometry) -> Vec<CellRect> {
    let (cols, rows) = (geometry.columns(), geometry.rows());
    let (w, h) = (geometry.tile_width(), geometry.tile_height());

    (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |column| CellRect {
                index: tile_index(row, column, cols),
                row,
                column,
                x: column * w,
                y: row * h,
                width: w,
                height: h,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_six_combinations() {
        let expected = [
            (LayoutSpec::ThreeByOne, AspectMode::Square, 1080),
            (LayoutSpec::ThreeByTwo, AspectMode::Square, 2160),
            (LayoutSpec::ThreeByThree, AspectMode::Square, 3240),
            (LayoutSpec::ThreeByOne, AspectMode::Portrait, 1350),
            (LayoutSpec::ThreeByTwo, AspectMode::Portrait, 2700),
            (LayoutSpec::ThreeByThree, AspectMode::Portrait, 4050),
        ];
        for (layout, aspect, total_height) in expected {
            let g = plan_geometry(layout, aspect);
            assert_eq!(g.total_width(), 3240, "{layout} {aspect}");
            assert_eq!(g.total_height(), total_height, "{layout} {aspect}");
            assert_eq!(g.total_height(), g.rows() * g.tile_height());
            assert_eq!(g.total_width(), g.columns() * g.tile_width());
            assert_eq!(g.tile_width(), 1080);
            assert_eq!(g.columns(), 3);
        }
    }

    #[test]
    fn square_3x3_geometry() {
        let g = plan_geometry(LayoutSpec::ThreeByThree, AspectMode::Square);
        assert_eq!(Some(g), Geometry::new(3, 3, 1080, 1080));
        assert_eq!(
            (
                g.total_width(),
                g.total_height(),
                g.tile_width(),
                g.tile_height(),
                g.columns(),
                g.rows()
            ),
            (3240, 3240, 1080, 1080, 3, 3)
        );
    }

    #[test]
    fn portrait_3x1_geometry() {
        let g = plan_geometry(LayoutSpec::ThreeByOne, AspectMode::Portrait);
        assert_eq!(
            (
                g.total_width(),
                g.total_height(),
                g.tile_width(),
                g.tile_height(),
                g.columns(),
                g.rows()
            ),
            (3240, 1350, 1080, 1350, 3, 1)
        );
    }

    #[test]
    fn planning_is_idempotent() {
        for layout in LayoutSpec::ALL {
            for aspect in AspectMode::ALL {
                assert_eq!(plan_geometry(layout, aspect), plan_geometry(layout, aspect));
            }
        }
    }

    #[test]
    fn tile_index_is_row_major_one_based() {
        assert_eq!(tile_index(0, 0, 3), 1);
        assert_eq!(tile_index(0, 2, 3), 3);
        assert_eq!(tile_index(1, 0, 3), 4);
        assert_eq!(tile_index(2, 2, 3), 9);
    }

    #[test]
    fn cells_follow_posting_order() {
        let g = plan_geometry(LayoutSpec::ThreeByTwo, AspectMode::Portrait);
        let cells = cell_rects(&g);
        assert_eq!(cells.len(), 6);
        for (k, cell) in cells.iter().enumerate() {
            assert_eq!(cell.index as usize, k + 1);
        }
        assert_eq!((cells[0].x, cells[0].y), (0, 0));
        assert_eq!((cells[2].x, cells[2].y), (2160, 0));
        assert_eq!((cells[3].x, cells[3].y), (0, 1350));
        assert_eq!((cells[5].row, cells[5].column), (1, 2));
    }

    #[test]
    fn cells_partition_the_raster() {
        for layout in LayoutSpec::ALL {
            for aspect in AspectMode::ALL {
                let g = plan_geometry(layout, aspect);
                let cells = cell_rects(&g);

                let area: u64 = cells
                    .iter()
                    .map(|c| u64::from(c.width) * u64::from(c.height))
                    .sum();
                assert_eq!(
                    area,
                    u64::from(g.total_width()) * u64::from(g.total_height())
                );

                for c in &cells {
                    assert!(c.x + c.width <= g.total_width());
                    assert!(c.y + c.height <= g.total_height());
                }

                // Equal total area plus pairwise disjointness means full cover.
                for (i, a) in cells.iter().enumerate() {
                    for b in &cells[i + 1..] {
                        let disjoint = a.x + a.width <= b.x
                            || b.x + b.width <= a.x
                            || a.y + a.height <= b.y
                            || b.y + b.height <= a.y;
                        assert!(disjoint, "cells {} and {} overlap", a.index, b.index);
                    }
                }
            }
        }
    }
}
