//! Row/column grid reconstructed from split-point indicators.

use tracing::debug;

use crate::error::{Result, SplergeError};
use crate::geometry::{Axis, Bit, Rect, extract_intervals_of_ones};

/// Ordered row and column boundaries in absolute pixel coordinates.
///
/// `rows` holds `R + 1` strictly increasing values and `cols` holds `C + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<i32>,
    cols: Vec<i32>,
}

impl Grid {
    pub fn new(rows: Vec<i32>, cols: Vec<i32>) -> Result<Self> {
        validate_boundaries(&rows, Axis::Horizontal)?;
        validate_boundaries(&cols, Axis::Vertical)?;
        Ok(Self { rows, cols })
    }

    /// Build a grid from a table box and one indicator sequence per axis.
    ///
    /// `horz` runs along the table height and `vert` along its width; both are
    /// table-relative. Every maximal run of set values becomes one internal
    /// boundary at the run midpoint (rounded down).
    pub fn from_rect_and_masks<B: Bit>(rect: &Rect, horz: &[B], vert: &[B]) -> Result<Self> {
        let rows = boundaries_from_mask(rect, Axis::Horizontal, horz)?;
        let cols = boundaries_from_mask(rect, Axis::Vertical, vert)?;
        debug!(
            rows = rows.len() - 1,
            cols = cols.len() - 1,
            "grid from split point masks"
        );
        Self::new(rows, cols)
    }

    pub fn rows(&self) -> &[i32] {
        &self.rows
    }

    pub fn cols(&self) -> &[i32] {
        &self.cols
    }

    /// Boundaries crossed when moving along `axis` (rows for horizontal).
    pub fn boundaries(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::Horizontal => &self.rows,
            Axis::Vertical => &self.cols,
        }
    }

    pub fn rows_count(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn cols_count(&self) -> usize {
        self.cols.len() - 1
    }

    /// Outer box of the grid.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.cols[0],
            self.rows[0],
            self.cols[self.cols.len() - 1],
            self.rows[self.rows.len() - 1],
        )
    }

    /// Pixel box of the grid cell at (`row`, `col`).
    pub fn cell_rect(&self, row: usize, col: usize) -> Option<Rect> {
        if row >= self.rows_count() || col >= self.cols_count() {
            return None;
        }
        Some(Rect::new(
            self.cols[col],
            self.rows[row],
            self.cols[col + 1],
            self.rows[row + 1],
        ))
    }

    /// Grid cell (`row`, `col`) containing the pixel, if inside the grid.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        Some((locate(&self.rows, y)?, locate(&self.cols, x)?))
    }

    /// Soft check for callers that need at least one internal split on `axis`.
    pub fn require_internal_boundaries(&self, axis: Axis) -> Result<()> {
        if self.boundaries(axis).len() < 3 {
            return Err(SplergeError::EmptyGrid { axis });
        }
        Ok(())
    }

    /// Indicator sequence marking one pixel per internal boundary.
    ///
    /// Feeding the result back through [`Grid::from_rect_and_masks`] yields
    /// the same grid.
    pub fn split_points_mask(&self, axis: Axis) -> Vec<bool> {
        let bounds = self.boundaries(axis);
        let origin = bounds[0];
        let mut mask = vec![false; (bounds[bounds.len() - 1] - origin) as usize];
        for &b in &bounds[1..bounds.len() - 1] {
            mask[(b - origin) as usize] = true;
        }
        mask
    }
}

fn validate_boundaries(bounds: &[i32], axis: Axis) -> Result<()> {
    if bounds.len() < 2 || bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SplergeError::EmptyGrid { axis });
    }
    Ok(())
}

fn boundaries_from_mask<B: Bit>(rect: &Rect, axis: Axis, mask: &[B]) -> Result<Vec<i32>> {
    let origin = rect.start(axis);
    let end = rect.end(axis);
    let extent = rect.extent(axis).max(0) as usize;
    if mask.len() != extent {
        return Err(SplergeError::MaskShapeMismatch {
            expected: extent,
            got: mask.len(),
        });
    }

    let mut bounds = vec![origin];
    for run in extract_intervals_of_ones(mask) {
        let b = origin + ((run.start + run.end) / 2) as i32;
        if b > bounds[bounds.len() - 1] && b < end {
            bounds.push(b);
        }
    }
    bounds.push(end);
    Ok(bounds)
}

/// Index of the half-open span `[bounds[i], bounds[i + 1])` holding `v`.
pub(crate) fn locate(bounds: &[i32], v: i32) -> Option<usize> {
    let last = *bounds.last()?;
    if v < bounds[0] || v >= last {
        return None;
    }
    Some(bounds.partition_point(|&b| b <= v) - 1)
}
