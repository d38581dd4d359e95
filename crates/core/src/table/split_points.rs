//! Ground-truth split-point derivation from cell geometry.
//!
//! Grid lines are numbered so that line `k` separates row (or column) `k - 1`
//! from row `k`. A cell spanning `start..end` touches lines `start` and
//! `end`. The first and last line of a table are its outer edges; every line
//! in between is an internal split point whose pixel extent is the gap
//! between the tightest text boxes on either side.

use std::ops::Range;

use itertools::Itertools;
use tracing::debug;

use super::types::{Cell, Table};
use crate::error::{Result, SplergeError};
use crate::geometry::Axis;

/// An internal split point and the pixels it covers.
///
/// `start..end` is relative to the table origin along the split axis and may
/// be empty or inverted when neighbouring text boxes overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPoint {
    pub line: i32,
    pub start: i32,
    pub end: i32,
}

impl SplitPoint {
    /// Covered mask positions, clamped to `0..len`.
    pub fn pixel_range(&self, len: usize) -> Range<usize> {
        let clamp = |v: i32| (v.max(0) as usize).min(len);
        let start = clamp(self.start);
        let end = clamp(self.end).max(start);
        start..end
    }

    /// Table-relative boundary position, the midpoint of the covered pixels.
    pub fn position(&self) -> i32 {
        (self.start + self.end).div_euclid(2)
    }
}

impl Table {
    /// Sorted, deduplicated grid line indices touched by any cell span.
    pub fn split_lines(&self, axis: Axis) -> Vec<i32> {
        self.cells
            .iter()
            .flat_map(|c| [c.span_start(axis), c.span_end(axis)])
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Cells lying directly before `line` (above or to the left).
    ///
    /// The lower line of a double split point has no cell ending on it, so
    /// the lookup falls back to cells ending one line earlier.
    fn near_cells(&self, axis: Axis, line: i32) -> Vec<&Cell> {
        let exact: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|c| c.span_end(axis) == line)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        self.cells
            .iter()
            .filter(|c| c.span_end(axis) == line - 1)
            .collect()
    }

    /// Cells lying directly after `line` (below or to the right).
    ///
    /// The upper line of a double split point has no cell starting on it, so
    /// the lookup falls back to cells starting one line later.
    fn far_cells(&self, axis: Axis, line: i32) -> Vec<&Cell> {
        let exact: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|c| c.span_start(axis) == line)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        self.cells
            .iter()
            .filter(|c| c.span_start(axis) == line + 1)
            .collect()
    }

    /// Derive every internal split point along `axis`.
    pub fn split_points(&self, axis: Axis) -> Result<Vec<SplitPoint>> {
        let lines = self.split_lines(axis);
        if lines.len() < 2 {
            return Err(SplergeError::EmptyGrid { axis });
        }
        let origin = self.rect.start(axis);
        let inconsistent = |line, side| SplergeError::InconsistentGridAnnotation {
            table_id: self.id,
            axis,
            boundary: line,
            side,
        };

        let mut points = Vec::with_capacity(lines.len() - 2);
        for &line in &lines[1..lines.len() - 1] {
            let near = self.near_cells(axis, line);
            let far = self.far_cells(axis, line);
            let start = near
                .iter()
                .map(|c| c.text_rect.end(axis))
                .max()
                .ok_or_else(|| inconsistent(line, "preceding"))?;
            let end = far
                .iter()
                .map(|c| c.text_rect.start(axis))
                .min()
                .ok_or_else(|| inconsistent(line, "following"))?;
            points.push(SplitPoint {
                line,
                start: start - origin,
                end: end - origin + 1,
            });
        }
        debug!(table = self.id, %axis, count = points.len(), "derived split points");
        Ok(points)
    }

    /// Per-pixel ground-truth mask along `axis`; `true` inside split gaps.
    pub fn split_points_mask(&self, axis: Axis) -> Result<Vec<bool>> {
        let len = self.rect.extent(axis).max(0) as usize;
        let mut mask = vec![false; len];
        for point in self.split_points(axis)? {
            mask[point.pixel_range(len)].fill(true);
        }
        Ok(mask)
    }

    /// Mask of the gaps between rows, one entry per pixel of table height.
    pub fn horz_split_points_mask(&self) -> Result<Vec<bool>> {
        self.split_points_mask(Axis::Horizontal)
    }

    /// Mask of the gaps between columns, one entry per pixel of table width.
    pub fn vert_split_points_mask(&self) -> Result<Vec<bool>> {
        self.split_points_mask(Axis::Vertical)
    }
}
