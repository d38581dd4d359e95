//! Markup table types.

use crate::geometry::{Axis, Rect};

/// One annotated cell: its text box in pixels and its half-open grid span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text_rect: Rect,
    pub grid_rect: Rect,
}

impl Cell {
    pub const fn new(text_rect: Rect, grid_rect: Rect) -> Self {
        Self {
            text_rect,
            grid_rect,
        }
    }

    pub fn col_start(&self) -> i32 {
        self.grid_rect.left
    }

    pub fn col_end(&self) -> i32 {
        self.grid_rect.right
    }

    pub fn row_start(&self) -> i32 {
        self.grid_rect.top
    }

    pub fn row_end(&self) -> i32 {
        self.grid_rect.bottom
    }

    /// First grid line index of the span, across the given split axis.
    pub(crate) fn span_start(&self, axis: Axis) -> i32 {
        self.grid_rect.start(axis)
    }

    /// Last grid line index of the span (exclusive end).
    pub(crate) fn span_end(&self, axis: Axis) -> i32 {
        self.grid_rect.end(axis)
    }

    /// True if the cell covers more than one row or column.
    pub fn is_spanning(&self) -> bool {
        self.grid_rect.width() > 1 || self.grid_rect.height() > 1
    }
}

/// A hand-annotated table: page-relative pixel box plus its cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub id: i64,
    pub rect: Rect,
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn new(id: i64, rect: Rect, cells: Vec<Cell>) -> Self {
        Self { id, rect, cells }
    }

    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    /// Number of grid rows spanned by the annotation.
    pub fn rows_count(&self) -> usize {
        self.span_count(Axis::Horizontal)
    }

    /// Number of grid columns spanned by the annotation.
    pub fn cols_count(&self) -> usize {
        self.span_count(Axis::Vertical)
    }

    fn span_count(&self, axis: Axis) -> usize {
        let min = self.cells.iter().map(|c| c.span_start(axis)).min();
        let max = self.cells.iter().map(|c| c.span_end(axis)).max();
        match (min, max) {
            (Some(min), Some(max)) if max > min => (max - min) as usize,
            _ => 0,
        }
    }
}
