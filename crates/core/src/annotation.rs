//! Helpers for turning raw ICDAR 2013 annotation attributes into table
//! geometry.
//!
//! The region and structure files give bounding boxes with a bottom-left
//! origin and inclusive row/column spans. Pages are rasterized with a
//! top-left origin, so boxes are flipped against the page height.

use crate::error::{Result, SplergeError};
use crate::geometry::Rect;
use crate::table::Cell;

/// Parse an integer coordinate attribute.
///
/// Some ground-truth files contain `ß` where a `6` was meant.
pub fn parse_coordinate(value: &str) -> Result<i32> {
    let cleaned = value.trim().replace('ß', "6");
    cleaned.parse().map_err(|_| {
        SplergeError::InvalidAnnotation(format!("invalid coordinate {value:?}"))
    })
}

/// Convert a bottom-left-origin box (`x1`, `y1`, `x2`, `y2`) into a
/// top-left-origin pixel rectangle lying inside the page.
pub fn bounding_box_to_rect(
    page_width: i32,
    page_height: i32,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) -> Result<Rect> {
    let rect = Rect::new(x1, page_height - y2, x2, page_height - y1);
    if !(0 <= rect.left && rect.left < rect.right && rect.right <= page_width) {
        return Err(SplergeError::InvalidAnnotation(format!(
            "horizontal extent {}..{} outside page width {page_width}",
            rect.left, rect.right
        )));
    }
    if !(0 <= rect.top && rect.top < rect.bottom && rect.bottom <= page_height) {
        return Err(SplergeError::InvalidAnnotation(format!(
            "vertical extent {}..{} outside page height {page_height}",
            rect.top, rect.bottom
        )));
    }
    Ok(rect)
}

/// Half-open grid span from inclusive ICDAR `start-*`/`end-*` attributes.
/// A missing end means the cell covers a single row or column.
pub fn grid_span(
    start_col: i32,
    end_col: Option<i32>,
    start_row: i32,
    end_row: Option<i32>,
) -> Result<Rect> {
    let end_col = end_col.unwrap_or(start_col);
    let end_row = end_row.unwrap_or(start_row);
    if start_col < 0 || start_row < 0 || end_col < start_col || end_row < start_row {
        return Err(SplergeError::InvalidAnnotation(format!(
            "invalid span cols {start_col}..={end_col}, rows {start_row}..={end_row}"
        )));
    }
    Ok(Rect::new(start_col, start_row, end_col + 1, end_row + 1))
}

/// Shift grid spans so the smallest row and column start is zero.
pub fn normalize_grid_origin(cells: &mut [Cell]) {
    let Some(min_col) = cells.iter().map(Cell::col_start).min() else {
        return;
    };
    let min_row = cells.iter().map(Cell::row_start).min().unwrap_or(0);
    for cell in cells {
        let g = &mut cell.grid_rect;
        *g = Rect::new(
            g.left - min_col,
            g.top - min_row,
            g.right - min_col,
            g.bottom - min_row,
        );
    }
}
