//! Merge obligations between a (possibly predicted) grid and true cells.

use tracing::debug;

use super::grid::{Grid, locate};
use super::types::Table;
use crate::error::Result;
use crate::geometry::Axis;

/// Dense row-major boolean matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoolMatrix {
    rows: usize,
    cols: usize,
    data: Vec<bool>,
}

impl BoolMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.data[row * self.cols + col] = value;
    }

    pub fn any(&self) -> bool {
        self.data.iter().any(|&v| v)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks() panics on zero size
        (0..self.rows).map(move |r| &self.data[r * self.cols..(r + 1) * self.cols])
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.iter_rows().map(<[bool]>::to_vec).collect()
    }
}

/// Merge targets for a grid with `R` rows and `C` columns.
///
/// `merge_right` is `R x (C - 1)`: cell `(r, c)` must merge with `(r, c + 1)`.
/// `merge_down` is `(R - 1) x C`: cell `(r, c)` must merge with `(r + 1, c)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeMasks {
    pub merge_right: BoolMatrix,
    pub merge_down: BoolMatrix,
}

/// Ground-truth cell regions: grid line positions plus the owning cell of
/// every true grid position.
struct CellLayout {
    row_lines: Vec<i32>,
    col_lines: Vec<i32>,
    owners: Vec<Option<usize>>,
}

impl CellLayout {
    fn build(table: &Table) -> Result<Self> {
        let (row_first, row_lines) = line_positions(table, Axis::Horizontal)?;
        let (col_first, col_lines) = line_positions(table, Axis::Vertical)?;
        let n_rows = row_lines.len() - 1;
        let n_cols = col_lines.len() - 1;

        let mut owners = vec![None; n_rows * n_cols];
        for (idx, cell) in table.cells.iter().enumerate() {
            let rows =
                (cell.row_start() - row_first) as usize..(cell.row_end() - row_first) as usize;
            let cols =
                (cell.col_start() - col_first) as usize..(cell.col_end() - col_first) as usize;
            for r in rows {
                for c in cols.clone() {
                    let slot = &mut owners[r * n_cols + c];
                    if slot.is_none() {
                        *slot = Some(idx);
                    }
                }
            }
        }
        Ok(Self {
            row_lines,
            col_lines,
            owners,
        })
    }

    fn owner_at(&self, x: i32, y: i32) -> Option<usize> {
        let r = locate(&self.row_lines, y)?;
        let c = locate(&self.col_lines, x)?;
        self.owners[r * (self.col_lines.len() - 1) + c]
    }
}

/// Absolute pixel position of every grid line from the first to the last one
/// referenced by the table, together with the first line index.
///
/// Outer lines sit on the table edges, internal split points at the midpoint
/// of their gap. The two lines of a double split point sit on the text edges
/// bounding the gap instead, so the empty row or column between them keeps
/// its width and stays unowned. Lines no cell starts or ends on are crossed
/// by spanning cells only and collapse onto the previous line.
fn line_positions(table: &Table, axis: Axis) -> Result<(i32, Vec<i32>)> {
    let lines = table.split_lines(axis);
    let points = table.split_points(axis)?;
    let first = lines[0];
    let last = lines[lines.len() - 1];
    let origin = table.rect.start(axis);

    let mut positions = vec![origin; (last - first + 1) as usize];
    positions[(last - first) as usize] = table.rect.end(axis);
    let mut known = vec![false; positions.len()];
    known[0] = true;
    known[(last - first) as usize] = true;
    for point in &points {
        let k = (point.line - first) as usize;
        let ends_here = table.cells.iter().any(|c| c.span_end(axis) == point.line);
        let starts_here = table.cells.iter().any(|c| c.span_start(axis) == point.line);
        let offset = match (ends_here, starts_here) {
            // upper line of a double split point
            (true, false) => point.start,
            // lower line
            (false, true) => point.end - 1,
            _ => point.position(),
        };
        positions[k] = origin + offset;
        known[k] = true;
    }
    for k in 1..positions.len() {
        if !known[k] {
            positions[k] = positions[k - 1];
        }
        positions[k] = positions[k].max(positions[k - 1]);
    }
    Ok((first, positions))
}

impl Table {
    /// Derive which adjacent cells of `grid` belong to the same true cell.
    ///
    /// Each grid cell is represented by its center. A pair merges only when
    /// both centers fall in the region of the same annotated cell; pairs with
    /// either center outside every annotated cell never merge.
    pub fn create_merge_masks(&self, grid: &Grid) -> Result<MergeMasks> {
        let layout = CellLayout::build(self)?;
        let n_rows = grid.rows_count();
        let n_cols = grid.cols_count();

        let owners: Vec<Option<usize>> = (0..n_rows)
            .flat_map(|r| (0..n_cols).map(move |c| (r, c)))
            .map(|(r, c)| {
                grid.cell_rect(r, c).and_then(|rect| {
                    let (x, y) = rect.center();
                    layout.owner_at(x, y)
                })
            })
            .collect();
        let same_owner = |a: Option<usize>, b: Option<usize>| a.is_some() && a == b;

        let mut merge_right = BoolMatrix::new(n_rows, n_cols.saturating_sub(1));
        for r in 0..n_rows {
            for c in 0..n_cols.saturating_sub(1) {
                let merge = same_owner(owners[r * n_cols + c], owners[r * n_cols + c + 1]);
                merge_right.set(r, c, merge);
            }
        }
        let mut merge_down = BoolMatrix::new(n_rows.saturating_sub(1), n_cols);
        for r in 0..n_rows.saturating_sub(1) {
            for c in 0..n_cols {
                let merge = same_owner(owners[r * n_cols + c], owners[(r + 1) * n_cols + c]);
                merge_down.set(r, c, merge);
            }
        }
        debug!(
            table = self.id,
            rows = n_rows,
            cols = n_cols,
            "derived merge masks"
        );
        Ok(MergeMasks {
            merge_right,
            merge_down,
        })
    }
}
