//! Markup tables and the training targets derived from them.
//!
//! This module turns annotated cell geometry into split-point masks,
//! rebuilds grids from binary split-point indicators and computes the merge
//! obligations between a grid and the annotated cells.

mod grid;
mod merge;
mod split_points;
mod types;

pub use grid::Grid;
pub use merge::{BoolMatrix, MergeMasks};
pub use split_points::SplitPoint;
pub use types::{Cell, Table};

#[cfg(test)]
mod markup_table_tests {
    use super::{Cell, Grid, Table};
    use crate::error::SplergeError;
    use crate::geometry::{Axis, Rect};

    fn cell(text: (i32, i32, i32, i32), cols: (i32, i32), rows: (i32, i32)) -> Cell {
        Cell::new(
            Rect::new(text.0, text.1, text.2, text.3),
            Rect::new(cols.0, rows.0, cols.1, rows.1),
        )
    }

    fn render(mask: &[bool]) -> String {
        mask.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    fn two_by_two() -> Table {
        Table::new(
            1,
            Rect::new(0, 0, 100, 50),
            vec![
                cell((5, 5, 40, 20), (0, 1), (0, 1)),
                cell((60, 5, 95, 20), (1, 2), (0, 1)),
                cell((5, 30, 40, 45), (0, 1), (1, 2)),
                cell((60, 30, 95, 45), (1, 2), (1, 2)),
            ],
        )
    }

    fn row_span() -> Table {
        Table::new(
            2,
            Rect::new(0, 0, 100, 50),
            vec![
                cell((5, 15, 40, 35), (0, 1), (0, 2)),
                cell((60, 5, 95, 20), (1, 2), (0, 1)),
                cell((60, 30, 95, 45), (1, 2), (1, 2)),
            ],
        )
    }

    #[test]
    fn split_masks_small_table() {
        let table = Table::new(
            7,
            Rect::new(0, 0, 12, 10),
            vec![
                cell((1, 1, 4, 3), (0, 1), (0, 1)),
                cell((7, 1, 11, 3), (1, 2), (0, 1)),
                cell((1, 6, 4, 9), (0, 1), (1, 2)),
                cell((7, 6, 11, 9), (1, 2), (1, 2)),
            ],
        );
        insta::assert_snapshot!(render(&table.horz_split_points_mask().unwrap()), @"0001111000");
        insta::assert_snapshot!(render(&table.vert_split_points_mask().unwrap()), @"000011110000");
    }

    #[test]
    fn split_masks_mark_gap_between_tightest_edges() {
        let table = two_by_two();
        let horz = table.horz_split_points_mask().unwrap();
        let vert = table.vert_split_points_mask().unwrap();
        assert_eq!(horz.len(), 50);
        assert_eq!(vert.len(), 100);
        let set: Vec<usize> = (0..horz.len()).filter(|&i| horz[i]).collect();
        assert_eq!(set, (20..31).collect::<Vec<_>>());
        let set: Vec<usize> = (0..vert.len()).filter(|&i| vert[i]).collect();
        assert_eq!(set, (40..61).collect::<Vec<_>>());
    }

    #[test]
    fn split_masks_are_table_relative() {
        let mut table = two_by_two();
        table.rect = Rect::new(100, 200, 200, 250);
        for c in &mut table.cells {
            c.text_rect = Rect::new(
                c.text_rect.left + 100,
                c.text_rect.top + 200,
                c.text_rect.right + 100,
                c.text_rect.bottom + 200,
            );
        }
        let shifted = table.horz_split_points_mask().unwrap();
        assert_eq!(shifted, two_by_two().horz_split_points_mask().unwrap());
    }

    #[test]
    fn double_split_point_falls_back_to_next_line() {
        let table = Table::new(
            3,
            Rect::new(0, 0, 40, 60),
            vec![
                cell((2, 2, 38, 15), (0, 1), (0, 1)),
                cell((2, 40, 38, 55), (0, 1), (2, 3)),
            ],
        );
        let points = table.split_points(Axis::Horizontal).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!((points[0].start, points[0].end), (15, 41));
        assert_eq!((points[1].start, points[1].end), (15, 41));

        let mask = table.horz_split_points_mask().unwrap();
        assert_eq!(mask.iter().filter(|&&b| b).count(), 26);

        let grid = Grid::from_rect_and_masks(&table.rect, &mask, &vec![false; 40]).unwrap();
        assert_eq!(grid.rows(), &[0, 28, 60]);
        let masks = table.create_merge_masks(&grid).unwrap();
        assert!(!masks.merge_down.get(0, 0));
    }

    #[test]
    fn missing_neighbour_is_inconsistent() {
        let table = Table::new(
            4,
            Rect::new(0, 0, 40, 60),
            vec![
                cell((2, 2, 38, 10), (0, 1), (0, 1)),
                cell((2, 40, 38, 55), (0, 1), (3, 4)),
            ],
        );
        assert_eq!(
            table.horz_split_points_mask(),
            Err(SplergeError::InconsistentGridAnnotation {
                table_id: 4,
                axis: Axis::Horizontal,
                boundary: 1,
                side: "following",
            })
        );
        // The orthogonal axis has no internal split points at all.
        assert_eq!(table.vert_split_points_mask().unwrap(), vec![false; 40]);
    }

    #[test]
    fn empty_table_has_no_grid() {
        let table = Table::new(5, Rect::new(0, 0, 10, 10), Vec::new());
        assert_eq!(
            table.vert_split_points_mask(),
            Err(SplergeError::EmptyGrid {
                axis: Axis::Vertical
            })
        );
    }

    #[test]
    fn overlapping_text_boxes_mark_nothing() {
        let table = Table::new(
            6,
            Rect::new(0, 0, 20, 10),
            vec![
                cell((0, 0, 12, 10), (0, 1), (0, 1)),
                cell((9, 0, 20, 10), (1, 2), (0, 1)),
            ],
        );
        assert_eq!(table.vert_split_points_mask().unwrap(), vec![false; 20]);
    }

    #[test]
    fn grid_from_rect_and_masks() {
        let rect = Rect::new(2, 1, 19, 12);
        let h_mask = [0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0];
        let v_mask = [0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0];
        let grid = Grid::from_rect_and_masks(&rect, &h_mask, &v_mask).unwrap();
        let expected = Grid::new(vec![1, 3, 5, 7, 9, 12], vec![2, 7, 11, 15, 19]).unwrap();
        assert_eq!(grid, expected);
        assert_eq!(grid.rows_count(), 5);
        assert_eq!(grid.cols_count(), 4);
    }

    #[test]
    fn grid_round_trips_ground_truth_masks() {
        for table in [two_by_two(), row_span()] {
            let grid = Grid::from_rect_and_masks(
                &table.rect,
                &table.horz_split_points_mask().unwrap(),
                &table.vert_split_points_mask().unwrap(),
            )
            .unwrap();
            assert_eq!(grid.rows_count(), table.rows_count());
            assert_eq!(grid.cols_count(), table.cols_count());
            assert_eq!(grid.rows(), &[0, 25, 50]);
            assert_eq!(grid.cols(), &[0, 50, 100]);
        }
    }

    #[test]
    fn merge_masks_without_spans_are_empty() {
        let table = two_by_two();
        let grid = Grid::new(vec![0, 25, 50], vec![0, 50, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert_eq!(masks.merge_right.rows(), 2);
        assert_eq!(masks.merge_right.cols(), 1);
        assert_eq!(masks.merge_down.rows(), 1);
        assert_eq!(masks.merge_down.cols(), 2);
        assert!(!masks.merge_right.any());
        assert!(!masks.merge_down.any());
    }

    #[test]
    fn merge_masks_row_span() {
        let table = row_span();
        let grid = Grid::new(vec![0, 25, 50], vec![0, 50, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert_eq!(masks.merge_down.to_rows(), vec![vec![true, false]]);
        assert_eq!(masks.merge_right.to_rows(), vec![vec![false], vec![false]]);
    }

    #[test]
    fn merge_masks_finer_predicted_grid() {
        // Extra predicted column boundary inside each true column.
        let table = two_by_two();
        let grid = Grid::new(vec![0, 25, 50], vec![0, 20, 50, 80, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert_eq!(
            masks.merge_right.to_rows(),
            vec![vec![true, false, true], vec![true, false, true]]
        );
        assert!(!masks.merge_down.any());
    }

    #[test]
    fn merge_masks_outside_annotation_never_merge() {
        let table = Table::new(
            8,
            Rect::new(0, 0, 100, 50),
            vec![
                cell((5, 5, 95, 20), (0, 2), (0, 1)),
                cell((5, 30, 40, 45), (0, 1), (1, 2)),
                cell((60, 30, 95, 45), (1, 2), (1, 2)),
            ],
        );
        // Grid extends past the table on the right.
        let grid = Grid::new(vec![0, 25, 50], vec![0, 50, 100, 140]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert_eq!(
            masks.merge_right.to_rows(),
            vec![vec![true, false], vec![false, false]]
        );
    }

    #[test]
    fn merge_masks_column_span_without_split_line() {
        let table = Table::new(
            9,
            Rect::new(0, 0, 100, 50),
            vec![
                cell((5, 5, 95, 20), (0, 2), (0, 1)),
                cell((5, 30, 95, 45), (0, 2), (1, 2)),
            ],
        );
        let grid = Grid::new(vec![0, 25, 50], vec![0, 50, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert_eq!(masks.merge_right.to_rows(), vec![vec![true], vec![true]]);
        assert_eq!(masks.merge_down.to_rows(), vec![vec![false, false]]);
    }

    #[test]
    fn merge_masks_double_split_gap_is_unowned() {
        let table = Table::new(
            10,
            Rect::new(0, 0, 100, 90),
            vec![
                cell((5, 5, 40, 85), (0, 1), (0, 3)),
                cell((60, 5, 95, 25), (1, 2), (0, 1)),
                cell((60, 65, 95, 85), (1, 2), (2, 3)),
            ],
        );
        let grid = Grid::new(vec![0, 30, 60, 90], vec![0, 50, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        // The middle grid row of column 1 lies between the two text boxes.
        assert_eq!(
            masks.merge_down.to_rows(),
            vec![vec![true, false], vec![true, false]]
        );
        assert!(!masks.merge_right.any());
    }

    #[test]
    fn merge_masks_interior_hole_never_merges() {
        let table = Table::new(
            11,
            Rect::new(0, 0, 100, 50),
            vec![
                cell((5, 5, 40, 20), (0, 1), (0, 1)),
                cell((60, 5, 95, 20), (1, 2), (0, 1)),
                cell((5, 30, 40, 45), (0, 1), (1, 2)),
            ],
        );
        let grid = Grid::new(vec![0, 25, 50], vec![0, 50, 100]).unwrap();
        let masks = table.create_merge_masks(&grid).unwrap();
        assert!(!masks.merge_right.get(1, 0));
        assert!(!masks.merge_down.get(0, 1));

        // Two predicted cells inside the same hole stay apart too.
        let finer = Grid::new(vec![0, 25, 50], vec![0, 50, 75, 100]).unwrap();
        let masks = table.create_merge_masks(&finer).unwrap();
        assert_eq!(
            masks.merge_right.to_rows(),
            vec![vec![false, true], vec![false, false]]
        );
    }
}
