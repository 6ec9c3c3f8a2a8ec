//! Mapping between a flat, ordered photo sequence and a grid of cells.
//!
//! The grid is never stored. Every view rebuild regroups the same sequence
//! into rows of `columns` cells, so changing the column count only changes
//! where rows break, never the order of the items.

use serde::{Deserialize, Serialize};

/// Width and height of one grid cell in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Cell of the `index`-th item when rows hold `columns` items.
///
/// # Panics
///
/// Panics if `columns` is zero.
pub fn position_of(index: usize, columns: usize) -> GridPosition {
    assert!(columns > 0, "grid needs at least one column");
    GridPosition {
        row: index / columns,
        col: index % columns,
    }
}

/// Sequence index of a cell, or `None` if `col` lies outside the grid.
pub fn index_of(row: usize, col: usize, columns: usize) -> Option<usize> {
    if col >= columns {
        return None;
    }
    row.checked_mul(columns)?.checked_add(col)
}

/// Number of rows needed to show `len` items.
pub fn row_count(len: usize, columns: usize) -> usize {
    assert!(columns > 0, "grid needs at least one column");
    len.div_ceil(columns)
}

/// How many cells of `cell_size` fit across `width`. Never less than one,
/// so a window narrower than a cell still shows a single column.
pub fn columns_for_width(width: u32, cell_size: u32) -> usize {
    (width / cell_size.max(1)).max(1) as usize
}

/// The item shown at `position`, if that cell is occupied.
pub fn item_at<T>(items: &[T], position: GridPosition, columns: usize) -> Option<&T> {
    index_of(position.row, position.col, columns).and_then(|i| items.get(i))
}

/// Every occupied cell in sequence order.
pub fn cells(len: usize, columns: usize) -> impl Iterator<Item = (usize, GridPosition)> {
    assert!(columns > 0, "grid needs at least one column");
    (0..len).map(move |i| (i, position_of(i, columns)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_counts() {
        assert_eq!(row_count(0, 3), 0);
        assert_eq!(row_count(7, 3), 3);
        assert_eq!(row_count(9, 3), 3);
        assert_eq!(row_count(10, 3), 4);
        assert_eq!(row_count(1, 1), 1);
    }

    #[test]
    fn position_and_index_are_inverse() {
        for columns in 1..=7 {
            for i in 0..50 {
                let pos = position_of(i, columns);
                assert!(pos.col < columns);
                assert_eq!(index_of(pos.row, pos.col, columns), Some(i));
            }
            for row in 0..8 {
                for col in 0..columns {
                    let i = index_of(row, col, columns).unwrap();
                    assert_eq!(position_of(i, columns), GridPosition::new(row, col));
                }
            }
        }
    }

    #[test]
    fn column_outside_grid_has_no_index() {
        assert_eq!(index_of(0, 3, 3), None);
        assert_eq!(index_of(2, 5, 4), None);
    }

    #[test]
    fn regrouping_keeps_sequence_order() {
        let items: Vec<u32> = (0..11).collect();
        for columns in [1, 2, 3, 5, 11, 20] {
            let mut seen = Vec::new();
            for row in 0..row_count(items.len(), columns) {
                for col in 0..columns {
                    if let Some(item) = item_at(&items, GridPosition::new(row, col), columns) {
                        seen.push(*item);
                    }
                }
            }
            assert_eq!(seen, items, "columns = {columns}");
        }
    }

    #[test]
    fn trailing_cells_are_empty() {
        let items = ["a", "b", "c", "d"];
        assert_eq!(item_at(&items, GridPosition::new(1, 0), 3), Some(&"d"));
        assert_eq!(item_at(&items, GridPosition::new(1, 1), 3), None);
        assert_eq!(item_at(&items, GridPosition::new(1, 2), 3), None);
        assert_eq!(item_at(&items, GridPosition::new(0, 3), 3), None);
    }

    #[test]
    fn columns_follow_width() {
        assert_eq!(columns_for_width(1000, 300), 3);
        assert_eq!(columns_for_width(1200, 300), 4);
        assert_eq!(columns_for_width(299, 300), 1);
        assert_eq!(columns_for_width(0, 300), 1);
        assert_eq!(columns_for_width(500, 0), 500);
    }

    #[test]
    fn cells_enumerate_in_order() {
        let cells: Vec<_> = cells(5, 2).collect();
        assert_eq!(
            cells,
            vec![
                (0, GridPosition::new(0, 0)),
                (1, GridPosition::new(0, 1)),
                (2, GridPosition::new(1, 0)),
                (3, GridPosition::new(1, 1)),
                (4, GridPosition::new(2, 0)),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "at least one column")]
    fn zero_columns_panics() {
        position_of(0, 0);
    }

    #[test]
    fn position_serializes() {
        let json = serde_json::to_string(&GridPosition::new(2, 1)).unwrap();
        assert_eq!(json, r#"{"row":2,"col":1}"#);
    }
}
