//! First-fit placement search over an occupancy grid.
//!
//! # Responsibility
//! - Find the top-left-most free rectangle for one widget size.
//! - Guarantee a position for every widget that fits the column count.
//!
//! # Invariants
//! - Scan order is row-major: `y` ascending, then `x` ascending.
//! - The search never mutates the grid; `place_widget` marks explicitly.
//! - When no gap exists within the search depth, the widget is appended at
//!   `x = 0` directly below everything placed so far.

use crate::layout::occupancy::OccupancyGrid;
use crate::model::placed_widget::{GridPosition, GridRect};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Placement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Widget width exceeds the grid column count; it can never be placed.
    WidgetTooWide { width: i32, columns: i32 },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WidgetTooWide { width, columns } => write!(
                f,
                "widget width {width} exceeds grid column count {columns}"
            ),
        }
    }
}

impl Error for LayoutError {}

/// Returns the first free position for a `width × height` widget.
///
/// Rows `0..=max_search_rows` are scanned in order; within a row, columns
/// `0..=columns - width`. Non-positive sizes are treated as 1.
///
/// # Errors
/// - Returns `LayoutError::WidgetTooWide` when `width > columns`.
pub fn find_position(
    width: i32,
    height: i32,
    grid: &OccupancyGrid,
    columns: i32,
    max_search_rows: i32,
) -> Result<GridPosition, LayoutError> {
    let width = width.max(1);
    let height = height.max(1);
    if width > columns {
        return Err(LayoutError::WidgetTooWide { width, columns });
    }

    for y in 0..=max_search_rows.max(0) {
        for x in 0..=(columns - width) {
            if grid.is_free(x, y, width, height) {
                return Ok(GridPosition { x, y });
            }
        }
    }

    Ok(GridPosition {
        x: 0,
        y: grid.bottom(),
    })
}

/// Searches a position and marks the resulting rect as occupied.
pub fn place_widget(
    width: i32,
    height: i32,
    grid: &mut OccupancyGrid,
    columns: i32,
    max_search_rows: i32,
) -> Result<GridRect, LayoutError> {
    let position = find_position(width, height, grid, columns, max_search_rows)?;
    let rect = GridRect::new(position.x, position.y, width.max(1), height.max(1));
    grid.mark_occupied(rect);
    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::{find_position, place_widget, LayoutError};
    use crate::layout::occupancy::OccupancyGrid;
    use crate::model::placed_widget::{GridPosition, GridRect};

    #[test]
    fn empty_grid_places_at_origin() {
        let grid = OccupancyGrid::new();
        let position = find_position(4, 3, &grid, 12, 10).expect("fits");
        assert_eq!(position, GridPosition { x: 0, y: 0 });
    }

    #[test]
    fn fills_gaps_before_lower_rows() {
        let mut grid = OccupancyGrid::new();
        grid.mark_occupied(GridRect::new(0, 0, 4, 2));
        grid.mark_occupied(GridRect::new(8, 0, 4, 6));

        let position = find_position(4, 6, &grid, 12, 10).expect("fits");
        assert_eq!(position, GridPosition { x: 4, y: 0 });
    }

    #[test]
    fn too_wide_widget_is_rejected() {
        let grid = OccupancyGrid::new();
        let err = find_position(13, 1, &grid, 12, 10).unwrap_err();
        assert_eq!(
            err,
            LayoutError::WidgetTooWide {
                width: 13,
                columns: 12
            }
        );
    }

    #[test]
    fn falls_back_below_everything_when_depth_is_exhausted() {
        let mut grid = OccupancyGrid::new();
        grid.mark_occupied(GridRect::new(0, 0, 12, 3));
        grid.mark_occupied(GridRect::new(0, 3, 2, 4));

        let position = find_position(4, 2, &grid, 12, 1).expect("fallback never fails");
        assert_eq!(position, GridPosition { x: 0, y: 7 });
    }

    #[test]
    fn zero_depth_still_checks_first_row() {
        let grid = OccupancyGrid::new();
        let position = find_position(2, 2, &grid, 4, 0).expect("fits");
        assert_eq!(position, GridPosition { x: 0, y: 0 });
    }

    #[test]
    fn place_widget_marks_returned_rect() {
        let mut grid = OccupancyGrid::new();
        let first = place_widget(6, 4, &mut grid, 12, 10).expect("first");
        let second = place_widget(0, -2, &mut grid, 12, 10).expect("second");

        assert_eq!(first, GridRect::new(0, 0, 6, 4));
        assert_eq!(second, GridRect::new(6, 0, 1, 1));
        assert!(!grid.is_free(6, 0, 1, 1));
    }
}
