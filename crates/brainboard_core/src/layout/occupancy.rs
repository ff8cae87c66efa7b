//! Occupied-cell tracking for one placement pass.
//!
//! # Invariants
//! - Marking is idempotent (set semantics).
//! - A grid is never shared between passes.

use crate::model::placed_widget::GridRect;
use std::collections::HashSet;

/// Set of occupied integer grid cells.
#[derive(Debug, Clone, Default)]
pub struct OccupancyGrid {
    cells: HashSet<(i32, i32)>,
    bottom: i32,
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every cell in `[x, x+w) × [y, y+h)` as occupied.
    pub fn mark_occupied(&mut self, rect: GridRect) {
        if rect.w <= 0 || rect.h <= 0 {
            return;
        }
        let right = rect.x.saturating_add(rect.w);
        let bottom = rect.y.saturating_add(rect.h);
        for y in rect.y..bottom {
            for x in rect.x..right {
                self.cells.insert((x, y));
            }
        }
        self.bottom = self.bottom.max(bottom);
    }

    /// Returns `true` iff no cell of the queried rectangle is occupied.
    pub fn is_free(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        (y..y.saturating_add(h.max(0)))
            .all(|cy| (x..x.saturating_add(w.max(0))).all(|cx| !self.cells.contains(&(cx, cy))))
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cells.contains(&(x, y))
    }

    /// One past the lowest occupied row; `0` for an empty grid.
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::OccupancyGrid;
    use crate::model::placed_widget::GridRect;

    #[test]
    fn marking_is_idempotent() {
        let mut grid = OccupancyGrid::new();
        grid.mark_occupied(GridRect::new(0, 0, 2, 2));
        grid.mark_occupied(GridRect::new(0, 0, 2, 2));
        grid.mark_occupied(GridRect::new(1, 1, 2, 1));

        assert_eq!(grid.len(), 5);
        assert_eq!(grid.bottom(), 2);
    }

    #[test]
    fn is_free_checks_every_cell() {
        let mut grid = OccupancyGrid::new();
        grid.mark_occupied(GridRect::new(3, 2, 1, 1));

        assert!(grid.is_free(0, 0, 3, 3));
        assert!(!grid.is_free(0, 0, 4, 3));
        assert!(grid.is_free(4, 0, 8, 10));
        assert!(grid.is_occupied(3, 2));
    }

    #[test]
    fn empty_rects_mark_nothing() {
        let mut grid = OccupancyGrid::new();
        grid.mark_occupied(GridRect::new(0, 0, 0, 5));
        grid.mark_occupied(GridRect::new(0, 0, 3, -1));

        assert!(grid.is_empty());
        assert_eq!(grid.bottom(), 0);
    }
}
