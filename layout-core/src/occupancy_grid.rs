//! Raster occupancy analysis of a floor plan. The grid is a short-lived
//! working structure: built per detection run, discarded after zones are
//! extracted.

use crate::{Bounds, Line, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Open,
    Wall,
    Forbidden,
    EntranceClearance,
}

/// Row-major cell grid over the floor bounds at a fixed resolution.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Vec<CellState>,
    pub cols: usize,
    pub rows: usize,
    pub resolution: f64,
    pub origin: Point,
}

impl OccupancyGrid {
    /// All cells start open. Caller guarantees non-degenerate finite bounds.
    pub fn new(bounds: &Bounds, resolution: f64) -> Self {
        let cols = (bounds.width() / resolution).ceil().max(1.0) as usize;
        let rows = (bounds.height() / resolution).ceil().max(1.0) as usize;
        OccupancyGrid {
            cells: vec![CellState::Open; cols * rows],
            cols,
            rows,
            resolution,
            origin: Point::new(bounds.min_x, bounds.min_y),
        }
    }

    fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, col: usize, row: usize) -> CellState {
        self.cells[self.index(col, row)]
    }

    /// Marks a single cell, never downgrading an already-blocked cell.
    fn mark_if_open(&mut self, col: i64, row: i64, state: CellState) {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return;
        }
        let idx = self.index(col as usize, row as usize);
        if self.cells[idx] == CellState::Open {
            self.cells[idx] = state;
        }
    }

    /// Grid coordinates of the cell containing a world point, unclamped.
    fn cell_of(&self, p: &Point) -> (i64, i64) {
        (
            ((p.x - self.origin.x) / self.resolution).floor() as i64,
            ((p.y - self.origin.y) / self.resolution).floor() as i64,
        )
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            self.origin.x + (col as f64 + 0.5) * self.resolution,
            self.origin.y + (row as f64 + 0.5) * self.resolution,
        )
    }

    /// Rasterizes a wall segment with integer-error line stepping and blocks
    /// every traversed cell plus a buffer radius around it.
    pub fn mark_wall(&mut self, wall: &Line, buffer: f64) {
        let (x0, y0) = self.cell_of(&wall.start);
        let (x1, y1) = self.cell_of(&wall.end);
        let radius = (buffer / self.resolution).ceil() as i64;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx: i64 = if x0 < x1 { 1 } else { -1 };
        let sy: i64 = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.mark_disc(x, y, radius, CellState::Wall);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn mark_disc(&mut self, col: i64, row: i64, radius: i64, state: CellState) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.mark_if_open(col + dx, row + dy, state);
            }
        }
    }

    /// Blocks the cells covered by a box expanded by `buffer`, leaving cells
    /// that are already non-open untouched.
    pub fn mark_box(&mut self, bounds: &Bounds, buffer: f64, state: CellState) {
        let expanded = bounds.expanded(buffer);
        let (min_col, min_row) = self.cell_of(&Point::new(expanded.min_x, expanded.min_y));
        let (max_col, max_row) = self.cell_of(&Point::new(expanded.max_x, expanded.max_y));
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                self.mark_if_open(col, row, state);
            }
        }
    }

    pub fn open_cell_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == CellState::Open)
            .count()
    }

    /// Area represented by one cell, in square metres.
    pub fn cell_area(&self) -> f64 {
        self.resolution * self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let grid = OccupancyGrid::new(&bounds, 0.5);
        assert_eq!(grid.cols, 20);
        assert_eq!(grid.rows, 20);
        assert_eq!(grid.open_cell_count(), 400);
    }

    #[test]
    fn test_mark_wall_blocks_cells() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut grid = OccupancyGrid::new(&bounds, 0.5);
        let wall = Line::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        grid.mark_wall(&wall, 0.3);
        assert!(grid.open_cell_count() < 400);
        // A cell far from the wall stays open
        assert_eq!(grid.get(10, 0), CellState::Open);
    }

    #[test]
    fn test_mark_box_respects_existing_marks() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut grid = OccupancyGrid::new(&bounds, 0.5);
        grid.mark_box(&Bounds::new(2.0, 2.0, 4.0, 4.0), 0.0, CellState::Wall);
        grid.mark_box(&Bounds::new(2.0, 2.0, 4.0, 4.0), 0.0, CellState::Forbidden);
        // First mark wins
        assert_eq!(grid.get(5, 5), CellState::Wall);
    }

    #[test]
    fn test_mark_box_with_buffer() {
        let bounds = Bounds::new(0.0, 0.0, 20.0, 20.0);
        let mut grid = OccupancyGrid::new(&bounds, 0.5);
        grid.mark_box(&Bounds::new(8.0, 8.0, 10.0, 10.0), 2.0, CellState::Forbidden);
        // Cell at (7.25, 7.25) is inside the 2 m expansion
        assert_eq!(grid.get(14, 14), CellState::Forbidden);
        // Cell near the origin is not
        assert_eq!(grid.get(2, 2), CellState::Open);
    }

    #[test]
    fn test_diagonal_wall_is_continuous() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut grid = OccupancyGrid::new(&bounds, 0.5);
        let wall = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        grid.mark_wall(&wall, 0.0);
        // Every cell on the diagonal is blocked
        for i in 0..20 {
            assert_eq!(grid.get(i, i), CellState::Wall);
        }
    }
}
