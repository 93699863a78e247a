//! Occupancy grid and world <-> cell mapping
//!
//! The grid is a flat row-major `Vec<bool>` (`true` = passable). `GridLayout`
//! rasterizes brick boxes into it and converts between world space and cells.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Bounded};

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Rectangular boolean passability matrix
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create a `rows x cols` grid with every cell set to `passable`
    pub fn new(rows: usize, cols: usize, passable: bool) -> Self {
        if rows == 0 || cols == 0 {
            return Self::default();
        }
        Self {
            rows,
            cols,
            cells: vec![passable; rows * cols],
        }
    }

    /// Build from nested rows. Ragged input yields the empty grid.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            log::warn!("Ragged occupancy grid ({} rows), treating as empty", rows.len());
            return Self::default();
        }
        if cols == 0 {
            return Self::default();
        }
        Self {
            rows: rows.len(),
            cols,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Linear index of an in-bounds cell
    #[inline]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell).then(|| cell.row * self.cols + cell.col)
    }

    /// Cell for a linear index (caller guarantees `index < len()`)
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Nearest in-bounds cell. Meaningless on an empty grid.
    pub fn clamp(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.row.min(self.rows.saturating_sub(1)),
            cell.col.min(self.cols.saturating_sub(1)),
        )
    }

    /// Out-of-bounds cells read as blocked
    #[inline]
    pub fn is_passable(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some_and(|i| self.cells[i])
    }

    #[inline]
    pub fn is_passable_index(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Out-of-bounds writes are ignored
    pub fn set(&mut self, cell: Cell, passable: bool) {
        if let Some(i) = self.index_of(cell) {
            self.cells[i] = passable;
        }
    }

    /// Run `f` with `cells` temporarily marked passable
    ///
    /// Original values are restored before returning, whatever `f` produced.
    /// `f` only sees a shared borrow, so the forced state cannot be mutated
    /// or observed outside this call.
    pub fn with_passable<R>(&mut self, cells: &[Cell], f: impl FnOnce(&Grid) -> R) -> R {
        let saved: Vec<(Cell, bool)> = cells.iter().map(|&c| (c, self.is_passable(c))).collect();
        for &(cell, _) in &saved {
            self.set(cell, true);
        }
        let result = f(self);
        for &(cell, was) in &saved {
            self.set(cell, was);
        }
        result
    }
}

/// Maps world space onto a grid of equally sized cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// World position of the top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// World units per cell (x = width, y = height)
    pub cell_size: Vec2,
    pub rows: usize,
    pub cols: usize,
}

impl GridLayout {
    pub fn new(origin: Vec2, cell_size: Vec2, rows: usize, cols: usize) -> Self {
        Self {
            origin,
            cell_size,
            rows,
            cols,
        }
    }

    /// Layout tiling `area` with cells of `cell_size` (partial cells round up)
    pub fn covering(area: &Aabb, cell_size: Vec2) -> Self {
        let rows = (area.size.y / cell_size.y).ceil().max(0.0) as usize;
        let cols = (area.size.x / cell_size.x).ceil().max(0.0) as usize;
        Self::new(area.pos, cell_size, rows, cols)
    }

    /// Column containing world `x`, clamped to the grid
    pub fn col_of(&self, x: f32) -> usize {
        Self::axis_index((x - self.origin.x) / self.cell_size.x, self.cols)
    }

    /// Row containing world `y`, clamped to the grid
    pub fn row_of(&self, y: f32) -> usize {
        Self::axis_index((y - self.origin.y) / self.cell_size.y, self.rows)
    }

    /// Cell containing `world`, clamped to the grid
    pub fn cell_of(&self, world: Vec2) -> Cell {
        Cell::new(self.row_of(world.y), self.col_of(world.x))
    }

    /// World-space center of `cell` (used as a waypoint)
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.col as f32 + 0.5) * self.cell_size.x,
                (cell.row as f32 + 0.5) * self.cell_size.y,
            )
    }

    /// World-space box covered by `cell`
    pub fn cell_bounds(&self, cell: Cell) -> Aabb {
        Aabb::new(
            self.origin + Vec2::new(cell.col as f32 * self.cell_size.x, cell.row as f32 * self.cell_size.y),
            self.cell_size,
        )
    }

    /// Build a passability grid with every cell touched by an obstacle blocked
    pub fn rasterize<O: Bounded>(&self, obstacles: &[O]) -> Grid {
        let mut grid = Grid::new(self.rows, self.cols, true);
        if grid.is_empty() {
            return grid;
        }
        for obstacle in obstacles {
            let bbox = obstacle.bounding_box();
            // Candidate cell range, then an exact overlap check per cell
            let (r0, r1) = (self.row_of(bbox.min().y), self.row_of(bbox.max().y));
            let (c0, c1) = (self.col_of(bbox.min().x), self.col_of(bbox.max().x));
            for row in r0..=r1 {
                for col in c0..=c1 {
                    let cell = Cell::new(row, col);
                    if self.cell_bounds(cell).overlaps(&bbox) {
                        grid.set(cell, false);
                    }
                }
            }
        }
        grid
    }

    fn axis_index(t: f32, len: usize) -> usize {
        if len == 0 || t.is_nan() || t < 0.0 {
            return 0;
        }
        if t == f32::INFINITY {
            return len - 1;
        }
        (t.floor() as usize).min(len - 1)
    }
}
