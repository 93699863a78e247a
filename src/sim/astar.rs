//! A* search over an occupancy grid
//!
//! Stateless: every call allocates its own node table and frontier.
//! Orthogonal steps cost 1, diagonal steps cost sqrt(2). The heuristic is
//! Manhattan for 4-way movement and Euclidean for 8-way, both admissible and
//! consistent for their move set, so the first time the goal is popped its
//! cost is optimal.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;

use super::grid::{Cell, Grid};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Per-cell search bookkeeping
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g: f32,
    parent: Option<usize>,
    closed: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g: f32::INFINITY,
            parent: None,
            closed: false,
        }
    }
}

/// Frontier entry. Stale entries stay in the heap and are skipped on pop.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f: f32,
    h: f32,
    index: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: lowest f, then lowest h, then lowest index
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Heuristic distance between two cells for the chosen move set
pub fn heuristic(a: Cell, b: Cell, allow_diagonal: bool) -> f32 {
    let dr = a.row.abs_diff(b.row) as f32;
    let dc = a.col.abs_diff(b.col) as f32;
    if allow_diagonal { dr.hypot(dc) } else { dr + dc }
}

/// Step cost between two adjacent cells
#[inline]
fn step_cost(a: Cell, b: Cell) -> f32 {
    if a.row != b.row && a.col != b.col { SQRT_2 } else { 1.0 }
}

/// Total step cost of a cell path
pub fn path_cost(path: &[Cell]) -> f32 {
    path.windows(2).map(|w| step_cost(w[0], w[1])).sum()
}

/// Find the cheapest cell path from `start` to `goal`, both inclusive
///
/// Returns an empty vec when the grid is empty, either endpoint is out of
/// bounds or blocked, or the goal is unreachable.
pub fn find_path(grid: &Grid, start: Cell, goal: Cell, allow_diagonal: bool) -> Vec<Cell> {
    let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
        return Vec::new();
    };
    if !grid.is_passable_index(start_idx) || !grid.is_passable_index(goal_idx) {
        return Vec::new();
    }
    if start_idx == goal_idx {
        return vec![start];
    }

    let mut nodes = vec![SearchNode::default(); grid.len()];
    let mut frontier = BinaryHeap::new();

    nodes[start_idx].g = 0.0;
    let h0 = heuristic(start, goal, allow_diagonal);
    frontier.push(FrontierEntry {
        f: h0,
        h: h0,
        index: start_idx,
    });

    while let Some(FrontierEntry { index, .. }) = frontier.pop() {
        if nodes[index].closed {
            continue;
        }
        nodes[index].closed = true;
        if index == goal_idx {
            break;
        }

        let current = grid.cell_at(index);
        let g_current = nodes[index].g;
        let offsets = ORTHOGONAL
            .iter()
            .chain(DIAGONAL.iter().filter(|_| allow_diagonal));

        for &(dr, dc) in offsets {
            let (Some(row), Some(col)) = (
                current.row.checked_add_signed(dr),
                current.col.checked_add_signed(dc),
            ) else {
                continue;
            };
            let next = Cell::new(row, col);
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if nodes[next_idx].closed || !grid.is_passable_index(next_idx) {
                continue;
            }

            let tentative = g_current + step_cost(current, next);
            if tentative < nodes[next_idx].g {
                nodes[next_idx].g = tentative;
                nodes[next_idx].parent = Some(index);
                let h = heuristic(next, goal, allow_diagonal);
                frontier.push(FrontierEntry {
                    f: tentative + h,
                    h,
                    index: next_idx,
                });
            }
        }
    }

    reconstruct(grid, &nodes, start_idx, goal_idx)
}

fn reconstruct(grid: &Grid, nodes: &[SearchNode], start_idx: usize, goal_idx: usize) -> Vec<Cell> {
    if nodes[goal_idx].parent.is_none() {
        return Vec::new();
    }

    let mut path = vec![grid.cell_at(goal_idx)];
    let mut cursor = goal_idx;
    while let Some(parent) = nodes[cursor].parent {
        path.push(grid.cell_at(parent));
        cursor = parent;
    }
    debug_assert_eq!(cursor, start_idx);
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn blocked_row(rows: usize, cols: usize, row: usize) -> Grid {
        let mut grid = Grid::new(rows, cols, true);
        for col in 0..cols {
            grid.set(Cell::new(row, col), false);
        }
        grid
    }

    fn assert_contiguous(path: &[Cell], allow_diagonal: bool) {
        for w in path.windows(2) {
            let dr = w[0].row.abs_diff(w[1].row);
            let dc = w[0].col.abs_diff(w[1].col);
            assert!(dr <= 1 && dc <= 1 && dr + dc > 0, "gap between {:?} and {:?}", w[0], w[1]);
            if !allow_diagonal {
                assert_eq!(dr + dc, 1);
            }
        }
    }

    #[test]
    fn test_open_grid_diagonal() {
        let grid = Grid::new(5, 5, true);
        let path = find_path(&grid, Cell::new(0, 0), Cell::new(4, 4), true);
        assert_eq!(path.first(), Some(&Cell::new(0, 0)));
        assert_eq!(path.last(), Some(&Cell::new(4, 4)));
        assert!(path.len() <= 5);
        assert!((path_cost(&path) - 4.0 * SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = Grid::new(3, 3, true);
        let path = find_path(&grid, Cell::new(1, 2), Cell::new(1, 2), false);
        assert_eq!(path, vec![Cell::new(1, 2)]);
    }

    #[test]
    fn test_blocked_row_no_diagonal() {
        let grid = blocked_row(3, 3, 1);
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), false).is_empty());
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), true).is_empty());
    }

    #[test]
    fn test_row_with_gap_diagonal() {
        let mut grid = blocked_row(3, 3, 1);
        grid.set(Cell::new(1, 1), true);
        let path = find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), true);
        assert!(!path.is_empty());
        assert!(path.contains(&Cell::new(1, 1)));
        assert_contiguous(&path, true);
    }

    #[test]
    fn test_blocked_endpoints_return_empty() {
        let mut grid = Grid::new(4, 4, true);
        grid.set(Cell::new(0, 0), false);
        grid.set(Cell::new(3, 3), false);
        let before = grid.clone();

        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), true).is_empty());
        assert!(find_path(&grid, Cell::new(2, 2), Cell::new(3, 3), true).is_empty());
        // Blocked start equal to goal is still rejected
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(0, 0), true).is_empty());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_out_of_bounds_and_empty_grid() {
        let grid = Grid::new(3, 3, true);
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(3, 0), true).is_empty());
        assert!(find_path(&Grid::default(), Cell::new(0, 0), Cell::new(0, 0), true).is_empty());
    }

    #[test]
    fn test_routes_around_wall() {
        // Wall down column 2 except at the bottom row
        let mut grid = Grid::new(5, 5, true);
        for row in 0..4 {
            grid.set(Cell::new(row, 2), false);
        }
        let path = find_path(&grid, Cell::new(0, 0), Cell::new(0, 4), false);
        assert_contiguous(&path, false);
        assert!(path.iter().all(|&c| grid.is_passable(c)));
        assert!(path.contains(&Cell::new(4, 2)));
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn test_frontier_orders_lowest_f_first() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry { f: 3.0, h: 1.0, index: 0 });
        heap.push(FrontierEntry { f: 1.0, h: 1.0, index: 5 });
        heap.push(FrontierEntry { f: 1.0, h: 0.5, index: 9 });
        assert_eq!(heap.pop().map(|e| e.index), Some(9));
        assert_eq!(heap.pop().map(|e| e.index), Some(5));
        assert_eq!(heap.pop().map(|e| e.index), Some(0));
    }

    proptest! {
        #[test]
        fn prop_open_grid_paths_are_optimal(
            rows in 1usize..12,
            cols in 1usize..12,
            a in any::<(usize, usize)>(),
            b in any::<(usize, usize)>(),
            allow_diagonal in any::<bool>(),
        ) {
            let grid = Grid::new(rows, cols, true);
            let start = Cell::new(a.0 % rows, a.1 % cols);
            let goal = Cell::new(b.0 % rows, b.1 % cols);
            let path = find_path(&grid, start, goal, allow_diagonal);

            prop_assert_eq!(path.first(), Some(&start));
            prop_assert_eq!(path.last(), Some(&goal));

            let dr = start.row.abs_diff(goal.row) as f32;
            let dc = start.col.abs_diff(goal.col) as f32;
            let optimal = if allow_diagonal {
                dr.max(dc) - dr.min(dc) + dr.min(dc) * SQRT_2
            } else {
                dr + dc
            };
            let cost = path_cost(&path);
            prop_assert!(cost + 1e-3 >= heuristic(start, goal, allow_diagonal));
            prop_assert!((cost - optimal).abs() < 1e-3);
        }
    }
}
