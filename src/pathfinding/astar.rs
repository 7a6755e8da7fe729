use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::config::PathHeuristic;
use crate::domain::grid::{Grid, GridPos};

#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    /// Cells from start to goal, both included.
    pub cells: Vec<GridPos>,
    /// Sum of the costs of every cell entered after the start.
    pub cost: f64,
}

impl GridPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stable grid-cell indexes along the path.
    pub fn cell_indexes(&self, grid: &Grid) -> Vec<usize> {
        self.cells.iter().map(|p| grid.cell(*p).index).collect()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct OpenNode {
    offset: usize,
    f: f64,
    seq: usize,
}

impl Eq for OpenNode {}

// Min-heap on f; equal f pops in insertion order.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the 4-connected grid. Entering a cell costs that cell's `cost`;
/// occupied cells are never entered. Returns `None` when the goal is unreachable.
pub fn find_path(
    grid: &Grid,
    start: GridPos,
    goal: GridPos,
    heuristic: PathHeuristic,
) -> Option<GridPath> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return None;
    }
    if start == goal {
        return Some(GridPath {
            cells: vec![start],
            cost: 0.0,
        });
    }

    let scale = match heuristic {
        PathHeuristic::Manhattan => 1.0,
        PathHeuristic::ScaledManhattan => grid.min_cost(),
    };
    let h = |pos: GridPos| pos.manhattan(&goal) as f64 * scale;

    let n = grid.len();
    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut seq = 0;

    let start_offset = grid.offset(start);
    let goal_offset = grid.offset(goal);
    g_score[start_offset] = 0.0;
    open.push(OpenNode {
        offset: start_offset,
        f: h(start),
        seq,
    });

    while let Some(current) = open.pop() {
        if closed[current.offset] {
            continue;
        }
        if current.offset == goal_offset {
            return Some(reconstruct_path(grid, &came_from, goal_offset, g_score[goal_offset]));
        }
        closed[current.offset] = true;

        let current_pos = grid.pos_at(current.offset);
        for neighbour in grid.neighbours(current_pos) {
            let offset = grid.offset(neighbour);
            let cell = grid.cell(neighbour);
            if closed[offset] || cell.occupied {
                continue;
            }

            let tentative = g_score[current.offset] + cell.cost;
            if tentative < g_score[offset] {
                came_from[offset] = Some(current.offset);
                g_score[offset] = tentative;
                seq += 1;
                open.push(OpenNode {
                    offset,
                    f: tentative + h(neighbour),
                    seq,
                });
            }
        }
    }

    trace!("No path from {:?} to {:?}", start, goal);
    None
}

fn reconstruct_path(grid: &Grid, came_from: &[Option<usize>], goal: usize, cost: f64) -> GridPath {
    let mut cells = vec![grid.pos_at(goal)];
    let mut cursor = goal;
    while let Some(prev) = came_from[cursor] {
        cells.push(grid.pos_at(prev));
        cursor = prev;
    }
    cells.reverse();
    GridPath { cells, cost }
}
