use std::collections::HashMap;

use crate::error::{SolverError, SolverResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub occupied: bool,
    /// Cost of stepping onto this cell. Always > 0.
    pub cost: f64,
    /// Stable identity of the cell, independent of its row/column.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        GridPos { row, col }
    }

    pub fn manhattan(&self, other: &GridPos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Row-major occupancy grid.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    by_index: HashMap<usize, GridPos>,
    min_cost: f64,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> SolverResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if n_rows == 0 || n_cols == 0 {
            return Err(SolverError::config("grid must have at least one row and one column"));
        }

        let mut cells = Vec::with_capacity(n_rows * n_cols);
        let mut by_index = HashMap::with_capacity(n_rows * n_cols);
        let mut min_cost = f64::INFINITY;

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(SolverError::config(format!(
                    "grid row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    n_cols
                )));
            }
            for (c, cell) in row.into_iter().enumerate() {
                if !cell.cost.is_finite() || cell.cost <= 0.0 {
                    return Err(SolverError::config(format!(
                        "cell ({r}, {c}) has non-positive cost {}",
                        cell.cost
                    )));
                }
                if by_index.insert(cell.index, GridPos::new(r, c)).is_some() {
                    return Err(SolverError::config(format!(
                        "cell index {} appears more than once",
                        cell.index
                    )));
                }
                min_cost = min_cost.min(cell.cost);
                cells.push(cell);
            }
        }

        Ok(Grid {
            rows: n_rows,
            cols: n_cols,
            cells,
            by_index,
            min_cost,
        })
    }

    /// Open grid with unit costs, cells numbered row-major from 0.
    pub fn open(rows: usize, cols: usize) -> SolverResult<Self> {
        let layout = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| Cell {
                        occupied: false,
                        cost: 1.0,
                        index: r * cols + c,
                    })
                    .collect()
            })
            .collect();
        Grid::from_rows(layout)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn min_cost(&self) -> f64 {
        self.min_cost
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Flat offset of `pos` in row-major order.
    pub fn offset(&self, pos: GridPos) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn pos_at(&self, offset: usize) -> GridPos {
        GridPos::new(offset / self.cols, offset % self.cols)
    }

    pub fn cell(&self, pos: GridPos) -> &Cell {
        &self.cells[self.offset(pos)]
    }

    pub fn set_occupied(&mut self, pos: GridPos, occupied: bool) {
        let offset = self.offset(pos);
        self.cells[offset].occupied = occupied;
    }

    pub fn position_of(&self, index: usize) -> Option<GridPos> {
        self.by_index.get(&index).copied()
    }

    /// Up, down, left, right neighbours that lie inside the grid.
    pub fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        let GridPos { row, col } = pos;
        [
            row.checked_add(1).map(|r| GridPos::new(r, col)),
            row.checked_sub(1).map(|r| GridPos::new(r, col)),
            col.checked_add(1).map(|c| GridPos::new(row, c)),
            col.checked_sub(1).map(|c| GridPos::new(row, c)),
        ]
        .into_iter()
        .flatten()
        .filter(move |p| self.in_bounds(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_numbers_cells_row_major() {
        let grid = Grid::open(2, 3).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.position_of(4), Some(GridPos::new(1, 1)));
        assert_eq!(grid.cell(GridPos::new(1, 2)).index, 5);
        assert_eq!(grid.min_cost(), 1.0);
    }

    #[test]
    fn corner_has_two_neighbours() {
        let grid = Grid::open(3, 3).unwrap();
        let n: Vec<GridPos> = grid.neighbours(GridPos::new(0, 0)).collect();
        assert_eq!(n.len(), 2);
        assert!(n.contains(&GridPos::new(1, 0)));
        assert!(n.contains(&GridPos::new(0, 1)));
        assert_eq!(grid.neighbours(GridPos::new(1, 1)).count(), 4);
    }

    #[test]
    fn rejects_ragged_rows_and_bad_costs() {
        let cell = |index| Cell {
            occupied: false,
            cost: 1.0,
            index,
        };
        assert!(Grid::from_rows(vec![vec![cell(0), cell(1)], vec![cell(2)]]).is_err());

        let mut bad = cell(0);
        bad.cost = 0.0;
        assert!(Grid::from_rows(vec![vec![bad]]).is_err());
        assert!(Grid::from_rows(vec![vec![cell(3), cell(3)]]).is_err());
    }
}
