use crate::domain::grid::{Grid, GridPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandPoint {
    pub index: usize,
    pub demand: u64,
    pub is_depot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    pub id: usize,
    pub capacity: u64,
    pub home_depot: usize,
}

/// Grid side of a problem: the occupancy grid plus where every demand point sits on it.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub grid: Grid,
    /// `point_cells[i]` is the grid position of demand point `i`.
    pub point_cells: Vec<GridPos>,
}

#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub points: Vec<DemandPoint>,
    pub distance_matrix: Vec<Vec<f64>>,
    pub depots: Vec<usize>,
    pub vehicles: Vec<Vehicle>,
    pub layout: Option<GridLayout>,
}

impl ProblemInstance {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn demand(&self, point: usize) -> u64 {
        self.points[point].demand
    }

    pub fn is_depot(&self, point: usize) -> bool {
        self.points[point].is_depot
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    pub fn total_demand(&self) -> u64 {
        self.points.iter().map(|p| p.demand).sum()
    }

    /// Fresh visitation table with every depot already marked.
    pub fn initial_visited(&self) -> Vec<bool> {
        self.points.iter().map(|p| p.is_depot).collect()
    }
}
