use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::constant::{
    CUSTOMER_COUNT, DEPOT_COUNT, GRID_COLS, GRID_ROWS, OBSTACLE_RATIO, TRUCK_CAPACITIES,
};
use crate::setup::init_types::{CellInput, SolveRequest};

/// Shape of a generated scenario.
#[derive(Debug, Clone)]
pub struct ScenarioShape {
    pub rows: usize,
    pub cols: usize,
    pub obstacle_ratio: f64,
    pub depots: usize,
    pub customers: usize,
    pub demand_range: (u64, u64),
    pub vehicle_capacities: Vec<u64>,
}

impl Default for ScenarioShape {
    fn default() -> Self {
        ScenarioShape {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            obstacle_ratio: OBSTACLE_RATIO,
            depots: DEPOT_COUNT,
            customers: CUSTOMER_COUNT,
            demand_range: (1, 6),
            vehicle_capacities: TRUCK_CAPACITIES.to_vec(),
        }
    }
}

/// Euclidean distances between cell centres, one row per point.
pub fn cell_distance_matrix(cells: &[(usize, usize)]) -> Vec<Vec<f64>> {
    cells
        .par_iter()
        .map(|&(ar, ac)| {
            cells
                .iter()
                .map(|&(br, bc)| {
                    let dr = ar as f64 - br as f64;
                    let dc = ac as f64 - bc as f64;
                    (dr * dr + dc * dc).sqrt()
                })
                .collect()
        })
        .collect()
}

/// Random grid scenario: depots first, then customers, each on its own free cell.
///
/// Demand points and obstacles never share a cell. Obstacles may still cut
/// some points off from each other, which the solver has to live with.
pub fn generate_grid_scenario(shape: &ScenarioShape, seed: u64) -> SolveRequest {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let total_cells = shape.rows * shape.cols;
    let mut wanted = shape.depots + shape.customers;
    if wanted > total_cells {
        warn!(
            "Scenario asks for {} points on {} cells, clamping",
            wanted, total_cells
        );
        wanted = total_cells;
    }

    let mut offsets: Vec<usize> = (0..total_cells).collect();
    offsets.shuffle(&mut rng);
    let point_offsets: Vec<usize> = offsets[..wanted].to_vec();

    let mut grid: Vec<Vec<CellInput>> = (0..shape.rows)
        .map(|r| {
            (0..shape.cols)
                .map(|c| CellInput {
                    occupied: false,
                    cost: 1.0,
                    index: r * shape.cols + c,
                })
                .collect()
        })
        .collect();

    let obstacles = ((total_cells - wanted) as f64 * shape.obstacle_ratio) as usize;
    for &offset in offsets[wanted..].iter().take(obstacles) {
        grid[offset / shape.cols][offset % shape.cols].occupied = true;
    }

    let cells: Vec<(usize, usize)> = point_offsets
        .iter()
        .map(|&o| (o / shape.cols, o % shape.cols))
        .collect();
    let depot_count = shape.depots.min(wanted);
    let (lo, hi) = shape.demand_range;
    let demands: Vec<u64> = (0..wanted)
        .map(|i| if i < depot_count { 0 } else { rng.gen_range(lo..=hi) })
        .collect();

    let total_demand: u64 = demands.iter().sum();
    let total_capacity: u64 = shape.vehicle_capacities.iter().sum();
    info!(
        "Generated {}x{} grid with {} obstacles, {} depots, {} customers",
        shape.rows,
        shape.cols,
        obstacles,
        depot_count,
        wanted - depot_count
    );
    if total_capacity < total_demand {
        warn!(
            "Fleet capacity ({}) is below total demand ({}); some points will stay unserved",
            total_capacity, total_demand
        );
    }

    SolveRequest {
        distances: cell_distance_matrix(&cells),
        demands,
        depots: (0..depot_count).collect(),
        grid: Some(grid),
        indexes: point_offsets,
        vehicle_capacities: shape.vehicle_capacities.clone(),
    }
}
