use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::SolverMode;
use crate::domain::grid::{Cell, Grid};
use crate::domain::types::{DemandPoint, GridLayout, ProblemInstance, Vehicle};
use crate::error::{SolverError, SolverResult};
use crate::setup::init_types::*;

/// Validates a request and turns it into a problem the colony can run on.
pub fn build_problem(request: &SolveRequest, mode: SolverMode) -> SolverResult<ProblemInstance> {
    info!(
        "Setting up {} points, {} depots, {} vehicles",
        request.demands.len(),
        request.depots.len(),
        request.vehicle_capacities.len()
    );

    let n = request.demands.len();
    if n == 0 {
        return Err(SolverError::config("demands must not be empty"));
    }
    check_distance_matrix(&request.distances, n)?;

    if mode != SolverMode::Tsp && request.vehicle_capacities.is_empty() {
        return Err(SolverError::config(
            "vehicle capacities must be a non-empty list",
        ));
    }
    if mode != SolverMode::Tsp {
        if let Some(pos) = request.vehicle_capacities.iter().position(|&c| c == 0) {
            return Err(SolverError::config(format!("vehicle {pos} has zero capacity")));
        }
    }
    if let Some(&bad) = request.depots.iter().find(|&&d| d >= n) {
        return Err(SolverError::config(format!(
            "depot {bad} is outside the {n} demand points"
        )));
    }
    if mode != SolverMode::Tsp && request.depots.is_empty() {
        return Err(SolverError::config("at least one depot is required"));
    }

    let points: Vec<DemandPoint> = request
        .demands
        .iter()
        .enumerate()
        .map(|(index, &demand)| {
            let is_depot = request.depots.contains(&index);
            if is_depot && demand > 0 {
                warn!("Depot {} carries demand {}; it will never be served", index, demand);
            }
            DemandPoint {
                index,
                demand,
                is_depot,
            }
        })
        .collect();

    let vehicles = assign_vehicles(&request.vehicle_capacities, &request.depots);

    let layout = match (&request.grid, mode) {
        (Some(rows), _) => Some(build_layout(rows, &request.indexes, n)?),
        (None, SolverMode::GridCvrp) => {
            return Err(SolverError::config("grid mode requires a grid"));
        }
        (None, _) => None,
    };

    print_dist_matrix(&request.distances);

    Ok(ProblemInstance {
        points,
        distance_matrix: request.distances.clone(),
        depots: request.depots.clone(),
        vehicles,
        layout,
    })
}

/// Vehicle `i` is anchored at `depots[i % depots.len()]`.
pub fn assign_vehicles(capacities: &[u64], depots: &[usize]) -> Vec<Vehicle> {
    if depots.is_empty() {
        return vec![];
    }
    capacities
        .iter()
        .enumerate()
        .map(|(id, &capacity)| Vehicle {
            id,
            capacity,
            home_depot: depots[id % depots.len()],
        })
        .collect()
}

/// Grid-cell index that demand point `point` sits on.
pub fn cell_index_for(point: usize, indexes: &[usize]) -> usize {
    indexes.get(point).copied().unwrap_or(point)
}

fn build_layout(rows: &[Vec<CellInput>], indexes: &[usize], n: usize) -> SolverResult<GridLayout> {
    let grid = Grid::from_rows(
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|c| Cell {
                        occupied: c.occupied,
                        cost: c.cost,
                        index: c.index,
                    })
                    .collect()
            })
            .collect(),
    )?;

    let point_cells = (0..n)
        .map(|point| {
            let index = cell_index_for(point, indexes);
            grid.position_of(index).ok_or_else(|| {
                SolverError::config(format!(
                    "demand point {point} maps to grid cell {index}, which does not exist"
                ))
            })
        })
        .collect::<SolverResult<Vec<_>>>()?;

    debug!(
        "Grid {}x{} with demand points at {:?}",
        grid.rows(),
        grid.cols(),
        point_cells
    );
    Ok(GridLayout { grid, point_cells })
}

fn check_distance_matrix(dm: &[Vec<f64>], n: usize) -> SolverResult<()> {
    if dm.len() != n {
        return Err(SolverError::config(format!(
            "distance matrix has {} rows for {} demand points",
            dm.len(),
            n
        )));
    }
    for (r, row) in dm.iter().enumerate() {
        if row.len() != n {
            return Err(SolverError::config(format!(
                "distance matrix row {} has {} entries, expected {}",
                r,
                row.len(),
                n
            )));
        }
        if let Some(bad) = row.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(SolverError::config(format!(
                "distance matrix row {r} holds invalid distance {bad}"
            )));
        }
    }
    Ok(())
}

/// Reads a JSON solve request from disk.
pub fn load_request(path: impl AsRef<Path>) -> SolverResult<SolveRequest> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)?;
    let request: SolveRequest = serde_json::from_str(&file_content)?;
    info!("Loaded solve request from {}", path.display());
    Ok(request)
}

// Print distance matrix for debugging
pub fn print_dist_matrix(dist_m: &[Vec<f64>]) {
    debug!("Distance matrix:");
    for row in dist_m {
        debug!("{:?}", row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SolveRequest {
        SolveRequest {
            distances: vec![
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 1.0],
                vec![2.0, 1.0, 0.0],
            ],
            demands: vec![0, 3, 4],
            depots: vec![0],
            grid: Some(
                (0..2)
                    .map(|r| {
                        (0..3)
                            .map(|c| CellInput {
                                occupied: false,
                                cost: 1.0,
                                index: r * 3 + c,
                            })
                            .collect()
                    })
                    .collect(),
            ),
            indexes: vec![4, 0, 2],
            vehicle_capacities: vec![5, 7, 9],
        }
    }

    #[test]
    fn builds_grid_problem_with_remapped_cells() {
        let problem = build_problem(&request(), SolverMode::GridCvrp).unwrap();
        let layout = problem.layout.as_ref().unwrap();

        assert_eq!(layout.grid.cell(layout.point_cells[0]).index, 4);
        assert_eq!(layout.grid.cell(layout.point_cells[1]).index, 0);
        assert!(problem.is_depot(0));
        assert!(!problem.is_depot(2));
        assert_eq!(problem.vehicles.len(), 3);
    }

    #[test]
    fn points_without_remap_use_their_own_index() {
        let mut req = request();
        req.indexes = vec![5];
        let problem = build_problem(&req, SolverMode::GridCvrp).unwrap();
        let layout = problem.layout.unwrap();
        assert_eq!(layout.grid.cell(layout.point_cells[0]).index, 5);
        assert_eq!(layout.grid.cell(layout.point_cells[2]).index, 2);
    }

    #[test]
    fn vehicles_are_assigned_round_robin() {
        let vehicles = assign_vehicles(&[5, 5, 5, 5, 5], &[3, 7]);
        let homes: Vec<usize> = vehicles.iter().map(|v| v.home_depot).collect();
        assert_eq!(homes, vec![3, 7, 3, 7, 3]);
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let mut req = request();
        req.vehicle_capacities.clear();
        let err = build_problem(&req, SolverMode::GridCvrp).unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
    }

    #[test]
    fn zero_capacity_vehicle_is_rejected() {
        let mut req = request();
        req.vehicle_capacities = vec![4, 0];
        assert!(build_problem(&req, SolverMode::MultiDepotCvrp).is_err());
    }

    #[test]
    fn tour_mode_ignores_the_fleet() {
        let mut req = request();
        req.vehicle_capacities = vec![0];
        assert!(build_problem(&req, SolverMode::Tsp).is_ok());

        req.vehicle_capacities.clear();
        assert!(build_problem(&req, SolverMode::Tsp).is_ok());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let mut req = request();
        req.distances.pop();
        assert!(build_problem(&req, SolverMode::MultiDepotCvrp).is_err());

        let mut req = request();
        req.depots = vec![9];
        assert!(build_problem(&req, SolverMode::MultiDepotCvrp).is_err());

        let mut req = request();
        req.indexes = vec![42];
        assert!(build_problem(&req, SolverMode::GridCvrp).is_err());

        let mut req = request();
        req.grid = None;
        assert!(build_problem(&req, SolverMode::GridCvrp).is_err());
        assert!(build_problem(&req, SolverMode::MultiDepotCvrp).is_ok());
    }

    #[test]
    fn parses_camel_case_request() {
        let json = r#"{
            "distances": [[0, 2], [2, 0]],
            "demands": [0, 1],
            "depots": [0],
            "grid": [[{ "occupied": false, "cost": 1, "index": 0 }, { "index": 1 }]],
            "indexes": [],
            "vehicleCapacities": [3]
        }"#;
        let req: SolveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.vehicle_capacities, vec![3]);
        let grid = req.grid.as_ref().unwrap();
        assert_eq!(grid[0][1].cost, 1.0);
        assert!(build_problem(&req, SolverMode::GridCvrp).is_ok());
    }
}
