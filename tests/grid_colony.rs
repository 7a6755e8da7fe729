use grid_aco_vrp::config::{AcoConfig, PathHeuristic, SolverMode};
use grid_aco_vrp::fixtures::data_generator::{generate_grid_scenario, ScenarioShape};
use grid_aco_vrp::setup::init::build_problem;
use grid_aco_vrp::setup::init_types::{CellInput, SolveRequest};
use grid_aco_vrp::solver::ant_colony::colony::{perform_iteration, run_colony, ColonyState};
use grid_aco_vrp::solver::solve;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn open_grid(rows: usize, cols: usize) -> Vec<Vec<CellInput>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| CellInput {
                    occupied: false,
                    cost: 1.0,
                    index: r * cols + c,
                })
                .collect()
        })
        .collect()
}

fn manhattan_matrix(cells: &[usize], cols: usize) -> Vec<Vec<f64>> {
    cells
        .iter()
        .map(|&a| {
            cells
                .iter()
                .map(|&b| ((a / cols).abs_diff(b / cols) + (a % cols).abs_diff(b % cols)) as f64)
                .collect()
        })
        .collect()
}

/// Depot in the middle of a 5x5 grid, three customers of demand 4 around it.
fn tight_capacity_request() -> SolveRequest {
    let indexes = vec![12, 2, 14, 20];
    SolveRequest {
        distances: manhattan_matrix(&indexes, 5),
        demands: vec![0, 4, 4, 4],
        depots: vec![0],
        grid: Some(open_grid(5, 5)),
        indexes,
        vehicle_capacities: vec![10],
    }
}

fn grid_config(iterations: usize) -> AcoConfig {
    AcoConfig {
        mode: SolverMode::GridCvrp,
        iterations,
        ..AcoConfig::default()
    }
}

#[test]
fn single_vehicle_never_exceeds_capacity() {
    let problem = build_problem(&tight_capacity_request(), SolverMode::GridCvrp).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let report = run_colony(&problem, &grid_config(25), &mut rng).unwrap();

    for stats in &report.history {
        assert!(!stats.unserved.is_empty(), "iteration {}", stats.iteration);
        assert_eq!(stats.served, 2);
    }
    assert!(report.best.served_demand(0, &problem) <= 10);
    assert_eq!(report.best.unserved.len(), 1);
}

#[test]
fn depots_are_never_served() {
    let mut request = tight_capacity_request();
    request.demands.push(0);
    request.depots.push(4);
    request.indexes.push(0);
    request.distances = manhattan_matrix(&request.indexes, 5);
    request.vehicle_capacities = vec![6, 6, 6];

    let problem = build_problem(&request, SolverMode::GridCvrp).unwrap();
    let config = grid_config(1);
    let mut state = ColonyState::new(problem.num_points(), config.initial_pheromone);
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    for iteration in 1..=15 {
        perform_iteration(iteration, &mut state, &problem, &config, &mut rng);
        assert!(state.pheromone.is_symmetric());

        let best = state.best.as_ref().unwrap();
        for route in &best.routes {
            assert!(route.served().iter().all(|p| !problem.is_depot(*p)));
            assert!(route.load <= problem.vehicles[route.vehicle].capacity);
        }
    }
}

#[test]
fn vehicles_start_at_round_robin_depots() {
    let mut request = tight_capacity_request();
    request.demands.push(0);
    request.depots.push(4);
    request.indexes.push(0);
    request.distances = manhattan_matrix(&request.indexes, 5);
    request.vehicle_capacities = vec![4, 4, 4];

    let problem = build_problem(&request, SolverMode::GridCvrp).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let report = run_colony(&problem, &grid_config(3), &mut rng).unwrap();

    let starts: Vec<usize> = report.best.routes.iter().map(|r| r.stops[0]).collect();
    assert_eq!(starts, vec![0, 4, 0]);
}

#[test]
fn walled_off_customer_is_a_soft_failure() {
    let mut grid = open_grid(5, 5);
    // Box in cell (0,4)
    grid[0][3].occupied = true;
    grid[1][4].occupied = true;
    let indexes = vec![12, 4];
    let request = SolveRequest {
        distances: manhattan_matrix(&indexes, 5),
        demands: vec![0, 2],
        depots: vec![0],
        grid: Some(grid),
        indexes,
        vehicle_capacities: vec![5],
    };

    let problem = build_problem(&request, SolverMode::GridCvrp).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = run_colony(&problem, &grid_config(4), &mut rng).unwrap();

    assert!(report.history.iter().all(|s| s.path_misses == 1));
    assert_eq!(report.best.unserved, vec![1]);
    assert_eq!(report.best.total_cost, 0.0);
}

#[test]
fn empty_fleet_fails_fast() {
    let mut request = tight_capacity_request();
    request.vehicle_capacities.clear();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(solve(&request, &grid_config(5), &mut rng).is_err());
}

#[test]
fn generated_scenario_yields_walkable_routes() {
    let shape = ScenarioShape::default();
    let request = generate_grid_scenario(&shape, 99);
    let config = AcoConfig {
        heuristic: PathHeuristic::Manhattan,
        ..grid_config(10)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    let response = solve(&request, &config, &mut rng).unwrap();

    let walked: usize = response.best_real_routes.iter().map(|r| r.len()).sum();
    assert_eq!(response.best_distance, walked as f64);
    assert_eq!(response.best_routes.len(), shape.vehicle_capacities.len());

    for (route, cells) in response.best_routes.iter().zip(&response.best_real_routes) {
        let depot_cell = request.indexes[route[0]];
        if let (Some(first), Some(last)) = (cells.first(), cells.last()) {
            assert_eq!(*first, depot_cell);
            assert_eq!(*last, depot_cell);
        }
        for pair in cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = (a / shape.cols).abs_diff(b / shape.cols) + (a % shape.cols).abs_diff(b % shape.cols);
            assert!(step <= 1, "cells {a} and {b} are not adjacent");
        }
    }
}

#[test]
fn best_cost_is_monotone_over_a_long_run() {
    let request = generate_grid_scenario(&ScenarioShape::default(), 5);
    let problem = build_problem(&request, SolverMode::GridCvrp).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let report = run_colony(&problem, &grid_config(30), &mut rng).unwrap();
    for pair in report.history.windows(2) {
        assert!(pair[1].best_cost <= pair[0].best_cost);
    }
    let last_update = report.best_so_far_updates.last().unwrap();
    assert_eq!(last_update.0, report.best_iteration);
    assert_eq!(last_update.1, report.best.total_cost);
}
