use tracing::{trace, warn};

use crate::config::PathHeuristic;
use crate::domain::solution::VehicleRoute;
use crate::domain::types::{GridLayout, ProblemInstance, Vehicle};
use crate::evaluation::fitness::{find_distance, real_route_cost};
use crate::pathfinding::astar::find_path;
use crate::solver::ant_colony::pheromone::PheromoneField;
use crate::solver::ant_colony::selection::{select_next, RandomSource, SelectionWeights};

/// Read-only view every ant of one iteration builds against.
#[derive(Debug, Clone, Copy)]
pub struct AntContext<'a> {
    pub problem: &'a ProblemInstance,
    pub pheromone: &'a PheromoneField,
    pub weights: SelectionWeights,
    pub heuristic: PathHeuristic,
}

impl<'a> AntContext<'a> {
    fn select<R: RandomSource + ?Sized>(
        &self,
        current: usize,
        visited: &[bool],
        capacity: u64,
        rng: &mut R,
    ) -> Option<usize> {
        select_next(
            self.problem,
            self.pheromone,
            self.weights,
            current,
            visited,
            capacity,
            rng,
        )
    }
}

/// Builds one vehicle's route, walking every hop on the grid.
///
/// Stops when capacity runs out, when no feasible point remains, or when A*
/// cannot reach the chosen point. The vehicle then walks back to its depot.
/// Route cost is the number of cells in the walked path.
pub fn construct_grid_route<R: RandomSource + ?Sized>(
    ctx: &AntContext<'_>,
    layout: &GridLayout,
    vehicle: &Vehicle,
    visited: &mut [bool],
    rng: &mut R,
) -> VehicleRoute {
    let depot = vehicle.home_depot;
    let grid = &layout.grid;
    let mut route = VehicleRoute::new(vehicle.id, depot);
    let mut capacity = vehicle.capacity;
    let mut current = depot;

    while capacity > 0 {
        let Some(next) = ctx.select(current, visited, capacity, rng) else {
            trace!("Vehicle {} found no feasible point from {}", vehicle.id, current);
            break;
        };

        match find_path(
            grid,
            layout.point_cells[current],
            layout.point_cells[next],
            ctx.heuristic,
        ) {
            Some(path) => {
                route.real_route.extend(path.cell_indexes(grid));
                serve(&mut route, ctx.problem, next, visited, &mut capacity);
                current = next;
            }
            None => {
                warn!(
                    "Vehicle {}: no path from point {} to point {}",
                    vehicle.id, current, next
                );
                route.path_miss = true;
                break;
            }
        }
    }

    match find_path(
        grid,
        layout.point_cells[current],
        layout.point_cells[depot],
        ctx.heuristic,
    ) {
        Some(path) => route
            .real_route
            .extend(path.cell_indexes(grid).into_iter().skip(1)),
        None => {
            warn!(
                "Vehicle {}: no path back to depot {} from point {}",
                vehicle.id, depot, current
            );
            route.path_miss = true;
        }
    }

    route.cost = real_route_cost(&route);
    route
}

/// Same capacity-exhaustion construction, costed on the distance matrix.
pub fn construct_matrix_route<R: RandomSource + ?Sized>(
    ctx: &AntContext<'_>,
    vehicle: &Vehicle,
    visited: &mut [bool],
    rng: &mut R,
) -> VehicleRoute {
    let mut route = VehicleRoute::new(vehicle.id, vehicle.home_depot);
    let mut capacity = vehicle.capacity;
    let mut current = vehicle.home_depot;

    while capacity > 0 {
        let Some(next) = ctx.select(current, visited, capacity, rng) else {
            break;
        };
        serve(&mut route, ctx.problem, next, visited, &mut capacity);
        current = next;
    }

    route.cost = find_distance(&route.stops, &ctx.problem.distance_matrix);
    route
}

/// One ant's complete tour over every point it can reach.
/// Starts at the depot when there is one, otherwise at a random point.
pub fn construct_tour<R: RandomSource + ?Sized>(
    ctx: &AntContext<'_>,
    ant: usize,
    rng: &mut R,
) -> VehicleRoute {
    let problem = ctx.problem;
    let n = problem.num_points();
    let start = match problem.depots.first() {
        Some(&depot) => depot,
        None => rng.next_index(n),
    };

    let mut visited = problem.initial_visited();
    visited[start] = true;
    let mut route = VehicleRoute::new(ant, start);
    let mut current = start;

    while route.stops.len() < n {
        let Some(next) = ctx.select(current, &visited, u64::MAX, rng) else {
            break;
        };
        route.stops.push(next);
        visited[next] = true;
        current = next;
    }

    route.cost = find_distance(&route.stops, &problem.distance_matrix);
    route
}

fn serve(
    route: &mut VehicleRoute,
    problem: &ProblemInstance,
    point: usize,
    visited: &mut [bool],
    capacity: &mut u64,
) {
    let demand = problem.demand(point);
    route.stops.push(point);
    route.load += demand;
    visited[point] = true;
    *capacity -= demand;
}
