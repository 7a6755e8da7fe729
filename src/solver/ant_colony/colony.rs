use tracing::{debug, info, span, warn, Level};

use crate::config::{AcoConfig, SolverMode};
use crate::domain::solution::{IterationStats, RunReport, Solution, VehicleRoute};
use crate::domain::types::ProblemInstance;
use crate::error::{SolverError, SolverResult};
use crate::solver::ant_colony::construction::{
    construct_grid_route, construct_matrix_route, construct_tour, AntContext,
};
use crate::solver::ant_colony::pheromone::PheromoneField;
use crate::solver::ant_colony::selection::{RandomSource, SelectionWeights};

/// Mutable state owned by one colony run.
#[derive(Debug)]
pub struct ColonyState {
    pub pheromone: PheromoneField,
    pub best: Option<Solution>,
    pub best_iteration: usize,
    pub history: Vec<IterationStats>,
    pub best_so_far_updates: Vec<(usize, f64)>,
}

impl ColonyState {
    pub fn new(num_points: usize, initial_pheromone: f64) -> Self {
        ColonyState {
            pheromone: PheromoneField::new(num_points, initial_pheromone),
            best: None,
            best_iteration: 0,
            history: vec![],
            best_so_far_updates: vec![],
        }
    }

    fn best_cost(&self) -> f64 {
        self.best
            .as_ref()
            .map(|b| b.total_cost)
            .unwrap_or(f64::INFINITY)
    }

    /// Replaces the best solution only on strict improvement.
    fn offer(&mut self, iteration: usize, candidate: &Solution) {
        if candidate.total_cost < self.best_cost() {
            self.best = Some(candidate.clone());
            self.best_iteration = iteration;
            self.best_so_far_updates.push((iteration, candidate.total_cost));
            info!(
                "New best at iteration {}: cost = {:.2}",
                iteration, candidate.total_cost
            );
        }
    }

    fn record(&mut self, iteration: usize, solution: &Solution) {
        self.history.push(IterationStats {
            iteration,
            total_cost: solution.total_cost,
            best_cost: self.best_cost(),
            served: solution.served_count(),
            unserved: solution.unserved.clone(),
            path_misses: solution.path_misses,
        });
    }
}

/// Runs the colony for `config.iterations` iterations and returns the best solution seen.
pub fn run_colony<R: RandomSource + ?Sized>(
    problem: &ProblemInstance,
    config: &AcoConfig,
    rng: &mut R,
) -> SolverResult<RunReport> {
    config.validate()?;
    check_problem(problem, config.mode)?;

    let run_span = span!(
        Level::INFO,
        "colony",
        mode = ?config.mode,
        iterations = config.iterations
    );
    let _run_guard = run_span.enter();

    info!(
        "Starting colony: {} points, {} vehicles, {} depots",
        problem.num_points(),
        problem.vehicles.len(),
        problem.depots.len()
    );

    let mut state = ColonyState::new(problem.num_points(), config.initial_pheromone);
    for iteration in 1..=config.iterations {
        perform_iteration(iteration, &mut state, problem, config, rng);
    }

    let best = state
        .best
        .ok_or_else(|| SolverError::config("colony finished without a solution"))?;
    info!(
        "Colony finished. Best cost {:.2} found at iteration {}",
        best.total_cost, state.best_iteration
    );

    Ok(RunReport {
        best,
        best_iteration: state.best_iteration,
        history: state.history,
        best_so_far_updates: state.best_so_far_updates,
    })
}

/// One construction pass, best tracking and pheromone update.
pub fn perform_iteration<R: RandomSource + ?Sized>(
    iteration: usize,
    state: &mut ColonyState,
    problem: &ProblemInstance,
    config: &AcoConfig,
    rng: &mut R,
) {
    let iter_span = span!(Level::DEBUG, "iteration", iter = iteration);
    let _iter_guard = iter_span.enter();

    match config.mode {
        SolverMode::Tsp => tour_iteration(iteration, state, problem, config, rng),
        SolverMode::MultiDepotCvrp | SolverMode::GridCvrp => {
            fleet_iteration(iteration, state, problem, config, rng)
        }
    }
}

fn fleet_iteration<R: RandomSource + ?Sized>(
    iteration: usize,
    state: &mut ColonyState,
    problem: &ProblemInstance,
    config: &AcoConfig,
    rng: &mut R,
) {
    let mut visited = problem.initial_visited();
    let routes: Vec<VehicleRoute> = {
        let ctx = ant_context(problem, &state.pheromone, config);
        problem
            .vehicles
            .iter()
            .map(|vehicle| match (config.mode, problem.layout.as_ref()) {
                (SolverMode::GridCvrp, Some(layout)) => {
                    construct_grid_route(&ctx, layout, vehicle, &mut visited, &mut *rng)
                }
                _ => construct_matrix_route(&ctx, vehicle, &mut visited, &mut *rng),
            })
            .collect()
    };

    let solution = Solution::from_routes(routes, &visited);
    debug!(
        "Iteration {}: cost {:.2}, served {}, unserved {}",
        iteration,
        solution.total_cost,
        solution.served_count(),
        solution.unserved.len()
    );
    if !solution.unserved.is_empty() {
        debug!("Unserved points: {:?}", solution.unserved);
    }
    if solution.path_misses > 0 {
        warn!(
            "Iteration {}: {} vehicle(s) hit an unreachable point",
            iteration, solution.path_misses
        );
    }

    state.offer(iteration, &solution);
    state.record(iteration, &solution);

    state.pheromone.evaporate(config.evaporation_rate);
    state.pheromone.reinforce(
        solution.routes.iter().map(|r| r.stops.as_slice()),
        solution.total_cost,
    );
}

fn tour_iteration<R: RandomSource + ?Sized>(
    iteration: usize,
    state: &mut ColonyState,
    problem: &ProblemInstance,
    config: &AcoConfig,
    rng: &mut R,
) {
    let tours: Vec<VehicleRoute> = {
        let ctx = ant_context(problem, &state.pheromone, config);
        (0..config.num_ants)
            .map(|ant| construct_tour(&ctx, ant, &mut *rng))
            .collect()
    };

    let mut iteration_best: Option<Solution> = None;
    for tour in &tours {
        let mut visited = vec![false; problem.num_points()];
        for &stop in &tour.stops {
            visited[stop] = true;
        }
        let candidate = Solution::from_routes(vec![tour.clone()], &visited);
        state.offer(iteration, &candidate);
        let improves = iteration_best
            .as_ref()
            .map(|b| candidate.total_cost < b.total_cost)
            .unwrap_or(true);
        if improves {
            iteration_best = Some(candidate);
        }
    }
    if let Some(best) = iteration_best.as_ref() {
        debug!("Iteration {}: best tour cost {:.2}", iteration, best.total_cost);
        state.record(iteration, best);
    }

    // Every ant deposits on its own closed tour
    state.pheromone.evaporate(config.evaporation_rate);
    for tour in &tours {
        let mut closed = tour.stops.clone();
        closed.push(tour.depot);
        state.pheromone.reinforce([closed.as_slice()], tour.cost);
    }
}

fn ant_context<'a>(
    problem: &'a ProblemInstance,
    pheromone: &'a PheromoneField,
    config: &AcoConfig,
) -> AntContext<'a> {
    AntContext {
        problem,
        pheromone,
        weights: SelectionWeights {
            alpha: config.alpha,
            beta: config.beta,
        },
        heuristic: config.heuristic,
    }
}

fn check_problem(problem: &ProblemInstance, mode: SolverMode) -> SolverResult<()> {
    let n = problem.num_points();
    if n == 0 {
        return Err(SolverError::config("problem has no demand points"));
    }
    let square = problem.distance_matrix.len() == n
        && problem.distance_matrix.iter().all(|row| row.len() == n);
    if !square {
        return Err(SolverError::config(format!(
            "distance matrix must be {n}x{n} for {n} demand points"
        )));
    }
    if let Some(&bad) = problem.depots.iter().find(|&&d| d >= n) {
        return Err(SolverError::config(format!("depot {bad} is not a demand point")));
    }
    if let Some(v) = problem.vehicles.iter().find(|v| v.home_depot >= n) {
        return Err(SolverError::config(format!(
            "vehicle {} starts at unknown point {}",
            v.id, v.home_depot
        )));
    }
    if let Some(layout) = &problem.layout {
        if layout.point_cells.len() != n {
            return Err(SolverError::config(format!(
                "grid layout places {} points, expected {n}",
                layout.point_cells.len()
            )));
        }
        if let Some(pos) = layout.point_cells.iter().find(|p| !layout.grid.in_bounds(**p)) {
            return Err(SolverError::config(format!("point cell {:?} is off the grid", pos)));
        }
    }
    match mode {
        SolverMode::Tsp => {
            if problem.depots.len() > 1 {
                return Err(SolverError::config(
                    "tour mode supports at most one depot",
                ));
            }
        }
        SolverMode::MultiDepotCvrp | SolverMode::GridCvrp => {
            if problem.vehicles.is_empty() {
                return Err(SolverError::config("vehicle capacities must not be empty"));
            }
            if problem.depots.is_empty() {
                return Err(SolverError::config("at least one depot is required"));
            }
            if mode == SolverMode::GridCvrp && problem.layout.is_none() {
                return Err(SolverError::config("grid mode requires a grid"));
            }
        }
    }
    Ok(())
}
