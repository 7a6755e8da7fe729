pub mod ant_colony;

use crate::config::AcoConfig;
use crate::domain::solution::Solution;
use crate::error::SolverResult;
use crate::setup::init::build_problem;
use crate::setup::init_types::{SolveRequest, SolveResponse};

use ant_colony::colony::run_colony;
use ant_colony::selection::RandomSource;

/// Validates `request`, runs the colony and returns its best solution.
pub fn solve<R: RandomSource + ?Sized>(
    request: &SolveRequest,
    config: &AcoConfig,
    rng: &mut R,
) -> SolverResult<SolveResponse> {
    config.validate()?;
    let problem = build_problem(request, config.mode)?;
    let report = run_colony(&problem, config, rng)?;
    Ok(to_response(&report.best))
}

pub fn to_response(best: &Solution) -> SolveResponse {
    SolveResponse {
        best_routes: best.stop_sequences(),
        best_real_routes: best.real_routes(),
        best_distance: best.total_cost,
        unserved: best.unserved.clone(),
    }
}
