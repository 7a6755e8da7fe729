//! Capacitated multi-depot vehicle routing with ant colony optimization,
//! where every hop is walked on an occupancy grid with A*.

pub mod config;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod pathfinding;
pub mod setup;
pub mod solver;
pub mod utils;

pub use config::{AcoConfig, PathHeuristic, SolverMode};
pub use error::{SolverError, SolverResult};
pub use setup::init_types::{CellInput, SolveRequest, SolveResponse};
pub use solver::ant_colony::colony::run_colony;
pub use solver::ant_colony::selection::RandomSource;
pub use solver::solve;
