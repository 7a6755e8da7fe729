use std::env;
use std::str::FromStr;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};

pub mod constant {
    pub(crate) const ITERATIONS: usize = 50;
    pub(crate) const NUM_ANTS: usize = 10;
    pub(crate) const ALPHA: f64 = 1.0;
    pub(crate) const BETA: f64 = 2.0;
    pub(crate) const EVAPORATION_RATE: f64 = 0.5;
    pub(crate) const INITIAL_PHEROMONE: f64 = 1.0;
    pub(crate) const SEED: u64 = 64;

    // Fixture scenario used when no request file is configured
    pub(crate) const GRID_ROWS: usize = 12;
    pub(crate) const GRID_COLS: usize = 16;
    pub(crate) const OBSTACLE_RATIO: f64 = 0.15;
    pub(crate) const DEPOT_COUNT: usize = 2;
    pub(crate) const CUSTOMER_COUNT: usize = 18;
    pub(crate) const TRUCK_CAPACITIES: [u64; 4] = [25, 22, 14, 4];

    pub(crate) const BEST_SO_FAR_CSV: &str = "best_so_far.csv";
}

/// Which route-construction capabilities the colony runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// Complete tour over every point, every ant reinforces its own tour.
    Tsp,
    /// Capacity-exhaustion routes from round-robin depots, costed on the distance matrix.
    MultiDepotCvrp,
    /// Capacity-exhaustion routes walked on the occupancy grid with A*.
    GridCvrp,
}

impl FromStr for SolverMode {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsp" => Ok(SolverMode::Tsp),
            "cvrp" | "multi_depot_cvrp" => Ok(SolverMode::MultiDepotCvrp),
            "grid" | "grid_cvrp" => Ok(SolverMode::GridCvrp),
            other => Err(SolverError::config(format!("unknown solver mode '{other}'"))),
        }
    }
}

/// Distance estimate used by A* on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathHeuristic {
    /// Plain Manhattan distance. Overestimates when cell costs drop below 1.
    Manhattan,
    /// Manhattan distance multiplied by the cheapest cell cost on the grid.
    ScaledManhattan,
}

impl FromStr for PathHeuristic {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(PathHeuristic::Manhattan),
            "scaled" | "scaled_manhattan" => Ok(PathHeuristic::ScaledManhattan),
            other => Err(SolverError::config(format!("unknown path heuristic '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    pub mode: SolverMode,
    pub iterations: usize,
    /// Ants per iteration. Only the tour mode uses more than one.
    pub num_ants: usize,
    /// Pheromone weight.
    pub alpha: f64,
    /// Inverse-distance weight.
    pub beta: f64,
    pub evaporation_rate: f64,
    pub initial_pheromone: f64,
    pub heuristic: PathHeuristic,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            mode: SolverMode::GridCvrp,
            iterations: constant::ITERATIONS,
            num_ants: constant::NUM_ANTS,
            alpha: constant::ALPHA,
            beta: constant::BETA,
            evaporation_rate: constant::EVAPORATION_RATE,
            initial_pheromone: constant::INITIAL_PHEROMONE,
            heuristic: PathHeuristic::ScaledManhattan,
            seed: Some(constant::SEED),
        }
    }
}

impl AcoConfig {
    /// Defaults overridden by `ACO_*` variables from the process environment or `.env`.
    pub fn from_env() -> SolverResult<Self> {
        dotenv().ok();
        let mut config = AcoConfig::default();

        if let Some(mode) = read_var::<SolverMode>("ACO_MODE")? {
            config.mode = mode;
        }
        if let Some(iterations) = read_var("ACO_ITERATIONS")? {
            config.iterations = iterations;
        }
        if let Some(ants) = read_var("ACO_ANTS")? {
            config.num_ants = ants;
        }
        if let Some(alpha) = read_var("ACO_ALPHA")? {
            config.alpha = alpha;
        }
        if let Some(beta) = read_var("ACO_BETA")? {
            config.beta = beta;
        }
        if let Some(rate) = read_var("ACO_EVAPORATION")? {
            config.evaporation_rate = rate;
        }
        if let Some(heuristic) = read_var::<PathHeuristic>("ACO_HEURISTIC")? {
            config.heuristic = heuristic;
        }
        match env::var("ACO_SEED") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("none") => config.seed = None,
            Ok(raw) => {
                config.seed = Some(raw.trim().parse().map_err(|_| {
                    SolverError::config(format!("ACO_SEED is not an integer: '{raw}'"))
                })?)
            }
            Err(_) => {}
        }

        config.validate()?;
        debug!("Loaded solver config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.iterations == 0 {
            return Err(SolverError::config("iterations must be at least 1"));
        }
        if self.num_ants == 0 {
            return Err(SolverError::config("num_ants must be at least 1"));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(SolverError::config(format!("alpha must be >= 0, got {}", self.alpha)));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(SolverError::config(format!("beta must be >= 0, got {}", self.beta)));
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate <= 1.0) {
            return Err(SolverError::config(format!(
                "evaporation_rate must be in (0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !self.initial_pheromone.is_finite() || self.initial_pheromone <= 0.0 {
            return Err(SolverError::config(format!(
                "initial_pheromone must be > 0, got {}",
                self.initial_pheromone
            )));
        }
        Ok(())
    }
}

fn read_var<T: FromStr>(key: &str) -> SolverResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!("Could not parse {}='{}'", key, raw);
                Err(SolverError::config(format!("invalid value for {key}: '{raw}'")))
            }
        },
        Err(_) => Ok(None),
    }
}
