use rand::Rng;

use crate::domain::types::ProblemInstance;
use crate::solver::ant_colony::pheromone::PheromoneField;

// Heuristic weight for a zero-distance pair
const COINCIDENT_HEURISTIC: f64 = 1e6;

/// Uniform draws in `[0, 1)` for the colony's random choices.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..upper`; `upper` must be > 0.
    fn next_index(&mut self, upper: usize) -> usize {
        ((self.next_unit() * upper as f64) as usize).min(upper - 1)
    }
}

impl<R: Rng> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Exponents applied to the pheromone and inverse-distance terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWeights {
    pub alpha: f64,
    pub beta: f64,
}

/// `pheromone^alpha * (1 / distance)^beta` for the move `from -> to`.
pub fn edge_weight(
    problem: &ProblemInstance,
    pheromone: &PheromoneField,
    weights: SelectionWeights,
    from: usize,
    to: usize,
) -> f64 {
    let distance = problem.distance(from, to);
    let heuristic = if distance > 0.0 {
        1.0 / distance
    } else {
        COINCIDENT_HEURISTIC
    };
    pheromone.get(from, to).powf(weights.alpha) * heuristic.powf(weights.beta)
}

/// Roulette-wheel choice of the next point among unvisited, non-depot points
/// whose demand fits in `capacity`. Candidates are scanned in index order.
/// Returns `None` when no candidate carries positive weight.
pub fn select_next<R: RandomSource + ?Sized>(
    problem: &ProblemInstance,
    pheromone: &PheromoneField,
    weights: SelectionWeights,
    current: usize,
    visited: &[bool],
    capacity: u64,
    rng: &mut R,
) -> Option<usize> {
    let mut candidates: Vec<(usize, f64)> = (0..problem.num_points())
        .filter(|&next| !visited[next] && !problem.is_depot(next))
        .filter(|&next| problem.demand(next) <= capacity)
        .map(|next| (next, edge_weight(problem, pheromone, weights, current, next)))
        .filter(|(_, w)| *w > 0.0)
        .collect();

    let mut sum: f64 = candidates.iter().map(|(_, w)| w).sum();
    if candidates.is_empty() || sum <= 0.0 {
        return None;
    }

    if !sum.is_finite() {
        // Saturated weights share the wheel evenly, in index order
        let saturated: Vec<usize> = candidates
            .iter()
            .filter(|(_, w)| w.is_infinite())
            .map(|(next, _)| *next)
            .collect();
        if !saturated.is_empty() {
            return Some(saturated[rng.next_index(saturated.len())]);
        }

        // Every weight is finite but their sum is not
        let max = candidates.iter().map(|(_, w)| *w).fold(0.0, f64::max);
        for (_, w) in candidates.iter_mut() {
            *w /= max;
        }
        sum = candidates.iter().map(|(_, w)| w).sum();
    }

    let draw = rng.next_unit() * sum;
    let mut cumulative = 0.0;
    for &(next, weight) in &candidates {
        cumulative += weight;
        if cumulative > draw {
            return Some(next);
        }
    }

    // Rounding can leave the draw a hair above the final cumulative sum
    candidates.last().map(|(next, _)| *next)
}
