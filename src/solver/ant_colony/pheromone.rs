use itertools::Itertools;
use tracing::trace;

/// Symmetric pheromone matrix over demand points.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneField {
    trails: Vec<Vec<f64>>,
}

impl PheromoneField {
    pub fn new(size: usize, initial: f64) -> Self {
        PheromoneField {
            trails: vec![vec![initial; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.trails.len()
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.trails[from][to]
    }

    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for row in self.trails.iter_mut() {
            for level in row.iter_mut() {
                *level *= keep;
            }
        }
    }

    /// Adds `amount` to both directions of the edge.
    pub fn deposit(&mut self, from: usize, to: usize, amount: f64) {
        self.trails[from][to] += amount;
        if from != to {
            self.trails[to][from] += amount;
        }
    }

    /// Deposits `1 / total_cost` on every consecutive pair of every route.
    pub fn reinforce<'a, I>(&mut self, routes: I, total_cost: f64)
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        if total_cost <= 0.0 || !total_cost.is_finite() {
            trace!("Skipping reinforcement for total cost {}", total_cost);
            return;
        }

        let contribution = 1.0 / total_cost;
        for route in routes {
            for (&from, &to) in route.iter().tuple_windows() {
                self.deposit(from, to, contribution);
            }
        }
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (i + 1..n).all(|j| self.trails[i][j] == self.trails[j][i]))
    }
}
