use crate::domain::types::ProblemInstance;

/// One vehicle's route for a single iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub depot: usize,
    /// Demand points in visiting order, starting with the depot.
    /// The closing return to the depot is not repeated here.
    pub stops: Vec<usize>,
    /// Grid-cell indexes actually walked, including the return leg.
    /// Empty when the run is not grid-aware.
    pub real_route: Vec<usize>,
    pub load: u64,
    pub cost: f64,
    /// Set when A* failed for one of this vehicle's legs.
    pub path_miss: bool,
}

impl VehicleRoute {
    pub fn new(vehicle: usize, depot: usize) -> Self {
        VehicleRoute {
            vehicle,
            depot,
            stops: vec![depot],
            real_route: vec![],
            load: 0,
            cost: 0.0,
            path_miss: false,
        }
    }

    /// Points served, i.e. every stop after the starting depot.
    pub fn served(&self) -> &[usize] {
        self.stops.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub routes: Vec<VehicleRoute>,
    pub total_cost: f64,
    /// Non-depot points nobody served in this iteration.
    pub unserved: Vec<usize>,
    pub path_misses: usize,
}

impl Solution {
    pub fn from_routes(routes: Vec<VehicleRoute>, visited: &[bool]) -> Self {
        let total_cost = routes.iter().map(|r| r.cost).sum();
        let path_misses = routes.iter().filter(|r| r.path_miss).count();
        let unserved = visited
            .iter()
            .enumerate()
            .filter(|(_, v)| !**v)
            .map(|(i, _)| i)
            .collect();

        Solution {
            routes,
            total_cost,
            unserved,
            path_misses,
        }
    }

    pub fn stop_sequences(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.stops.clone()).collect()
    }

    pub fn real_routes(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.real_route.clone()).collect()
    }

    pub fn served_count(&self) -> usize {
        self.routes.iter().map(|r| r.served().len()).sum()
    }

    pub fn served_demand(&self, vehicle: usize, problem: &ProblemInstance) -> u64 {
        self.routes
            .get(vehicle)
            .map(|r| r.served().iter().map(|&p| problem.demand(p)).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    pub total_cost: f64,
    pub best_cost: f64,
    pub served: usize,
    pub unserved: Vec<usize>,
    pub path_misses: usize,
}

/// Outcome of a full colony run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub best: Solution,
    pub best_iteration: usize,
    pub history: Vec<IterationStats>,
    pub best_so_far_updates: Vec<(usize, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unserved_lists_unvisited_points() {
        let mut route = VehicleRoute::new(0, 0);
        route.stops.push(2);
        route.cost = 4.0;
        let visited = [true, false, true, false];

        let solution = Solution::from_routes(vec![route], &visited);
        assert_eq!(solution.unserved, vec![1, 3]);
        assert_eq!(solution.total_cost, 4.0);
        assert_eq!(solution.served_count(), 1);
        assert_eq!(solution.path_misses, 0);
    }

    #[test]
    fn fresh_route_serves_nothing() {
        let route = VehicleRoute::new(3, 1);
        assert_eq!(route.stops, vec![1]);
        assert!(route.served().is_empty());
    }
}
