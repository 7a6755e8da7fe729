use itertools::Itertools;

use crate::domain::solution::VehicleRoute;

/// Matrix distance of walking `stops` in order and back to the first stop.
pub fn find_distance(stops: &[usize], dm: &[Vec<f64>]) -> f64 {
    if stops.len() < 2 {
        return 0.0;
    }

    let legs: f64 = stops
        .iter()
        .tuple_windows()
        .map(|(&from, &to)| dist_between(from, to, dm))
        .sum();

    legs + dist_between(stops[stops.len() - 1], stops[0], dm)
}

/// Cost of a grid-walked route: the number of cells in its real route.
pub fn real_route_cost(route: &VehicleRoute) -> f64 {
    route.real_route.len() as f64
}

pub fn dist_between(from_loc: usize, to_loc: usize, dm: &[Vec<f64>]) -> f64 {
    dm[from_loc][to_loc]
}
