use itertools::Itertools;

use crate::domain::solution::VehicleRoute;

/// `"0 -> 4 -> 2 -> 0"` style rendering of a route closed on its depot.
pub fn format_route(route: &VehicleRoute) -> String {
    route
        .stops
        .iter()
        .chain(std::iter::once(&route.depot))
        .join(" -> ")
}

/// Share of `capacity` used, in percent.
pub fn utilisation(load: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (load as f64 / capacity as f64) * 100.0
}
