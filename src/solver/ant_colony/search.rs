use std::env;
use std::fs;
use std::path::Path;

use csv::Writer;
use dotenv::dotenv;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::constant::{BEST_SO_FAR_CSV, SEED};
use crate::config::AcoConfig;
use crate::domain::solution::{RunReport, Solution};
use crate::domain::types::ProblemInstance;
use crate::error::SolverResult;
use crate::fixtures::data_generator::{generate_grid_scenario, ScenarioShape};
use crate::setup::init::{build_problem, load_request};
use crate::setup::init_types::SolveRequest;
use crate::solver::ant_colony::colony::run_colony;
use crate::solver::to_response;
use crate::utils::{format_route, utilisation};

/// Initialize tracing and environment
fn init_tracing_and_env() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    dotenv().ok();
}

/// Request from `VRP_INSTANCE_PATH`, or a generated grid scenario when unset.
fn load_or_generate_request(seed: u64) -> SolverResult<SolveRequest> {
    match env::var("VRP_INSTANCE_PATH") {
        Ok(path) => load_request(path),
        Err(_) => {
            info!("VRP_INSTANCE_PATH not set, generating a grid scenario");
            Ok(generate_grid_scenario(&ScenarioShape::default(), seed))
        }
    }
}

fn build_rng(config: &AcoConfig) -> ChaCha8Rng {
    match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Report final statistics and results
fn report_final_stats(report: &RunReport) {
    info!(
        "Optimization complete. Best solution found at iteration {}",
        report.best_iteration
    );
    info!("Best-so-far improvements: {}", report.best_so_far_updates.len());

    let misses: usize = report.history.iter().map(|s| s.path_misses).sum();
    if misses > 0 {
        warn!("Pathfinding misses across the run: {}", misses);
    }
    let starved = report.history.iter().filter(|s| !s.unserved.is_empty()).count();
    info!(
        "Iterations that left demand unserved: {} / {}",
        starved,
        report.history.len()
    );
}

pub fn run() -> SolverResult<()> {
    init_tracing_and_env();

    let config = AcoConfig::from_env()?;
    info!(
        "Starting ACO solver in {:?} mode with {} iterations",
        config.mode, config.iterations
    );

    let request = load_or_generate_request(config.seed.unwrap_or(SEED))?;

    let problem = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        build_problem(&request, config.mode)?
    };

    let mut rng = build_rng(&config);
    let report = run_colony(&problem, &config, &mut rng)?;

    print_solution(&report.best, &problem);
    report_final_stats(&report);

    let csv_path = env::var("VRP_BEST_CSV").unwrap_or_else(|_| BEST_SO_FAR_CSV.to_string());
    save_to_csv(&report.best_so_far_updates, &csv_path)?;

    if let Ok(output) = env::var("VRP_OUTPUT_PATH") {
        save_response(&report.best, &output)?;
    }

    Ok(())
}

pub fn save_to_csv(best_so_far_updates: &[(usize, f64)], filename: &str) -> SolverResult<()> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(["iteration", "new_best_so_far"])?;

    for (iteration, value) in best_so_far_updates {
        wtr.write_record([iteration.to_string(), value.to_string()])?;
    }

    wtr.flush()?;
    info!("Wrote best-so-far trace to {}", filename);
    Ok(())
}

pub fn save_response(best: &Solution, path: impl AsRef<Path>) -> SolverResult<()> {
    let path = path.as_ref();
    let body = serde_json::to_string_pretty(&to_response(best))?;
    fs::write(path, body)?;
    info!("Wrote best solution to {}", path.display());
    Ok(())
}

fn print_solution(solution: &Solution, problem: &ProblemInstance) {
    if solution.unserved.is_empty() {
        info!("Cost: {:.2}, every point served", solution.total_cost);
    } else {
        warn!(
            "Cost: {:.2}, unserved points: {:?}",
            solution.total_cost, solution.unserved
        );
    }

    for route in &solution.routes {
        let capacity = problem
            .vehicles
            .get(route.vehicle)
            .map(|v| v.capacity)
            .unwrap_or(0);
        info!(
            "Vehicle {}: {} / {} ({:.0}%), cost {:.2} : {}",
            route.vehicle,
            route.load,
            capacity,
            utilisation(route.load, capacity),
            route.cost,
            format_route(route)
        );
        debug!("Vehicle {} walks cells {:?}", route.vehicle, route.real_route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::solution::VehicleRoute;

    #[test]
    fn request_and_response_round_trip_through_json_files() {
        let dir = env::temp_dir().join(format!("aco-json-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let request = generate_grid_scenario(&ScenarioShape::default(), 11);
        let request_path = dir.join("request.json");
        fs::write(&request_path, serde_json::to_string(&request).unwrap()).unwrap();
        let loaded = load_request(&request_path).unwrap();
        for (a, b) in loaded.distances.iter().flatten().zip(request.distances.iter().flatten()) {
            assert!((a - b).abs() < 1e-9);
        }
        assert_eq!(loaded.demands, request.demands);
        assert_eq!(loaded.depots, request.depots);
        assert_eq!(loaded.grid, request.grid);
        assert_eq!(loaded.indexes, request.indexes);
        assert_eq!(loaded.vehicle_capacities, request.vehicle_capacities);

        let mut route = VehicleRoute::new(0, 0);
        route.stops.push(2);
        route.real_route = vec![4, 5, 4];
        route.cost = 3.0;
        let best = Solution::from_routes(vec![route], &[true, false, true]);
        let response_path = dir.join("response.json");
        save_response(&best, &response_path).unwrap();

        let written = fs::read_to_string(&response_path).unwrap();
        assert!(written.contains("\"bestRealRoutes\""));
        let parsed: crate::setup::init_types::SolveResponse =
            serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, to_response(&best));
        assert_eq!(parsed.best_routes, vec![vec![0, 2]]);
        assert_eq!(parsed.unserved, vec![1]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_request_file_is_an_io_error() {
        let path = env::temp_dir().join("aco-no-such-request.json");
        assert!(matches!(
            load_request(&path),
            Err(crate::error::SolverError::Io(_))
        ));
    }

    #[test]
    fn csv_trace_has_header_and_rows() {
        let dir = env::temp_dir().join(format!("aco-csv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trace.csv");

        save_to_csv(&[(1, 40.0), (3, 36.5)], path.to_str().unwrap()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "iteration,new_best_so_far\n1,40\n3,36.5\n");

        fs::remove_dir_all(&dir).ok();
    }
}
