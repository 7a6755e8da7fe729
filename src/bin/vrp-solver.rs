use grid_aco_vrp::solver::ant_colony::search;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    search::run()?;
    Ok(())
}
