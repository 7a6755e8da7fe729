use serde::{Deserialize, Serialize};

/// One grid cell as the scene layer hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellInput {
    #[serde(default)]
    pub occupied: bool,
    #[serde(default = "default_cell_cost")]
    pub cost: f64,
    pub index: usize,
}

fn default_cell_cost() -> f64 {
    1.0
}

/// Input tuple produced once per solve request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub distances: Vec<Vec<f64>>,
    pub demands: Vec<u64>,
    pub depots: Vec<usize>,
    #[serde(default)]
    pub grid: Option<Vec<Vec<CellInput>>>,
    /// `indexes[i]` is the grid-cell index of demand point `i`. Points past
    /// the end of the table use their own identity.
    #[serde(default)]
    pub indexes: Vec<usize>,
    pub vehicle_capacities: Vec<u64>,
}

/// Best solution in the shape the rendering layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub best_routes: Vec<Vec<usize>>,
    pub best_real_routes: Vec<Vec<usize>>,
    pub best_distance: f64,
    pub unserved: Vec<usize>,
}
