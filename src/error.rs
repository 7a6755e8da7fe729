use thiserror::Error;

/// Failures that abort a solve before any iteration runs.
///
/// Pathfinding misses, selection starvation and unserved demand are not
/// represented here: they only degrade the solution and show up in the
/// iteration statistics.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SolverError {
    pub fn config(msg: impl Into<String>) -> Self {
        SolverError::Configuration(msg.into())
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
