pub mod grid;
pub mod solution;
pub mod types;

pub use grid::*;
pub use solution::*;
pub use types::*;
