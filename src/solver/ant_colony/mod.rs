pub mod colony;
pub mod construction;
pub mod pheromone;
pub mod search;
pub mod selection;

pub use colony::*;
pub use construction::*;
pub use pheromone::*;
pub use selection::*;
