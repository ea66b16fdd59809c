mod flatten;
mod mapper;
mod model;


pub use flatten::{flatten, Flattened};
pub use mapper::map_families;
pub use model::*;
