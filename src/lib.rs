pub mod error;
pub mod field;
pub mod math;
pub mod operations;
pub mod solver;
pub mod terrain;
pub mod topology;

pub use error::{Result, TerrainError};
