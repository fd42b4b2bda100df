use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for terrain synthesis and feature extraction.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Errors related to grid inputs and operation parameters.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("extent mismatch: expected {expected:?}, found {found:?}")]
    ExtentMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("sample count mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("parameter {parameter} = {value} is invalid: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: i64,
        reason: &'static str,
    },

    #[error("field is empty")]
    Empty,
}

/// Errors related to the sparse least-squares solve.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("system dimensions do not agree: {rows} rows but {rhs} right-hand side entries")]
    DimensionMismatch { rows: usize, rhs: usize },

    #[error("coefficient references column {column} but the system has {unknowns} unknowns")]
    ColumnOutOfRange { column: usize, unknowns: usize },

    #[error("solver breakdown after {iterations} iterations: non-finite residual")]
    Breakdown { iterations: usize },
}

/// Errors related to feature graph lookups.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Errors related to loading elevation rasters.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported raster format: {0}")]
    UnsupportedFormat(String),

    #[error("missing raster tag: {0}")]
    MissingTag(&'static str),

    #[error(transparent)]
    Decode(#[from] tiff::TiffError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for results using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;
