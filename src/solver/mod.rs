mod cgls;
mod system;

pub use cgls::Cgls;
pub use system::{SparseSystem, SystemBuilder};

use nalgebra::DVector;

use crate::error::Result;

/// Parameters bounding an iterative least-squares solve.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Stop once `‖Aᵀr‖ ≤ tolerance · ‖Aᵀb‖`.
    pub tolerance: f32,
    /// Hard cap on iterations; reaching it yields an unconverged report.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 5000,
        }
    }
}

/// Outcome of an iterative solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Iterations performed.
    pub iterations: usize,
    /// Relative normal-equation residual `‖Aᵀr‖ / ‖Aᵀb‖` at exit.
    pub residual: f32,
    /// Whether the tolerance was met before the iteration cap.
    pub converged: bool,
}

impl SolveReport {
    /// Report for a system with nothing to solve.
    #[must_use]
    pub fn trivial() -> Self {
        Self {
            iterations: 0,
            residual: 0.0,
            converged: true,
        }
    }
}

/// Least-squares solution `x` minimising `‖A x − b‖`.
#[derive(Debug, Clone)]
pub struct Solution {
    pub values: DVector<f32>,
    pub report: SolveReport,
}

/// A sparse least-squares backend: solve `A x ≈ b`, return `x`.
///
/// Grid code only talks to this trait, so the backend can be swapped
/// without touching the assembly logic.
pub trait LeastSquaresSolver {
    /// Solves `system` in the least-squares sense.
    ///
    /// Non-convergence is not an error; it is reported through
    /// [`SolveReport::converged`].
    ///
    /// # Errors
    ///
    /// Returns an error if the iteration breaks down numerically.
    fn solve(&self, system: &SparseSystem) -> Result<Solution>;
}
