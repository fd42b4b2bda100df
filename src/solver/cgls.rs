use nalgebra::DVector;

use crate::error::{Result, SolverError};

use super::{LeastSquaresSolver, Solution, SolveReport, SolverConfig, SparseSystem};

/// Conjugate gradient on the normal equations (CGLS) with a Jacobi
/// preconditioner built from the column norms of `A`.
///
/// Vectors are stored in single precision; inner products accumulate in
/// double precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cgls {
    config: SolverConfig,
}

impl Cgls {
    /// Creates a solver with the given bounds.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> SolverConfig {
        self.config
    }
}

impl LeastSquaresSolver for Cgls {
    #[allow(clippy::cast_possible_truncation, clippy::many_single_char_names)]
    fn solve(&self, system: &SparseSystem) -> Result<Solution> {
        let mut x = system.initial_guess().clone();
        if system.unknowns() == 0 || system.rows() == 0 {
            return Ok(Solution {
                values: x,
                report: SolveReport::trivial(),
            });
        }

        let inv_diag = system
            .column_norms_squared()
            .map(|n| if n > 0.0 { 1.0 / n } else { 1.0 });

        let rhs_norm2 = norm2(&system.apply_transpose(system.rhs()));
        let scale = if rhs_norm2 > 0.0 { rhs_norm2 } else { 1.0 };
        let tol = f64::from(self.config.tolerance);
        let threshold = tol * tol * scale;

        let mut residual = system.rhs() - system.apply(&x);
        let mut normal = system.apply_transpose(&residual);
        let mut normal_norm2 = norm2(&normal);

        let report = |iterations: usize, normal_norm2: f64| SolveReport {
            iterations,
            residual: (normal_norm2 / scale).sqrt() as f32,
            converged: normal_norm2 <= threshold,
        };

        if normal_norm2 <= threshold {
            return Ok(Solution {
                values: x,
                report: report(0, normal_norm2),
            });
        }

        let mut p = normal.component_mul(&inv_diag);
        let mut abs_new = dot(&normal, &p);
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            let q = system.apply(&p);
            let alpha = abs_new / norm2(&q);
            if !alpha.is_finite() {
                return Err(SolverError::Breakdown { iterations }.into());
            }
            let alpha32 = alpha as f32;
            x.axpy(alpha32, &p, 1.0);
            residual.axpy(-alpha32, &q, 1.0);
            normal = system.apply_transpose(&residual);
            normal_norm2 = norm2(&normal);
            iterations += 1;

            if !normal_norm2.is_finite() {
                return Err(SolverError::Breakdown { iterations }.into());
            }
            if normal_norm2 <= threshold {
                break;
            }

            let z = normal.component_mul(&inv_diag);
            let abs_old = abs_new;
            abs_new = dot(&normal, &z);
            let beta = (abs_new / abs_old) as f32;
            p = z + p * beta;
        }

        Ok(Solution {
            values: x,
            report: report(iterations, normal_norm2),
        })
    }
}

fn dot(a: &DVector<f32>, b: &DVector<f32>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

fn norm2(a: &DVector<f32>) -> f64 {
    dot(a, a)
}
