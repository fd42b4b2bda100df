mod patch;

pub use patch::PlacePatch;

use nalgebra::DVector;

use crate::error::Result;
use crate::field::{MaskField, ScalarField, SeamField, VariableIndex};
use crate::math::{step, Cell, NEIGHBOURS_4};
use crate::solver::{Cgls, LeastSquaresSolver, SolveReport, SolverConfig, SystemBuilder};

/// Which neighbours of a masked cell take part in its gradient rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeamCoupling {
    /// Masked neighbours only. A row targets zero when its own cell is a
    /// seam cell. Isolated masked cells get no gradient rows and the
    /// interior level is only fixed by the starting values.
    #[default]
    MaskedOnly,
    /// Masked neighbours and the defined boundary ring around the mask.
    /// Each term whose neighbour is a seam cell also targets zero.
    ///
    /// The interior is tied to the surrounding terrain, so a seam cell on
    /// the ring pulls the patch towards it.
    Boundary,
}

/// Relaxes the masked region of a heightmap so it blends with its
/// surroundings.
///
/// Every masked cell contributes one row per axis summing
/// `x_q − x_p = S_q − S_p` over its masked neighbours `q` along that axis, and
/// every unmasked cell touching the mask contributes a Dirichlet row pinning
/// it to its current value. A row whose cell is marked in the seam field
/// targets a zero gradient instead. The resulting rectangular system is
/// solved in the least-squares sense and the solution is written back into
/// the field. [`SeamCoupling::Boundary`] widens the rows to the boundary ring.
#[derive(Debug)]
pub struct PoissonSeamRemoval<'a> {
    mask: &'a MaskField,
    seam: &'a SeamField,
    coupling: SeamCoupling,
    config: SolverConfig,
}

impl<'a> PoissonSeamRemoval<'a> {
    /// Creates a new seam removal over `mask`, flattening gradients at `seam`.
    #[must_use]
    pub fn new(mask: &'a MaskField, seam: &'a SeamField) -> Self {
        Self {
            mask,
            seam,
            coupling: SeamCoupling::default(),
            config: SolverConfig::default(),
        }
    }

    /// Selects which neighbours feed the gradient rows.
    #[must_use]
    pub fn with_coupling(mut self, coupling: SeamCoupling) -> Self {
        self.coupling = coupling;
        self
    }

    /// Overrides the solver bounds.
    #[must_use]
    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the seam removal in place with the default [`Cgls`] backend.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::ExtentMismatch` if the field, mask and seam
    /// extents differ, or a solver error if the iteration breaks down.
    pub fn execute(&self, field: &mut ScalarField) -> Result<SolveReport> {
        self.execute_with(field, &Cgls::new(self.config))
    }

    /// Executes the seam removal in place using `solver`.
    ///
    /// A report with `converged == false` means the field holds a
    /// best-effort result after the iteration cap.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::ExtentMismatch` if the field, mask and seam
    /// extents differ, or a solver error if the iteration breaks down.
    pub fn execute_with<S: LeastSquaresSolver>(
        &self,
        field: &mut ScalarField,
        solver: &S,
    ) -> Result<SolveReport> {
        field.ensure_same_extent(self.mask)?;
        field.ensure_same_extent(self.seam)?;

        let mut index = VariableIndex::new();
        let mut builder = SystemBuilder::new();
        for cell in field.cells() {
            let Some(value) = field.defined(cell) else {
                continue;
            };
            if self.mask.is_set(cell) {
                for axis in [(1, 0), (0, 1)] {
                    self.push_gradient_row(field, cell, value, axis, &mut index, &mut builder);
                }
            } else if self.touches_mask(cell) {
                builder.push_row(&[(index.id(cell), 1.0)], value);
            }
        }

        tracing::debug!(
            rows = builder.row_count(),
            unknowns = index.len(),
            "assembled seam system"
        );
        if index.is_empty() {
            return Ok(SolveReport::trivial());
        }

        // Start from the composited values so directions the rows leave
        // unconstrained keep their current level.
        let initial: Vec<f32> = index
            .iter()
            .map(|(_, cell)| field.get(cell).copied().unwrap_or(0.0))
            .collect();
        let system = builder
            .build(index.len())?
            .with_initial_guess(DVector::from_vec(initial))?;

        let solution = solver.solve(&system)?;
        let report = solution.report;
        if report.converged {
            tracing::debug!(
                iterations = report.iterations,
                residual = report.residual,
                "seam system solved"
            );
        } else {
            tracing::warn!(
                iterations = report.iterations,
                residual = report.residual,
                "seam solve hit the iteration cap; keeping best-effort result"
            );
        }

        for (id, cell) in index.iter() {
            if let Some(v) = field.get_mut(cell) {
                *v = solution.values[id];
            }
        }
        Ok(report)
    }

    /// Emits `Σ (x_q − x_p) = Σ (S_q − S_p)` over the contributing neighbours
    /// of `cell` along `axis`, or nothing if there are none.
    fn push_gradient_row(
        &self,
        field: &ScalarField,
        cell: Cell,
        value: f32,
        (dx, dy): (i32, i32),
        index: &mut VariableIndex,
        builder: &mut SystemBuilder,
    ) {
        let mut entries = Vec::with_capacity(3);
        let mut target = 0.0;
        for sign in [1, -1] {
            let Some(q) = step(cell, (dx, dy), sign) else {
                continue;
            };
            let Some(qv) = field.defined(q) else {
                continue;
            };
            let flat = match self.coupling {
                SeamCoupling::MaskedOnly if !self.mask.is_set(q) => continue,
                SeamCoupling::MaskedOnly => false,
                SeamCoupling::Boundary => self.seam.is_set(q),
            };
            entries.push((index.id(q), 1.0));
            if !flat {
                target += qv - value;
            }
        }
        if entries.is_empty() {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = entries.len() as f32;
        entries.push((index.id(cell), -count));
        if self.seam.is_set(cell) {
            target = 0.0;
        }
        builder.push_row(&entries, target);
    }

    fn touches_mask(&self, cell: Cell) -> bool {
        NEIGHBOURS_4
            .iter()
            .filter_map(|&direction| step(cell, direction, 1))
            .any(|q| self.mask.is_set(q))
    }
}
