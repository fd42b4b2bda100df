use crate::error::{FieldError, Result};
use crate::field::{Grid, MaskField, ScalarField, SeamField};
use crate::math::{step, translate, Offset, NEIGHBOURS_4};
use crate::solver::{SolveReport, SolverConfig};

use super::{PoissonSeamRemoval, SeamCoupling};

/// Composites a patch into a heightmap and removes the seam it leaves.
///
/// The patch mask is translated by `offset` into the target extent (cells
/// falling outside are dropped), the defined unmasked cells bordering it
/// become the seam ring, masked cells take the patch values, and the result
/// is relaxed with [`PoissonSeamRemoval`]. Placement couples the patch to
/// its ring ([`SeamCoupling::Boundary`]) unless told otherwise.
#[derive(Debug)]
pub struct PlacePatch<'a> {
    patch: &'a ScalarField,
    mask: &'a MaskField,
    offset: Offset,
    coupling: SeamCoupling,
    config: SolverConfig,
}

impl<'a> PlacePatch<'a> {
    /// Creates a new placement of `patch` (cut by `mask`) at `offset`.
    #[must_use]
    pub fn new(patch: &'a ScalarField, mask: &'a MaskField, offset: Offset) -> Self {
        Self {
            patch,
            mask,
            offset,
            coupling: SeamCoupling::Boundary,
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

    /// Executes the placement, modifying `field` in place.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::ExtentMismatch` if the patch and its mask differ
    /// in extent, or a solver error if the iteration breaks down.
    pub fn execute(&self, field: &mut ScalarField) -> Result<SolveReport> {
        if self.patch.extent() != self.mask.extent() {
            return Err(FieldError::ExtentMismatch {
                expected: self.patch.extent(),
                found: self.mask.extent(),
            }
            .into());
        }

        let placed = self.placed_mask(field);
        let seam = seam_ring(field, &placed);
        tracing::debug!(
            masked = placed.count(),
            seam = seam.count(),
            dx = self.offset.x,
            dy = self.offset.y,
            "placing patch"
        );

        for cell in self.mask.cells() {
            if !self.mask.is_set(cell) {
                continue;
            }
            let value = self.patch.get(cell).copied().unwrap_or(f32::NAN);
            if let Some(target) = translate(cell, self.offset).and_then(|c| field.get_mut(c)) {
                *target = value;
            }
        }

        PoissonSeamRemoval::new(&placed, &seam)
            .with_coupling(self.coupling)
            .with_solver_config(self.config)
            .execute(field)
    }

    /// The patch mask translated into the target extent.
    fn placed_mask(&self, field: &ScalarField) -> MaskField {
        let mut placed = Grid::filled(field.width(), field.height(), false);
        for cell in self.mask.cells() {
            if !self.mask.is_set(cell) {
                continue;
            }
            if let Some(slot) = translate(cell, self.offset).and_then(|c| placed.get_mut(c)) {
                *slot = true;
            }
        }
        placed
    }
}

/// Marks every in-bounds, defined, unmasked 4-neighbour of a masked cell.
fn seam_ring(field: &ScalarField, placed: &MaskField) -> SeamField {
    let mut seam = Grid::filled(field.width(), field.height(), false);
    for cell in placed.cells() {
        if !placed.is_set(cell) {
            continue;
        }
        for q in NEIGHBOURS_4.iter().filter_map(|&d| step(cell, d, 1)) {
            if field.defined(q).is_some() && !placed.is_set(q) {
                if let Some(slot) = seam.get_mut(q) {
                    *slot = true;
                }
            }
        }
    }
    seam
}
