use crate::error::FieldError;
use crate::field::{Grid, ScalarField};
use crate::math::{step, Cell, FORWARD_DIRECTIONS};

use super::{FeatureParams, Polarity};

/// Crest cells found on the downsampled operational grid.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    /// Downsampled elevations, negated for valleys so crests are maxima.
    pub grid: ScalarField,
    /// Candidate id per grid cell, `None` for non-candidates.
    pub ids: Grid<Option<usize>>,
    /// Candidate cells in discovery (row-major) order; index = id.
    pub cells: Vec<Cell>,
}

impl CandidateSet {
    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no candidates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Candidate id at `cell`, if any.
    #[must_use]
    pub fn id_at(&self, cell: Cell) -> Option<usize> {
        self.ids.get(cell).copied().flatten()
    }

    /// Polarity-adjusted elevation of candidate `id`. Unknown ids read as zero.
    #[must_use]
    pub fn elevation(&self, id: usize) -> f32 {
        self.cells
            .get(id)
            .and_then(|&cell| self.grid.get(cell))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Downsamples `field` and marks cells that are crests along at least one
/// lattice axis.
///
/// A cell is a crest along a direction if, walking up to half the profile
/// length both forwards and backwards, each side has some sample lower than
/// the cell by more than 1% of the field's value range.
///
/// # Errors
///
/// Returns `FieldError::Empty` if `field` has no defined cells, or
/// `FieldError::InvalidParameter` if the grid spacing leaves no cells.
pub fn select(field: &ScalarField, params: &FeatureParams) -> Result<CandidateSet, FieldError> {
    let (lo, hi) = field.value_range().ok_or(FieldError::Empty)?;
    let threshold = 0.01 * (hi - lo);

    let mut grid = field.downsample_nearest(params.grid_spacing)?;
    if params.polarity == Polarity::Valley {
        grid.scale(-1.0);
    }

    let reach = i32::try_from(params.profile_length / 2).unwrap_or(i32::MAX);
    let mut ids = Grid::filled(grid.width(), grid.height(), None);
    let mut cells = Vec::new();
    for cell in grid.cells() {
        let Some(elevation) = grid.defined(cell) else {
            continue;
        };
        let drops_below = |direction: (i32, i32)| {
            (1..=reach).any(|l| {
                step(cell, direction, l)
                    .and_then(|c| grid.get(c))
                    .is_some_and(|&v| elevation - v > threshold)
            })
        };
        let is_crest = FORWARD_DIRECTIONS.iter().any(|&(dx, dy)| {
            drops_below((dx, dy)) && drops_below((-dx, -dy))
        });
        if is_crest {
            if let Some(slot) = ids.get_mut(cell) {
                *slot = Some(cells.len());
            }
            cells.push(cell);
        }
    }

    Ok(CandidateSet { grid, ids, cells })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(grid_spacing: usize, polarity: Polarity) -> FeatureParams {
        FeatureParams {
            grid_spacing,
            profile_length: 3,
            polarity,
        }
    }

    /// A tent profile along x: peak at column 4, constant along y.
    #[allow(clippy::cast_precision_loss)]
    fn ridge_field() -> ScalarField {
        Grid::from_fn(9, 6, |c| 10.0 - (c.x - 4).abs() as f32)
    }

    #[test]
    fn flat_field_has_no_candidates() {
        let field = Grid::filled(30, 20, 7.5_f32);
        let set = select(&field, &params(3, Polarity::Ridge)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn ridge_line_is_selected() {
        let set = select(&ridge_field(), &params(1, Polarity::Ridge)).unwrap();
        assert_eq!(set.len(), 6);
        assert!(set.cells.iter().all(|c| c.x == 4));
        // Ids follow row-major discovery.
        for (id, cell) in set.cells.iter().enumerate() {
            assert_eq!(set.id_at(*cell), Some(id));
            assert_eq!(cell.y, i32::try_from(id).unwrap());
        }
    }

    #[test]
    fn valley_polarity_finds_troughs() {
        let mut field = ridge_field();
        field.scale(-1.0);
        assert!(select(&field, &params(1, Polarity::Ridge))
            .unwrap()
            .is_empty());
        let set = select(&field, &params(1, Polarity::Valley)).unwrap();
        assert_eq!(set.len(), 6);
        assert!(set.elevation(0) > set.grid.get(Cell::new(0, 0)).copied().unwrap());
    }

    #[test]
    fn drops_below_threshold_are_ignored() {
        // Range is 100, so the threshold is 1; a bump of 0.5 does not count.
        let field = Grid::from_fn(7, 3, |c| match (c.x, c.y) {
            (0, 0) => 100.0,
            (3, _) => 0.5,
            _ => 0.0,
        });
        let set = select(&field, &params(1, Polarity::Ridge)).unwrap();
        assert!(set.cells.iter().all(|c| c.x != 3));
    }

    #[test]
    fn single_sided_slope_is_not_a_crest() {
        #[allow(clippy::cast_precision_loss)]
        let field = Grid::from_fn(8, 8, |c| c.x as f32);
        let set = select(&field, &params(1, Polarity::Ridge)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn unknown_candidate_id_reads_as_zero() {
        let set = select(&ridge_field(), &params(1, Polarity::Ridge)).unwrap();
        assert_eq!(set.elevation(0), 10.0);
        assert_eq!(set.elevation(set.len()), 0.0);
        assert_eq!(set.elevation(usize::MAX), 0.0);
    }

    #[test]
    fn undefined_field_is_rejected() {
        let field = Grid::filled(4, 4, f32::NAN);
        assert!(matches!(
            select(&field, &params(1, Polarity::Ridge)),
            Err(FieldError::Empty)
        ));
    }
}
