pub mod index;

pub use index::VariableIndex;

use crate::error::FieldError;
use crate::math::Cell;

/// A dense, row-major 2D grid.
///
/// Cells are addressed by [`Cell`] (`x` = column, `y` = row). Lookups with
/// out-of-bounds coordinates return `None` rather than panicking.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Elevation samples. `NaN` marks an undefined cell.
pub type ScalarField = Grid<f32>;

/// Cells to be solved for, or belonging to a patch.
pub type MaskField = Grid<bool>;

/// Cells whose target gradient is forced to zero.
pub type SeamField = Grid<bool>;

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps row-major `data` as a `width × height` grid.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::LengthMismatch` if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, FieldError> {
        let expected = width.checked_mul(height).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(FieldError::LengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(cell)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(Cell) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(to_cell(x, y)));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn extent(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns true if the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if `cell` lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.offset_of(cell).is_some()
    }

    /// Returns the value at `cell`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.offset_of(cell).map(|i| &self.data[i])
    }

    /// Returns a mutable reference to the value at `cell`, or `None` if out of bounds.
    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.offset_of(cell).map(move |i| &mut self.data[i])
    }

    /// Row-major view of the samples.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterates over every cell coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| to_cell(x, y)))
    }

    /// Fails with `ExtentMismatch` unless `other` has the same extent.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::ExtentMismatch` when the extents differ.
    pub fn ensure_same_extent<U>(&self, other: &Grid<U>) -> Result<(), FieldError> {
        if self.extent() == other.extent() {
            Ok(())
        } else {
            Err(FieldError::ExtentMismatch {
                expected: self.extent(),
                found: other.extent(),
            })
        }
    }

    fn offset_of(&self, cell: Cell) -> Option<usize> {
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

impl Grid<bool> {
    /// Returns the value at `cell`, treating out-of-bounds as unmarked.
    #[must_use]
    pub fn is_set(&self, cell: Cell) -> bool {
        self.get(cell).copied().unwrap_or(false)
    }

    /// Number of marked cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

impl Grid<f32> {
    /// Returns the value at `cell` if it is in bounds and defined.
    #[must_use]
    pub fn defined(&self, cell: Cell) -> Option<f32> {
        self.get(cell).copied().filter(|v| !v.is_nan())
    }

    /// Minimum and maximum over defined cells, or `None` if there are none.
    #[must_use]
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Downsamples by nearest neighbour to `floor(w / factor) × floor(h / factor)`.
    ///
    /// Destination cell `x` samples source column `floor(x * w / w')`.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::InvalidParameter` if `factor` is zero or the
    /// result would have no cells.
    pub fn downsample_nearest(&self, factor: usize) -> Result<Self, FieldError> {
        if factor == 0 {
            return Err(FieldError::InvalidParameter {
                parameter: "grid_spacing",
                value: 0,
                reason: "must be at least 1",
            });
        }
        let (w, h) = (self.width / factor, self.height / factor);
        if w == 0 || h == 0 {
            return Err(FieldError::InvalidParameter {
                parameter: "grid_spacing",
                value: i64::try_from(factor).unwrap_or(i64::MAX),
                reason: "larger than the field extent",
            });
        }
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            let sy = y * self.height / h;
            for x in 0..w {
                let sx = x * self.width / w;
                data.push(self.data[sy * self.width + sx]);
            }
        }
        Ok(Self {
            width: w,
            height: h,
            data,
        })
    }

    /// Multiplies every sample by `factor` in place.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_cell(x: usize, y: usize) -> Cell {
    Cell::new(x as i32, y as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_lookups_are_none() {
        let g = Grid::filled(3, 2, 1.0_f32);
        assert!(g.get(Cell::new(-1, 0)).is_none());
        assert!(g.get(Cell::new(3, 0)).is_none());
        assert!(g.get(Cell::new(0, 2)).is_none());
        assert_eq!(g.get(Cell::new(2, 1)), Some(&1.0));
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(2, 2, vec![0.0_f32; 3]).is_err());
        assert!(Grid::from_vec(2, 2, vec![0.0_f32; 4]).is_ok());
    }

    #[test]
    fn cells_are_row_major() {
        let g = Grid::filled(2, 2, false);
        let cells: Vec<_> = g.cells().map(|c| (c.x, c.y)).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn value_range_skips_undefined() {
        let g = Grid::from_vec(3, 1, vec![f32::NAN, -2.0, 5.0]).unwrap();
        assert_eq!(g.value_range(), Some((-2.0, 5.0)));
        let all_nan = Grid::filled(2, 2, f32::NAN);
        assert_eq!(all_nan.value_range(), None);
    }

    #[test]
    fn downsample_picks_nearest_source_cells() {
        #[allow(clippy::cast_precision_loss)]
        let g = Grid::from_fn(7, 4, |c| (c.x + 10 * c.y) as f32);
        let d = g.downsample_nearest(2).unwrap();
        assert_eq!(d.extent(), (3, 2));
        // Column scale is 7 / 3, so x = 1 samples column 2 and x = 2 samples column 4.
        assert_eq!(d.as_slice(), &[0.0, 2.0, 4.0, 20.0, 22.0, 24.0]);
    }

    #[test]
    fn downsample_rejects_oversized_factor() {
        let g = Grid::filled(4, 4, 0.0_f32);
        assert!(g.downsample_nearest(0).is_err());
        assert!(g.downsample_nearest(5).is_err());
    }

    #[test]
    fn from_vec_reports_sample_counts() {
        let g = Grid::from_vec(2, 3, vec![0_u8; 6]).unwrap();
        assert_eq!(g.extent(), (2, 3));
        assert!(matches!(
            Grid::from_vec(2, 3, vec![0_u8; 5]),
            Err(FieldError::LengthMismatch {
                expected: 6,
                found: 5
            })
        ));
        assert!(matches!(
            Grid::<u8>::from_vec(usize::MAX, 2, Vec::new()),
            Err(FieldError::LengthMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn extent_check() {
        let a = Grid::filled(2, 3, 0.0_f32);
        let b = Grid::filled(2, 3, false);
        let c = Grid::filled(3, 2, false);
        assert!(a.ensure_same_extent(&b).is_ok());
        assert!(matches!(
            a.ensure_same_extent(&c),
            Err(FieldError::ExtentMismatch { .. })
        ));
    }
}
