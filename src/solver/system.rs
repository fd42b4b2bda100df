use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::SolverError;

/// Incremental row-by-row assembly of a sparse system `A x ≈ b`.
///
/// Coefficients are collected as `(row, column, value)` triplets; the column
/// count is only known once assembly finishes, because unknowns are numbered
/// on demand as rows reference them.
#[derive(Debug, Default)]
pub struct SystemBuilder {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f32>,
    rhs: Vec<f32>,
}

impl SystemBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row with the given `(column, coefficient)` entries and
    /// right-hand side. Returns the new row's index.
    pub fn push_row(&mut self, entries: &[(usize, f32)], rhs: f32) -> usize {
        let row = self.rhs.len();
        for &(col, value) in entries {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
        self.rhs.push(rhs);
        row
    }

    /// Number of rows pushed so far.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rhs.len()
    }

    /// Finishes assembly with `unknowns` columns. Duplicate entries are summed.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::ColumnOutOfRange` if a triplet references a
    /// column at or beyond `unknowns`.
    pub fn build(self, unknowns: usize) -> Result<SparseSystem, SolverError> {
        if let Some(&column) = self.cols.iter().find(|&&c| c >= unknowns) {
            return Err(SolverError::ColumnOutOfRange { column, unknowns });
        }
        let nrows = self.rhs.len();
        let coo = CooMatrix::try_from_triplets(nrows, unknowns, self.rows, self.cols, self.values)
            .map_err(|_| SolverError::ColumnOutOfRange {
                column: unknowns,
                unknowns,
            })?;
        SparseSystem::new(CsrMatrix::from(&coo), DVector::from_vec(self.rhs))
    }
}

/// An assembled, generally rectangular sparse least-squares problem.
///
/// `Aᵀ` is kept alongside `A` so both products run row-wise.
#[derive(Debug, Clone)]
pub struct SparseSystem {
    matrix: CsrMatrix<f32>,
    transpose: CsrMatrix<f32>,
    rhs: DVector<f32>,
    initial: DVector<f32>,
}

impl SparseSystem {
    /// Wraps `matrix` and `rhs`, starting iterative solves from zero.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::DimensionMismatch` if `rhs` does not have one
    /// entry per matrix row.
    pub fn new(matrix: CsrMatrix<f32>, rhs: DVector<f32>) -> Result<Self, SolverError> {
        if matrix.nrows() != rhs.len() {
            return Err(SolverError::DimensionMismatch {
                rows: matrix.nrows(),
                rhs: rhs.len(),
            });
        }
        let initial = DVector::zeros(matrix.ncols());
        let transpose = matrix.transpose();
        Ok(Self {
            matrix,
            transpose,
            rhs,
            initial,
        })
    }

    /// Sets the starting point for iterative solvers.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::DimensionMismatch` if `initial` does not have one
    /// entry per unknown.
    pub fn with_initial_guess(mut self, initial: DVector<f32>) -> Result<Self, SolverError> {
        if initial.len() != self.matrix.ncols() {
            return Err(SolverError::DimensionMismatch {
                rows: self.matrix.ncols(),
                rhs: initial.len(),
            });
        }
        self.initial = initial;
        Ok(self)
    }

    /// The coefficient matrix `A`.
    #[must_use]
    pub fn matrix(&self) -> &CsrMatrix<f32> {
        &self.matrix
    }

    /// The right-hand side `b`.
    #[must_use]
    pub fn rhs(&self) -> &DVector<f32> {
        &self.rhs
    }

    /// The starting point for iterative solvers.
    #[must_use]
    pub fn initial_guess(&self) -> &DVector<f32> {
        &self.initial
    }

    /// Number of unknowns (columns).
    #[must_use]
    pub fn unknowns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of constraint rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Computes `A x`.
    #[must_use]
    pub fn apply(&self, x: &DVector<f32>) -> DVector<f32> {
        &self.matrix * x
    }

    /// Computes `Aᵀ r`.
    #[must_use]
    pub fn apply_transpose(&self, r: &DVector<f32>) -> DVector<f32> {
        &self.transpose * r
    }

    /// Squared norm of each column of `A`.
    #[must_use]
    pub fn column_norms_squared(&self) -> DVector<f32> {
        DVector::from_iterator(
            self.transpose.nrows(),
            self.transpose
                .row_iter()
                .map(|column| column.values().iter().map(|a| a * a).sum::<f32>()),
        )
    }
}
