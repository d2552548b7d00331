use crate::traits::{FloatScalar, LinalgScalar, Scalar};

use super::vector::DynVector;
use super::DynMatrix;

// ── Transpose and products ──────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// Transpose.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = m.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t.ncols(), 2);
    /// assert_eq!(t[(1, 0)], 2.0);
    /// ```
    pub fn transpose(&self) -> Self {
        DynMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// `self * rhsᵀ` without materialising the transpose.
    pub fn mul_transpose(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.ncols, rhs.ncols,
            "dimension mismatch: {}x{} * ({}x{})ᵀ",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        DynMatrix::from_fn(self.nrows, rhs.nrows, |i, j| {
            self.row_slice(i)
                .iter()
                .zip(rhs.row_slice(j))
                .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
        })
    }

    /// `selfᵀ * rhs` without materialising the transpose.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// assert_eq!(a.transpose_mul(&a), a.transpose() * &a);
    /// ```
    pub fn transpose_mul(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.nrows, rhs.nrows,
            "dimension mismatch: ({}x{})ᵀ * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = DynMatrix::zeros(self.ncols, rhs.ncols);
        for k in 0..self.nrows {
            let b_row = rhs.row_slice(k);
            for (i, &a) in self.row_slice(k).iter().enumerate() {
                for (o, &b) in out.row_slice_mut(i).iter_mut().zip(b_row) {
                    *o = *o + a * b;
                }
            }
        }
        out
    }
}

impl<T: LinalgScalar> DynMatrix<T> {
    /// Conjugate transpose `Aᴴ`; the plain transpose for real matrices.
    pub fn adjoint(&self) -> Self {
        DynMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)].conj())
    }
}

// ── Blocks, rows, columns ───────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// Copy the inclusive block `[start_row..=end_row] x [start_col..=end_col]`.
    ///
    /// Panics if the block is empty or out of range.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let m = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    /// let b = m.sub_matrix(1, 2, 0, 1);
    /// assert_eq!(b.as_slice(), &[4.0, 5.0, 7.0, 8.0]);
    /// ```
    pub fn sub_matrix(&self, start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Self {
        assert!(
            start_row <= end_row && end_row < self.nrows && start_col <= end_col && end_col < self.ncols,
            "block [{}..={}, {}..={}] out of bounds for {}x{} matrix",
            start_row,
            end_row,
            start_col,
            end_col,
            self.nrows,
            self.ncols,
        );
        DynMatrix::from_fn(end_row - start_row + 1, end_col - start_col + 1, |i, j| {
            self[(start_row + i, start_col + j)]
        })
    }

    /// Overwrite the block starting at `(row, col)` with `block`.
    pub fn set_sub_matrix(&mut self, row: usize, col: usize, block: &Self) {
        assert!(
            row + block.nrows <= self.nrows && col + block.ncols <= self.ncols,
            "{}x{} block at ({}, {}) does not fit in {}x{} matrix",
            block.nrows,
            block.ncols,
            row,
            col,
            self.nrows,
            self.ncols,
        );
        for i in 0..block.nrows {
            self.row_slice_mut(row + i)[col..col + block.ncols].copy_from_slice(block.row_slice(i));
        }
    }

    /// Copy row `i` into a vector.
    pub fn row(&self, i: usize) -> DynVector<T> {
        DynVector::from_slice(self.row_slice(i))
    }

    /// Copy column `j` into a vector.
    pub fn col(&self, j: usize) -> DynVector<T> {
        DynVector::from_column(self, j)
    }

    /// Whether `self == selfᵀ` exactly.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.nrows).all(|i| (i + 1..self.ncols).all(|j| self[(i, j)] == self[(j, i)]))
    }
}

impl<T: FloatScalar> DynMatrix<T> {
    /// Whether `|a_ij - a_ji| <= tol * max(|a_ij|, |a_ji|)` for every pair.
    pub fn is_symmetric_within(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.nrows).all(|i| {
            (i + 1..self.ncols).all(|j| {
                let (a, b) = (self[(i, j)], self[(j, i)]);
                (a - b).abs() <= tol * a.abs().max(b.abs())
            })
        })
    }
}

// ── Row / column swaps ──────────────────────────────────────────────

impl<T> DynMatrix<T> {
    /// Swap two rows in place.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let mut m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// m.swap_rows(0, 1);
    /// assert_eq!(m[(0, 0)], 3.0);
    /// assert_eq!(m[(1, 0)], 1.0);
    /// ```
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            let n = self.ncols;
            for j in 0..n {
                self.data.swap(a * n + j, b * n + j);
            }
        }
    }

    /// Swap two columns in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a != b {
            for i in 0..self.nrows {
                let base = i * self.ncols;
                self.data.swap(base + a, base + b);
            }
        }
    }
}
