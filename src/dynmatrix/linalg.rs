use crate::linalg::{
    CholeskyDecomposition, DecompositionSolver, LinalgError, LuDecomposition, QrDecomposition,
    RrqrDecomposition, SvdDecomposition,
};
use crate::traits::{FloatScalar, LinalgScalar};

use super::vector::DynVector;
use super::DynMatrix;

// ── Convenience methods on DynMatrix ────────────────────────────────

impl<T: LinalgScalar> DynMatrix<T> {
    /// LU decomposition with partial pivoting and the default singularity
    /// threshold.
    pub fn lu(&self) -> Result<LuDecomposition<T>, LinalgError> {
        LuDecomposition::new(self)
    }

    /// Solve `Ax = b` for `x` via LU decomposition.
    ///
    /// ```
    /// use lindecomp::{DynMatrix, DynVector};
    /// let a = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 5.0, 3.0]);
    /// let b = DynVector::from_slice(&[4.0, 11.0]);
    /// let x = a.solve(&b).unwrap();
    /// assert!((x[0] - 1.0).abs() < 1e-12);
    /// assert!((x[1] - 2.0).abs() < 1e-12);
    /// ```
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>, LinalgError> {
        self.lu()?.into_solver().solve(b)
    }

    /// Matrix inverse via LU decomposition; `Singular` when there is none.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// use lindecomp::linalg::LinalgError;
    ///
    /// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 7.0, 2.0, 6.0]);
    /// let a_inv = a.inverse().unwrap();
    /// let id = &a * &a_inv;
    /// assert!((id[(0, 0)] - 1.0).abs() < 1e-12);
    /// assert!((id[(0, 1)]).abs() < 1e-12);
    ///
    /// let s = DynMatrix::from_rows(2, 2, &[2.0_f64, 3.0, 2.0, 3.0]);
    /// assert_eq!(s.inverse(), Err(LinalgError::Singular));
    /// ```
    pub fn inverse(&self) -> Result<DynMatrix<T>, LinalgError> {
        self.lu()?.into_solver().inverse()
    }

    /// Determinant via LU decomposition, zero for a singular matrix.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 2.0, 5.0, 3.0, 1.0, 0.0, 8.0]);
    /// assert!((a.det().unwrap() + 1.0).abs() < 1e-12);
    /// ```
    pub fn det(&self) -> Result<T, LinalgError> {
        Ok(self.lu()?.det())
    }

    /// Householder QR decomposition.
    pub fn qr(&self) -> QrDecomposition<T> {
        QrDecomposition::new(self)
    }
}

impl<T: FloatScalar> DynMatrix<T> {
    /// Rank-revealing QR with a relative singularity threshold for its solver.
    pub fn rrqr(&self, threshold: T) -> RrqrDecomposition<T> {
        RrqrDecomposition::with_threshold(self, threshold)
    }

    /// Cholesky decomposition (`A = L·Lᵀ`) with the default thresholds.
    pub fn cholesky(&self) -> Result<CholeskyDecomposition<T>, LinalgError> {
        CholeskyDecomposition::new(self)
    }

    /// Singular value decomposition of a tall or wide matrix.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let a = DynMatrix::from_rows(3, 2, &[
    ///     1.0_f64, 0.0,
    ///     0.0, 2.0,
    ///     0.0, 0.0,
    /// ]);
    /// let svd = a.svd().unwrap();
    /// assert!((svd.singular_values()[0] - 2.0).abs() < 1e-12);
    /// assert!((svd.singular_values()[1] - 1.0).abs() < 1e-12);
    /// ```
    pub fn svd(&self) -> Result<SvdDecomposition<T>, LinalgError> {
        SvdDecomposition::new(self)
    }

    /// Numerical rank from the SVD with the default tolerance.
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    /// assert_eq!(a.rank().unwrap(), 2);
    /// ```
    pub fn rank(&self) -> Result<usize, LinalgError> {
        Ok(self.svd()?.rank())
    }
}
