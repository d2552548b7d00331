use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::dynmatrix::DynMatrix;
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::{check_rows, LinalgError};
use crate::traits::{cast, FloatScalar, MatrixRef};

/// Default relative threshold for `|a_ij - a_ji| <= t * max(|a_ij|, |a_ji|)`.
pub const DEFAULT_RELATIVE_SYMMETRY_THRESHOLD: f64 = 1e-15;

/// Default absolute threshold a reduced diagonal term must exceed.
pub const DEFAULT_ABSOLUTE_POSITIVITY_THRESHOLD: f64 = 1e-10;

/// Check symmetry, then factor `Lᵀ` in place (row-major, upper triangle).
fn factor_lt<T: FloatScalar>(
    a: &(impl MatrixRef<T> + ?Sized),
    symmetry: T,
    positivity: T,
) -> Result<DynMatrix<T>, LinalgError> {
    let (rows, cols) = (a.nrows(), a.ncols());
    if rows != cols {
        return Err(LinalgError::NonSquareMatrix { rows, cols });
    }
    let n = rows;

    let mut lt = DynMatrix::from_matrix_ref(a);
    for i in 0..n {
        for j in (i + 1)..n {
            let (aij, aji) = (lt[(i, j)], lt[(j, i)]);
            if (aij - aji).abs() > symmetry * aij.abs().max(aji.abs()) {
                return Err(LinalgError::NotSymmetric { row: i, col: j });
            }
            lt[(j, i)] = T::zero();
        }
    }

    for i in 0..n {
        let d = lt[(i, i)];
        if !(d > positivity) {
            debug!(col = i, diagonal = ?d, "Cholesky diagonal not positive");
            return Err(LinalgError::NotPositiveDefinite);
        }
        let root = d.sqrt();
        lt[(i, i)] = root;
        let inv = T::one() / root;
        for q in ((i + 1)..n).rev() {
            lt[(i, q)] = lt[(i, q)] * inv;
            let (row_i, row_q) = lt.two_rows_mut(i, q);
            let liq = row_i[q];
            for p in q..n {
                row_q[p] = row_q[p] - liq * row_i[p];
            }
        }
    }
    Ok(lt)
}

// ── CholeskyDecomposition ───────────────────────────────────────────

/// Cholesky decomposition `A = L·Lᵀ` of a symmetric positive definite
/// matrix.
///
/// Construction fails with `NonSquareMatrix`, `NotSymmetric` or
/// `NotPositiveDefinite`; there is no half-built state.
///
/// ```
/// use lindecomp::{DynMatrix, DynVector};
/// use lindecomp::linalg::{CholeskyDecomposition, DecompositionSolver};
///
/// let a = DynMatrix::from_rows(3, 3, &[
///     4.0_f64, 12.0, -16.0,
///     12.0, 37.0, -43.0,
///     -16.0, -43.0, 98.0,
/// ]);
/// let chol = CholeskyDecomposition::new(&a).unwrap();
/// assert!((chol.l()[(2, 1)] - 5.0).abs() < 1e-12);
/// assert!((chol.det() - 36.0).abs() < 1e-9);
///
/// let x = chol.solver().solve(&DynVector::from_slice(&[4.0, 12.0, -16.0])).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T> {
    lt: DynMatrix<T>,
    cached_l: OnceLock<DynMatrix<T>>,
}

impl<T: FloatScalar> CholeskyDecomposition<T> {
    /// Decompose with the default symmetry and positivity thresholds.
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Result<Self, LinalgError> {
        Self::with_thresholds(
            a,
            cast(DEFAULT_RELATIVE_SYMMETRY_THRESHOLD),
            cast(DEFAULT_ABSOLUTE_POSITIVITY_THRESHOLD),
        )
    }

    pub fn with_thresholds(
        a: &(impl MatrixRef<T> + ?Sized),
        relative_symmetry_threshold: T,
        absolute_positivity_threshold: T,
    ) -> Result<Self, LinalgError> {
        let lt = factor_lt(a, relative_symmetry_threshold, absolute_positivity_threshold)?;
        Ok(Self {
            lt,
            cached_l: OnceLock::new(),
        })
    }

    /// Lower-triangular factor L.
    pub fn l(&self) -> &DynMatrix<T> {
        self.cached_l.get_or_init(|| {
            trace!("caching Cholesky factor L");
            self.lt.transpose()
        })
    }

    /// Upper-triangular factor Lᵀ.
    pub fn lt(&self) -> &DynMatrix<T> {
        &self.lt
    }

    /// Determinant: the squared product of the diagonal of L.
    pub fn det(&self) -> T {
        let p = (0..self.lt.nrows()).fold(T::one(), |acc, i| acc * self.lt[(i, i)]);
        p * p
    }

    /// Natural log of the determinant.
    pub fn ln_det(&self) -> T {
        let s = (0..self.lt.nrows()).fold(T::zero(), |acc, i| acc + self.lt[(i, i)].ln());
        s + s
    }

    pub fn solver(&self) -> CholeskySolver<T> {
        CholeskySolver { lt: self.lt.clone() }
    }

    pub fn into_solver(self) -> CholeskySolver<T> {
        CholeskySolver { lt: self.lt }
    }
}

// ── CholeskySolver ──────────────────────────────────────────────────

/// Solver from a Cholesky decomposition; always non-singular.
#[derive(Debug, Clone)]
pub struct CholeskySolver<T> {
    lt: DynMatrix<T>,
}

impl<T: FloatScalar> DecompositionSolver<T> for CholeskySolver<T> {
    fn is_non_singular(&self) -> bool {
        true
    }

    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError> {
        let n = self.lt.nrows();
        check_rows(b, n)?;
        let k = b.ncols();
        let mut x = DynMatrix::from_matrix_ref(b);

        // L·y = b
        for j in 0..n {
            let lj = self.lt.row_slice(j);
            for c in 0..k {
                x[(j, c)] = x[(j, c)] / lj[j];
                let xj = x[(j, c)];
                for i in (j + 1)..n {
                    x[(i, c)] = x[(i, c)] - xj * lj[i];
                }
            }
        }

        // Lᵀ·x = y
        for j in (0..n).rev() {
            for c in 0..k {
                x[(j, c)] = x[(j, c)] / self.lt[(j, j)];
                let xj = x[(j, c)];
                for i in 0..j {
                    x[(i, c)] = x[(i, c)] - xj * self.lt[(i, j)];
                }
            }
        }
        Ok(x)
    }

    fn nrows(&self) -> usize {
        self.lt.nrows()
    }

    fn ncols(&self) -> usize {
        self.lt.nrows()
    }
}

// ── CholeskyDecomposer ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CholeskyDecomposer {
    relative_symmetry_threshold: f64,
    absolute_positivity_threshold: f64,
}

impl CholeskyDecomposer {
    pub fn new(relative_symmetry_threshold: f64, absolute_positivity_threshold: f64) -> Self {
        Self {
            relative_symmetry_threshold,
            absolute_positivity_threshold,
        }
    }
}

impl Default for CholeskyDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_RELATIVE_SYMMETRY_THRESHOLD, DEFAULT_ABSOLUTE_POSITIVITY_THRESHOLD)
    }
}

impl<T: FloatScalar + 'static> MatrixDecomposer<T> for CholeskyDecomposer {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(
            symmetry = self.relative_symmetry_threshold,
            positivity = self.absolute_positivity_threshold,
            "decomposing with Cholesky"
        );
        let chol = CholeskyDecomposition::with_thresholds(
            a,
            cast(self.relative_symmetry_threshold),
            cast(self.absolute_positivity_threshold),
        )?;
        Ok(Box::new(chol.into_solver()))
    }
}
