use std::sync::OnceLock;

use tracing::trace;

use crate::dynmatrix::DynMatrix;
use crate::linalg::qr::{householder_step, QrFactors, QrSolver, DEFAULT_QR_THRESHOLD};
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::LinalgError;
use crate::traits::{cast, FloatScalar, MatrixRef};

/// Rank-revealing QR: Householder QR with column pivoting, `A·P = Q·R`.
///
/// Before each reflection the remaining column of largest norm is moved
/// into place, so the diagonal of R decreases in magnitude and
/// [`rank`](Self::rank) can read the numerical rank off R.
///
/// Candidate norms are taken over the rows not yet reduced (`minor..m`),
/// not over the full column. Rows above `minor` already belong to R and no
/// longer affect the trailing factorization. Pivoting on full-column norms
/// can choose a different order, and so a different P and R, for the same
/// input. `A·P = Q·R` holds either way.
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::RrqrDecomposition;
///
/// let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 2.0, 4.0, 6.0, 1.0, 1.0, 1.0]);
/// let rrqr = RrqrDecomposition::new(&a);
/// assert_eq!(rrqr.rank(1e-10), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RrqrDecomposition<T> {
    factors: QrFactors<T>,
    /// Column `i` of `A·P` is column `perm[i]` of `A`.
    perm: Vec<usize>,
    threshold: T,
    norm: T,
    cached_p: OnceLock<DynMatrix<T>>,
    cached_q: OnceLock<DynMatrix<T>>,
    cached_qt: OnceLock<DynMatrix<T>>,
    cached_r: OnceLock<DynMatrix<T>>,
    cached_h: OnceLock<DynMatrix<T>>,
}

impl<T: FloatScalar> RrqrDecomposition<T> {
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Self {
        Self::with_threshold(a, cast(DEFAULT_QR_THRESHOLD))
    }

    /// Decompose with a relative singularity threshold for the solver.
    pub fn with_threshold(a: &(impl MatrixRef<T> + ?Sized), threshold: T) -> Self {
        let mut factors = QrFactors::transposed(a);
        let norm = factors.qrt.frobenius_norm();
        let (m, n) = (factors.m(), factors.n());
        let mut perm: Vec<usize> = (0..n).collect();

        for minor in 0..factors.r_diag.len() {
            let mut best = minor;
            let mut best_norm = T::zero();
            for col in minor..n {
                let s = factors.qrt.row_slice(col)[minor..m]
                    .iter()
                    .fold(T::zero(), |acc, &x| acc + x * x);
                if s > best_norm {
                    best_norm = s;
                    best = col;
                }
            }
            if best != minor {
                factors.qrt.swap_rows(minor, best);
                perm.swap(minor, best);
            }
            factors.r_diag[minor] = householder_step(&mut factors.qrt, minor);
        }

        Self {
            factors,
            perm,
            threshold,
            norm,
            cached_p: OnceLock::new(),
            cached_q: OnceLock::new(),
            cached_qt: OnceLock::new(),
            cached_r: OnceLock::new(),
            cached_h: OnceLock::new(),
        }
    }

    /// Column permutation (`n x n`) with `P[perm[i]][i] == 1`.
    pub fn p(&self) -> &DynMatrix<T> {
        self.cached_p.get_or_init(|| {
            trace!("caching RRQR permutation P");
            let n = self.perm.len();
            let mut p = DynMatrix::zeros(n, n);
            for (i, &c) in self.perm.iter().enumerate() {
                p[(c, i)] = T::one();
            }
            p
        })
    }

    pub fn q(&self) -> &DynMatrix<T> {
        self.cached_q.get_or_init(|| self.qt().transpose())
    }

    pub fn qt(&self) -> &DynMatrix<T> {
        self.cached_qt.get_or_init(|| self.factors.qt())
    }

    pub fn r(&self) -> &DynMatrix<T> {
        self.cached_r.get_or_init(|| self.factors.r())
    }

    pub fn h(&self) -> &DynMatrix<T> {
        self.cached_h.get_or_init(|| self.factors.h())
    }

    /// Column order: column `i` of `A·P` is column `permutation()[i]` of `A`.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    pub fn threshold(&self) -> T {
        self.threshold
    }

    /// Numerical rank.
    ///
    /// Grows the rank while the Frobenius norm of the trailing block of R,
    /// relative to the previous block and scaled by `‖R‖_F`, stays at or
    /// above `drop_threshold`.
    pub fn rank(&self, drop_threshold: T) -> usize {
        let r = self.r();
        let (rows, cols) = (r.nrows(), r.ncols());
        let r_norm = r.frobenius_norm();
        let mut last_norm = r_norm;
        let mut rank = 1;
        while rank < rows.min(cols) {
            let this_norm = r.sub_matrix(rank, rows - 1, rank, cols - 1).frobenius_norm();
            if this_norm == T::zero() || (this_norm / last_norm) * r_norm < drop_threshold {
                break;
            }
            rank += 1;
            last_norm = this_norm;
        }
        rank
    }

    pub fn solver(&self) -> RrqrSolver<T> {
        RrqrSolver {
            inner: QrSolver::new(self.factors.clone(), self.threshold * self.norm),
            perm: self.perm.clone(),
        }
    }

    pub fn into_solver(self) -> RrqrSolver<T> {
        RrqrSolver {
            inner: QrSolver::new(self.factors, self.threshold * self.norm),
            perm: self.perm,
        }
    }
}

/// QR solver followed by the column permutation: `x = P·y`.
#[derive(Debug, Clone)]
pub struct RrqrSolver<T> {
    inner: QrSolver<T>,
    perm: Vec<usize>,
}

impl<T: FloatScalar> DecompositionSolver<T> for RrqrSolver<T> {
    fn is_non_singular(&self) -> bool {
        self.inner.is_non_singular()
    }

    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError> {
        let y = self.inner.solve_matrix(b)?;
        let mut x = DynMatrix::zeros(y.nrows(), y.ncols());
        for (i, &c) in self.perm.iter().enumerate() {
            x.row_slice_mut(c).copy_from_slice(y.row_slice(i));
        }
        Ok(x)
    }

    fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    fn ncols(&self) -> usize {
        self.inner.ncols()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RrqrDecomposer {
    threshold: f64,
}

impl RrqrDecomposer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for RrqrDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_QR_THRESHOLD)
    }
}

impl<T: FloatScalar + 'static> MatrixDecomposer<T> for RrqrDecomposer {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(threshold = self.threshold, "decomposing with RRQR");
        Ok(Box::new(RrqrDecomposition::with_threshold(a, cast(self.threshold)).into_solver()))
    }
}
