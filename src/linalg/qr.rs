use std::sync::OnceLock;

use num_traits::{Float, Zero};
use tracing::{debug, trace};

use crate::dynmatrix::DynMatrix;
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::{check_rows, LinalgError};
use crate::traits::{cast, LinalgScalar, MatrixRef};

/// Default relative threshold for QR rank deficiency: only exactly zero
/// diagonal entries of R count as singular.
pub const DEFAULT_QR_THRESHOLD: f64 = 0.0;

// ── Householder kernel ──────────────────────────────────────────────

/// One Householder reflection on the transposed working copy.
///
/// Row `k` of `qrt` is column `k` of the matrix being factored. Zeroes the
/// entries below `minor` in row `minor`, reflects every later row, leaves
/// the Householder vector in `qrt[minor][minor..]` and returns the new
/// diagonal entry of R.
///
/// The diagonal entry is `-phase(x₀)·‖x‖`, so `v₀ = x₀ - a` never cancels.
/// For complex input the reflector is `H = I - 2·v·vᴴ / (vᴴ·v)`, where
/// `vᴴ·v = -2·conj(a)·v₀`.
pub(crate) fn householder_step<T: LinalgScalar>(qrt: &mut DynMatrix<T>, minor: usize) -> T {
    let x_norm = qrt.row_slice(minor)[minor..]
        .iter()
        .fold(<T::Real as Zero>::zero(), |acc, &x| acc + (x * x.conj()).re())
        .sqrt();
    let x0 = qrt[(minor, minor)];
    let x0_mod = x0.modulus();
    let a = if x0_mod > <T::Real as Zero>::zero() {
        T::zero() - x0 / T::from_real(x0_mod) * T::from_real(x_norm)
    } else {
        T::from_real(x_norm)
    };

    if a != T::zero() {
        qrt[(minor, minor)] = x0 - a;
        for col in (minor + 1)..qrt.nrows() {
            let (v, c) = qrt.two_rows_mut(minor, col);
            let dot = v[minor..]
                .iter()
                .zip(&c[minor..])
                .fold(T::zero(), |acc, (&x, &y)| acc + x.conj() * y);
            let alpha = dot / (a.conj() * v[minor]);
            for (ci, &vi) in c[minor..].iter_mut().zip(&v[minor..]) {
                *ci = *ci + alpha * vi;
            }
        }
    }
    a
}

/// Householder vectors and R diagonal shared by QR and rank-revealing QR.
#[derive(Debug, Clone)]
pub(crate) struct QrFactors<T> {
    /// `n x m`: transposed, reflected copy of the `m x n` input.
    pub(crate) qrt: DynMatrix<T>,
    /// Diagonal of R, length `min(m, n)`.
    pub(crate) r_diag: Vec<T>,
}

impl<T: LinalgScalar> QrFactors<T> {
    /// Working copy for an `m x n` matrix, not yet reflected.
    pub(crate) fn transposed(a: &(impl MatrixRef<T> + ?Sized)) -> Self {
        let (m, n) = (a.nrows(), a.ncols());
        Self {
            qrt: DynMatrix::from_fn(n, m, |i, j| *a.get(j, i)),
            r_diag: vec![T::zero(); m.min(n)],
        }
    }

    #[inline]
    pub(crate) fn m(&self) -> usize {
        self.qrt.ncols()
    }

    #[inline]
    pub(crate) fn n(&self) -> usize {
        self.qrt.nrows()
    }

    pub(crate) fn r(&self) -> DynMatrix<T> {
        let (m, n) = (self.m(), self.n());
        let mut r = DynMatrix::zeros(m, n);
        for (row, &d) in self.r_diag.iter().enumerate() {
            r[(row, row)] = d;
            for col in (row + 1)..n {
                r[(row, col)] = self.qrt[(col, row)];
            }
        }
        r
    }

    /// `Qᴴ`, built by applying the reflections to the rows of the identity
    /// in reverse order.
    pub(crate) fn qt(&self) -> DynMatrix<T> {
        let m = self.m();
        let mut qt = DynMatrix::eye(m);
        for minor in (0..self.r_diag.len()).rev() {
            let v = self.qrt.row_slice(minor);
            if v[minor] == T::zero() {
                continue;
            }
            let denom = self.r_diag[minor].conj() * v[minor];
            for col in minor..m {
                let row = qt.row_slice_mut(col);
                let dot = row[minor..]
                    .iter()
                    .zip(&v[minor..])
                    .fold(T::zero(), |acc, (&x, &y)| acc + x * y);
                let alpha = dot / denom;
                for (x, &vi) in row[minor..].iter_mut().zip(&v[minor..]) {
                    *x = *x + alpha * vi.conj();
                }
            }
        }
        qt
    }

    pub(crate) fn h(&self) -> DynMatrix<T> {
        let (m, n) = (self.m(), self.n());
        DynMatrix::from_fn(m, n, |i, j| {
            if j <= i {
                self.qrt[(j, i)] / (T::zero() - self.r_diag[j])
            } else {
                T::zero()
            }
        })
    }

    /// Whether any diagonal entry of R is at or below `limit` in magnitude.
    pub(crate) fn rank_deficient(&self, limit: T::Real) -> bool {
        let found = self.r_diag.iter().position(|d| d.modulus() <= limit);
        if let Some(k) = found {
            debug!(k, limit = ?limit, "QR diagonal entry at or below threshold");
        }
        found.is_some()
    }
}

// ── QrDecomposition ─────────────────────────────────────────────────

/// QR decomposition by Householder reflections: `A = Q·R`.
///
/// Works on any `m x n` matrix, real or complex. Q is `m x m` orthogonal
/// (unitary for complex input), R is `m x n` upper triangular, and H holds
/// the Householder vectors column by column. All three are computed on first
/// access and cached.
///
/// A rank-deficient matrix still decomposes; its solver reports singular.
/// Rank deficiency means some `|R[k][k]| <= threshold * ‖A‖_F`.
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::QrDecomposition;
///
/// let a = DynMatrix::from_rows(3, 3, &[
///     12.0_f64, -51.0, 4.0,
///     6.0, 167.0, -68.0,
///     -4.0, 24.0, -41.0,
/// ]);
/// let qr = QrDecomposition::new(&a);
/// let r = qr.r();
/// assert!((r[(0, 0)] + 14.0).abs() < 1e-12);
/// assert!((r[(1, 1)] + 175.0).abs() < 1e-12);
/// assert!((r[(2, 2)] - 35.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct QrDecomposition<T: LinalgScalar> {
    factors: QrFactors<T>,
    threshold: T::Real,
    norm: T::Real,
    cached_q: OnceLock<DynMatrix<T>>,
    cached_qt: OnceLock<DynMatrix<T>>,
    cached_r: OnceLock<DynMatrix<T>>,
    cached_h: OnceLock<DynMatrix<T>>,
}

impl<T: LinalgScalar> QrDecomposition<T> {
    /// Decompose with [`DEFAULT_QR_THRESHOLD`].
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Self {
        Self::with_threshold(a, cast(DEFAULT_QR_THRESHOLD))
    }

    /// Decompose with a relative singularity threshold.
    pub fn with_threshold(a: &(impl MatrixRef<T> + ?Sized), threshold: T::Real) -> Self {
        let mut factors = QrFactors::transposed(a);
        let norm = factors.qrt.frobenius_norm();
        for minor in 0..factors.r_diag.len() {
            factors.r_diag[minor] = householder_step(&mut factors.qrt, minor);
        }
        Self {
            factors,
            threshold,
            norm,
            cached_q: OnceLock::new(),
            cached_qt: OnceLock::new(),
            cached_r: OnceLock::new(),
            cached_h: OnceLock::new(),
        }
    }

    /// Orthogonal (unitary) factor Q (`m x m`).
    pub fn q(&self) -> &DynMatrix<T> {
        self.cached_q.get_or_init(|| {
            trace!("caching QR factor Q");
            self.qt().adjoint()
        })
    }

    /// Conjugate transpose of Q; the transpose for real input.
    pub fn qt(&self) -> &DynMatrix<T> {
        self.cached_qt.get_or_init(|| {
            trace!("caching QR factor Qᵀ");
            self.factors.qt()
        })
    }

    /// Upper-triangular factor R (`m x n`).
    pub fn r(&self) -> &DynMatrix<T> {
        self.cached_r.get_or_init(|| {
            trace!("caching QR factor R");
            self.factors.r()
        })
    }

    /// Householder vectors (`m x n`, lower trapezoidal).
    pub fn h(&self) -> &DynMatrix<T> {
        self.cached_h.get_or_init(|| {
            trace!("caching QR Householder vectors");
            self.factors.h()
        })
    }

    /// Relative singularity threshold.
    pub fn threshold(&self) -> T::Real {
        self.threshold
    }

    pub fn solver(&self) -> QrSolver<T> {
        QrSolver::new(self.factors.clone(), self.threshold * self.norm)
    }

    pub fn into_solver(self) -> QrSolver<T> {
        QrSolver::new(self.factors, self.threshold * self.norm)
    }
}

// ── QrSolver ────────────────────────────────────────────────────────

/// Least-squares solver from a QR decomposition.
///
/// Overdetermined systems are solved in the least-squares sense. For an
/// underdetermined system only the first `m` unknowns are computed; the
/// remaining entries of the solution are zero.
#[derive(Debug, Clone)]
pub struct QrSolver<T> {
    factors: QrFactors<T>,
    singular: bool,
}

impl<T: LinalgScalar> QrSolver<T> {
    pub(crate) fn new(factors: QrFactors<T>, limit: T::Real) -> Self {
        let singular = factors.rank_deficient(limit);
        Self { factors, singular }
    }
}

impl<T: LinalgScalar> DecompositionSolver<T> for QrSolver<T> {
    fn is_non_singular(&self) -> bool {
        !self.singular
    }

    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError> {
        let (m, n) = (self.factors.m(), self.factors.n());
        check_rows(b, m)?;
        if self.singular {
            return Err(LinalgError::Singular);
        }
        let k = b.ncols();
        let qrt = &self.factors.qrt;
        let r_diag = &self.factors.r_diag;

        // y = Qᴴ·b, column by column of b
        let mut y = DynMatrix::from_matrix_ref(b);
        for (minor, &d) in r_diag.iter().enumerate() {
            let v = qrt.row_slice(minor);
            let factor = T::one() / (d.conj() * v[minor]);
            for j in 0..k {
                let dot =
                    (minor..m).fold(T::zero(), |acc, row| acc + v[row].conj() * y[(row, j)]) * factor;
                for row in minor..m {
                    y[(row, j)] = y[(row, j)] + dot * v[row];
                }
            }
        }

        // R·x = y on the leading square block
        let mut x = DynMatrix::zeros(n, k);
        for row in (0..r_diag.len()).rev() {
            for j in 0..k {
                let xj = y[(row, j)] / r_diag[row];
                x[(row, j)] = xj;
                for i in 0..row {
                    y[(i, j)] = y[(i, j)] - xj * qrt[(row, i)];
                }
            }
        }
        Ok(x)
    }

    fn nrows(&self) -> usize {
        self.factors.m()
    }

    fn ncols(&self) -> usize {
        self.factors.n()
    }
}

// ── QrDecomposer ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrDecomposer {
    threshold: f64,
}

impl QrDecomposer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for QrDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_QR_THRESHOLD)
    }
}

impl<T: LinalgScalar + 'static> MatrixDecomposer<T> for QrDecomposer {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(threshold = self.threshold, "decomposing with QR");
        Ok(Box::new(QrDecomposition::with_threshold(a, cast(self.threshold)).into_solver()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynmatrix::DynVector;

    fn assert_near(a: &DynMatrix<f64>, b: &DynMatrix<f64>, tol: f64) {
        assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert!(
                    (a[(i, j)] - b[(i, j)]).abs() < tol,
                    "({}, {}): {} vs {}",
                    i,
                    j,
                    a[(i, j)],
                    b[(i, j)]
                );
            }
        }
    }

    fn test_square() -> DynMatrix<f64> {
        DynMatrix::from_rows(3, 3, &[12.0_f64, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0])
    }

    #[test]
    fn reference_factors() {
        let qr = QrDecomposition::new(&test_square());
        let q = DynMatrix::from_rows(
            3,
            3,
            &[
                -12.0_f64 / 14.0, 69.0 / 175.0, -58.0 / 175.0,
                -6.0 / 14.0, -158.0 / 175.0, 6.0 / 175.0,
                4.0 / 14.0, -30.0 / 175.0, -165.0 / 175.0,
            ],
        );
        let r = DynMatrix::from_rows(3, 3, &[-14.0_f64, -21.0, 14.0, 0.0, -175.0, 70.0, 0.0, 0.0, 35.0]);
        let h = DynMatrix::from_rows(
            3,
            3,
            &[
                26.0_f64 / 14.0, 0.0, 0.0,
                6.0 / 14.0, 648.0 / 325.0, 0.0,
                -4.0 / 14.0, 36.0 / 325.0, 2.0,
            ],
        );
        assert_near(qr.q(), &q, 1e-13);
        assert_near(qr.r(), &r, 1e-12);
        assert_near(qr.h(), &h, 1e-13);
        assert_near(qr.qt(), &q.transpose(), 1e-13);
    }

    #[test]
    fn q_times_r_rectangular() {
        let tall = DynMatrix::from_rows(
            4,
            3,
            &[12.0_f64, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0, -5.0, 34.0, 7.0],
        );
        let wide = tall.transpose();
        for a in [tall, wide] {
            let qr = QrDecomposition::new(&a);
            assert_near(&(qr.q() * qr.r()), &a, 1e-12);
            assert_near(&qr.q().transpose_mul(qr.q()), &DynMatrix::eye(a.nrows()), 1e-13);
            let r = qr.r();
            for i in 0..r.nrows() {
                for j in 0..i.min(r.ncols()) {
                    assert_eq!(r[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn singular_matrices() {
        for data in [
            [1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0],
            [1.0, 2.0, 2.0, 2.0, 4.0, 6.0, 4.0, 8.0, 12.0],
        ] {
            let a = DynMatrix::from_rows(3, 3, &data);
            let solver = QrDecomposition::new(&a).into_solver();
            assert!(!solver.is_non_singular());
            assert_eq!(solver.inverse(), Err(LinalgError::Singular));
            assert_eq!(
                solver.solve(&DynVector::from_slice(&[1.0, 1.0, 1.0])),
                Err(LinalgError::Singular)
            );
        }
    }

    #[test]
    fn threshold_flags_near_singular() {
        let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 6.0, 4.0, 2.0, 4.0, -1.0, -1.0, 2.0, 5.0]);
        assert!(QrDecomposition::new(&a).solver().is_non_singular());
        let qr = QrDecomposition::with_threshold(&a, 1e-15);
        assert_eq!(qr.threshold(), 1e-15);
        assert!(!qr.solver().is_non_singular());
    }

    #[test]
    fn underdetermined_pads_with_zeros() {
        let a = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 7.0]);
        let solver = QrDecomposition::new(&a).into_solver();
        let x = solver.solve(&DynVector::from_slice(&[1.0, 2.0])).unwrap();
        assert_eq!(x.len(), 3);
        assert_eq!(x[2], 0.0);
        // first two unknowns solve the leading 2x2 block
        assert!((x[0] + 1.0 / 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn overdetermined_least_squares() {
        // fit y = c0 + c1*x to (0,1), (1,2), (2,4)
        let a = DynMatrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let solver = QrDecomposition::new(&a).into_solver();
        let x = solver.solve(&DynVector::from_slice(&[1.0, 2.0, 4.0])).unwrap();
        assert!((x[0] - 5.0 / 6.0).abs() < 1e-12);
        assert!((x[1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn dimension_mismatch() {
        let solver = QrDecomposition::new(&test_square()).into_solver();
        assert_eq!(
            solver.solve(&DynVector::from_slice(&[1.0, 2.0])),
            Err(LinalgError::DimensionMismatch { expected: 3, got: 2 })
        );
    }

    #[test]
    fn cached_factors_are_shared() {
        let qr = QrDecomposition::new(&test_square());
        assert!(std::ptr::eq(qr.q(), qr.q()));
        assert!(std::ptr::eq(qr.r(), qr.r()));
        assert!(std::ptr::eq(qr.h(), qr.h()));
    }

    #[test]
    fn pseudo_inverse_of_tall_matrix() {
        let a = DynMatrix::from_rows(
            4,
            3,
            &[12.0_f64, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0, -5.0, 34.0, 7.0],
        );
        let inv = QrDecomposition::new(&a).into_solver().inverse().unwrap();
        assert_eq!((inv.nrows(), inv.ncols()), (3, 4));
        assert_near(&(&inv * &a), &DynMatrix::eye(3), 1e-12);
    }
}
