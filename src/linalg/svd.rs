use std::sync::OnceLock;

use tracing::{debug, trace, warn};

use crate::dynmatrix::DynMatrix;
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::{check_rows, LinalgError};
use crate::traits::{cast, FloatScalar, MatrixRef};

/// Givens rotation `(c, s)` with `c·a + s·b = r` and `c·b - s·a = 0`.
fn givens<T: FloatScalar>(a: T, b: T) -> (T, T) {
    if b == T::zero() {
        (T::one(), T::zero())
    } else if b.abs() > a.abs() {
        let t = a / b;
        let s = T::one() / (T::one() + t * t).sqrt();
        (s * t, s)
    } else {
        let t = b / a;
        let c = T::one() / (T::one() + t * t).sqrt();
        (c, c * t)
    }
}

/// Rotate columns `j` and `k` of `m`: `m_j ← c·m_j + s·m_k`, `m_k ← c·m_k - s·m_j`.
fn rotate_cols<T: FloatScalar>(m: &mut DynMatrix<T>, j: usize, k: usize, c: T, s: T) {
    for row in 0..m.nrows() {
        let (mj, mk) = (m[(row, j)], m[(row, k)]);
        m[(row, j)] = c * mj + s * mk;
        m[(row, k)] = c * mk - s * mj;
    }
}

// ── Householder bidiagonalization ───────────────────────────────────

/// Reduce a tall `m x n` matrix (`m >= n`) to upper bidiagonal form
/// `A = U·B·Vᵀ`, with `U` (`m x m`) and `V` (`n x n`) accumulated from the
/// identity. `a` is overwritten with the reflection vectors.
fn bidiagonalize<T: FloatScalar>(
    a: &mut DynMatrix<T>,
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut DynMatrix<T>,
    v: &mut DynMatrix<T>,
) {
    let (m, n) = (a.nrows(), a.ncols());
    let tiny = T::min_positive_value();

    for k in 0..n {
        // left reflection: zero a[k+1.., k]
        let norm_sq = (k..m).fold(T::zero(), |acc, i| acc + a[(i, k)] * a[(i, k)]);
        if norm_sq > tiny {
            let norm = norm_sq.sqrt();
            let akk = a[(k, k)];
            let sigma = if akk < T::zero() { -norm } else { norm };
            let v0 = akk + sigma;
            a[(k, k)] = v0;
            for i in (k + 1)..m {
                a[(i, k)] = a[(i, k)] / v0;
            }
            let tau = v0 / sigma;

            for j in (k + 1)..n {
                let dot = ((k + 1)..m).fold(a[(k, j)], |acc, i| acc + a[(i, k)] * a[(i, j)]) * tau;
                a[(k, j)] = a[(k, j)] - dot;
                for i in (k + 1)..m {
                    a[(i, j)] = a[(i, j)] - dot * a[(i, k)];
                }
            }

            for row in 0..m {
                let dot = ((k + 1)..m).fold(u[(row, k)], |acc, i| acc + u[(row, i)] * a[(i, k)]) * tau;
                u[(row, k)] = u[(row, k)] - dot;
                for i in (k + 1)..m {
                    u[(row, i)] = u[(row, i)] - dot * a[(i, k)];
                }
            }
            diag[k] = -sigma;
        } else {
            diag[k] = a[(k, k)];
        }

        if k + 1 >= n {
            continue;
        }

        // right reflection: zero a[k, k+2..]
        let norm_sq = ((k + 1)..n).fold(T::zero(), |acc, j| acc + a[(k, j)] * a[(k, j)]);
        if k + 2 < n && norm_sq > tiny {
            let norm = norm_sq.sqrt();
            let ak1 = a[(k, k + 1)];
            let sigma = if ak1 < T::zero() { -norm } else { norm };
            let v0 = ak1 + sigma;
            a[(k, k + 1)] = v0;
            for j in (k + 2)..n {
                a[(k, j)] = a[(k, j)] / v0;
            }
            let tau = v0 / sigma;

            for i in (k + 1)..m {
                let dot = ((k + 2)..n).fold(a[(i, k + 1)], |acc, j| acc + a[(i, j)] * a[(k, j)]) * tau;
                a[(i, k + 1)] = a[(i, k + 1)] - dot;
                for j in (k + 2)..n {
                    a[(i, j)] = a[(i, j)] - dot * a[(k, j)];
                }
            }

            for row in 0..n {
                let dot = ((k + 2)..n).fold(v[(row, k + 1)], |acc, j| acc + v[(row, j)] * a[(k, j)]) * tau;
                v[(row, k + 1)] = v[(row, k + 1)] - dot;
                for j in (k + 2)..n {
                    v[(row, j)] = v[(row, j)] - dot * a[(k, j)];
                }
            }
            off_diag[k] = -sigma;
        } else {
            off_diag[k] = a[(k, k + 1)];
        }
    }
}

// ── Golub-Kahan bidiagonal QR ───────────────────────────────────────

/// Implicit-shift QR on the bidiagonal `(diag, off_diag)`, accumulating
/// rotations into the columns of `u` and `v`.
///
/// On return `diag` holds the singular values, non-negative and sorted
/// descending, and `off_diag` is zero.
fn bidiagonal_qr<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut DynMatrix<T>,
    v: &mut DynMatrix<T>,
    max_iter: usize,
) -> Result<(), LinalgError> {
    let n = diag.len();
    let eps = T::epsilon();
    let scale = diag
        .iter()
        .chain(off_diag.iter())
        .fold(T::zero(), |acc, &x| acc.max(x.abs()));
    let small = eps * scale;

    let mut iter = 0usize;
    let mut hi = n.saturating_sub(1);

    while hi > 0 {
        if off_diag[hi - 1].abs() <= eps * (diag[hi - 1].abs() + diag[hi].abs()) {
            off_diag[hi - 1] = T::zero();
            hi -= 1;
            continue;
        }

        let mut lo = hi - 1;
        while lo > 0 {
            if off_diag[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
                off_diag[lo - 1] = T::zero();
                break;
            }
            lo -= 1;
        }

        iter += 1;
        if iter > max_iter {
            return Err(LinalgError::ConvergenceFailure);
        }

        // A zero on the diagonal splits the block: chase its row's
        // superdiagonal entry off the end with left rotations.
        if let Some(idx) = (lo..hi).find(|&i| diag[i].abs() <= small) {
            diag[idx] = T::zero();
            let mut z = off_diag[idx];
            off_diag[idx] = T::zero();
            for j in (idx + 1)..=hi {
                let (c, s) = givens(diag[j], z);
                diag[j] = c * diag[j] + s * z;
                if j < hi {
                    z = -s * off_diag[j];
                    off_diag[j] = c * off_diag[j];
                }
                rotate_cols(u, j, idx, c, s);
            }
            continue;
        }

        // Wilkinson shift from the trailing 2x2 of BᵀB, computed on entries
        // scaled by the block magnitude so the squares neither overflow nor
        // underflow. Only the ratio x/z matters for the first rotation.
        let e_hi2 = if hi >= lo + 2 { off_diag[hi - 2] } else { T::zero() };
        let block_scale = [diag[hi], diag[hi - 1], off_diag[hi - 1], e_hi2, diag[lo], off_diag[lo]]
            .iter()
            .fold(T::zero(), |acc, &x| acc.max(x.abs()));
        let d_hi = diag[hi] / block_scale;
        let d_hi1 = diag[hi - 1] / block_scale;
        let e_hi1 = off_diag[hi - 1] / block_scale;
        let e_hi2 = e_hi2 / block_scale;

        let t11 = d_hi1 * d_hi1 + e_hi2 * e_hi2;
        let t12 = d_hi1 * e_hi1;
        let t22 = d_hi * d_hi + e_hi1 * e_hi1;
        let d = (t11 - t22) / (T::one() + T::one());
        let sign_d = if d >= T::zero() { T::one() } else { -T::one() };
        let mu = t22 - t12 * t12 / (d + sign_d * (d * d + t12 * t12).sqrt());

        let d_lo = diag[lo] / block_scale;
        let mut x = d_lo * d_lo - mu;
        let mut z = d_lo * (off_diag[lo] / block_scale);

        for k in lo..hi {
            // right rotation on columns k, k+1
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }
            let (dk, ek, dk1) = (diag[k], off_diag[k], diag[k + 1]);
            diag[k] = c * dk + s * ek;
            off_diag[k] = c * ek - s * dk;
            let bulge = s * dk1;
            diag[k + 1] = c * dk1;
            rotate_cols(v, k, k + 1, c, s);

            // left rotation on rows k, k+1 removes the bulge below the diagonal
            let (c2, s2) = givens(diag[k], bulge);
            diag[k] = c2 * diag[k] + s2 * bulge;
            let (ek, dk1) = (off_diag[k], diag[k + 1]);
            off_diag[k] = c2 * ek + s2 * dk1;
            diag[k + 1] = c2 * dk1 - s2 * ek;
            if k + 1 < hi {
                let ek1 = off_diag[k + 1];
                x = off_diag[k];
                z = s2 * ek1;
                off_diag[k + 1] = c2 * ek1;
            }
            rotate_cols(u, k, k + 1, c2, s2);
        }
    }
    trace!(sweeps = iter, "bidiagonal QR converged");

    for i in 0..n {
        if diag[i] < T::zero() {
            diag[i] = -diag[i];
            for row in 0..u.nrows() {
                u[(row, i)] = -u[(row, i)];
            }
        }
    }

    for i in 0..n {
        let mut max_idx = i;
        for j in (i + 1)..n {
            if diag[j] > diag[max_idx] {
                max_idx = j;
            }
        }
        if max_idx != i {
            diag.swap(i, max_idx);
            u.swap_cols(i, max_idx);
            v.swap_cols(i, max_idx);
        }
    }
    Ok(())
}

/// Compact SVD of a tall matrix: `(U m x n, σ, V n x n)`.
fn tall_svd<T: FloatScalar>(a: &DynMatrix<T>) -> Result<(DynMatrix<T>, Vec<T>, DynMatrix<T>), LinalgError> {
    let (m, n) = (a.nrows(), a.ncols());
    // work on A / max|a_ij| so the reflection norms stay in range
    let scale = a.max_abs();
    let mut work = a.clone();
    if scale > T::zero() && scale.is_finite() {
        work.as_mut_slice().iter_mut().for_each(|x| *x = *x / scale);
    }
    let mut u = DynMatrix::eye(m);
    let mut v = DynMatrix::eye(n);
    let mut diag = vec![T::zero(); n];
    let mut off_diag = vec![T::zero(); n.saturating_sub(1)];

    bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v);

    if diag.iter().chain(off_diag.iter()).any(|x| x.is_nan()) {
        debug!("NaN in bidiagonal form, singular values set to NaN");
        diag.iter_mut().for_each(|d| *d = T::nan());
    } else if let Err(e) = bidiagonal_qr(&mut diag, &mut off_diag, &mut u, &mut v, 30 * m.max(n)) {
        warn!(rows = m, cols = n, "SVD did not converge");
        return Err(e);
    } else if scale > T::zero() && scale.is_finite() {
        diag.iter_mut().for_each(|d| *d = *d * scale);
    }

    let u = DynMatrix::from_fn(m, n, |i, j| u[(i, j)]);
    Ok((u, diag, v))
}

// ── SvdDecomposition ────────────────────────────────────────────────

/// Singular value decomposition `A = U·S·Vᵀ` of any `m x n` matrix.
///
/// Compact form with `p = min(m, n)`: `U` is `m x p`, `S` is `p x p` and
/// `V` is `n x p`. Singular values are non-negative and sorted descending.
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::SvdDecomposition;
///
/// let a = DynMatrix::from_rows(2, 2, &[0.96_f64, 1.72, 2.28, 0.96]);
/// let svd = SvdDecomposition::new(&a).unwrap();
/// assert!((svd.singular_values()[0] - 3.0).abs() < 1e-12);
/// assert!((svd.singular_values()[1] - 1.0).abs() < 1e-12);
/// assert!((svd.condition_number() - 3.0).abs() < 1e-12);
/// assert_eq!(svd.rank(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T> {
    u: DynMatrix<T>,
    v: DynMatrix<T>,
    singular_values: Vec<T>,
    tolerance: T,
    cached_ut: OnceLock<DynMatrix<T>>,
    cached_vt: OnceLock<DynMatrix<T>>,
    cached_s: OnceLock<DynMatrix<T>>,
    cached_pinv: OnceLock<DynMatrix<T>>,
}

impl<T: FloatScalar> SvdDecomposition<T> {
    /// Decompose with the default rank tolerance,
    /// `max(max(m, n)·σ₀·ε, sqrt(min_positive))`.
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Result<Self, LinalgError> {
        Self::build(a, None)
    }

    /// Decompose with a caller-supplied rank tolerance.
    pub fn with_tolerance(a: &(impl MatrixRef<T> + ?Sized), tolerance: T) -> Result<Self, LinalgError> {
        Self::build(a, Some(tolerance))
    }

    fn build(a: &(impl MatrixRef<T> + ?Sized), tolerance: Option<T>) -> Result<Self, LinalgError> {
        let (m, n) = (a.nrows(), a.ncols());
        let a = DynMatrix::from_matrix_ref(a);
        let (u, singular_values, v) = if m >= n {
            tall_svd(&a)?
        } else {
            let (u, s, v) = tall_svd(&a.transpose())?;
            (v, s, u)
        };

        let tolerance = tolerance.unwrap_or_else(|| {
            let largest = singular_values.first().copied().unwrap_or_else(T::zero);
            let scaled = cast::<T>(m.max(n) as f64) * largest * T::epsilon();
            scaled.max(T::min_positive_value().sqrt())
        });

        Ok(Self {
            u,
            v,
            singular_values,
            tolerance,
            cached_ut: OnceLock::new(),
            cached_vt: OnceLock::new(),
            cached_s: OnceLock::new(),
            cached_pinv: OnceLock::new(),
        })
    }

    /// Singular values, sorted descending.
    pub fn singular_values(&self) -> &[T] {
        &self.singular_values
    }

    /// Left singular vectors `U` (`m x p`).
    pub fn u(&self) -> &DynMatrix<T> {
        &self.u
    }

    pub fn ut(&self) -> &DynMatrix<T> {
        self.cached_ut.get_or_init(|| {
            trace!("caching SVD factor Uᵀ");
            self.u.transpose()
        })
    }

    /// Right singular vectors `V` (`n x p`).
    pub fn v(&self) -> &DynMatrix<T> {
        &self.v
    }

    pub fn vt(&self) -> &DynMatrix<T> {
        self.cached_vt.get_or_init(|| {
            trace!("caching SVD factor Vᵀ");
            self.v.transpose()
        })
    }

    /// Diagonal matrix of singular values (`p x p`).
    pub fn s(&self) -> &DynMatrix<T> {
        self.cached_s.get_or_init(|| DynMatrix::from_diag(&self.singular_values))
    }

    /// Singular values above this count toward the rank.
    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    /// Number of singular values strictly above [`tolerance`](Self::tolerance).
    pub fn rank(&self) -> usize {
        self.singular_values.iter().filter(|&&s| s > self.tolerance).count()
    }

    /// Spectral norm, the largest singular value.
    pub fn norm(&self) -> T {
        self.singular_values.first().copied().unwrap_or_else(T::zero)
    }

    /// `σ_max / σ_min`, infinite when the smallest singular value is zero.
    pub fn condition_number(&self) -> T {
        match (self.singular_values.first(), self.singular_values.last()) {
            (Some(&max), Some(&min)) => max / min,
            _ => T::one(),
        }
    }

    /// `σ_min / σ_max`.
    pub fn inverse_condition_number(&self) -> T {
        match (self.singular_values.first(), self.singular_values.last()) {
            (Some(&max), Some(&min)) => min / max,
            _ => T::one(),
        }
    }

    /// Moore-Penrose pseudo-inverse `V·S⁺·Uᵀ` (`n x m`), dropping singular
    /// values at or below the tolerance.
    pub fn pseudo_inverse(&self) -> &DynMatrix<T> {
        self.cached_pinv.get_or_init(|| {
            trace!("caching SVD pseudo-inverse");
            self.compute_pseudo_inverse()
        })
    }

    fn compute_pseudo_inverse(&self) -> DynMatrix<T> {
        let mut scaled_v = self.v.clone();
        for (j, &s) in self.singular_values.iter().enumerate() {
            let f = if s > self.tolerance { T::one() / s } else { T::zero() };
            for i in 0..scaled_v.nrows() {
                scaled_v[(i, j)] = scaled_v[(i, j)] * f;
            }
        }
        scaled_v.mul_transpose(&self.u)
    }

    fn is_full_rank(&self) -> bool {
        self.rank() == self.u.nrows().max(self.v.nrows())
    }

    /// Covariance `Jᵀ·J` of a least-squares fit, where the rows of `J` are
    /// the rows of `Vᵀ` scaled by `1/σᵢ` for each `σᵢ >= min_singular_value`.
    ///
    /// Fails with [`LinalgError::CutoffTooLarge`] when no singular value
    /// reaches the cutoff.
    pub fn covariance(&self, min_singular_value: T) -> Result<DynMatrix<T>, LinalgError> {
        let kept = self
            .singular_values
            .iter()
            .take_while(|&&s| s >= min_singular_value)
            .count();
        if kept == 0 {
            return Err(LinalgError::CutoffTooLarge {
                cutoff: min_singular_value.to_f64().unwrap_or(f64::NAN),
                largest: self.norm().to_f64().unwrap_or(f64::NAN),
            });
        }
        let vt = self.vt();
        let j = DynMatrix::from_fn(kept, vt.ncols(), |i, c| vt[(i, c)] / self.singular_values[i]);
        Ok(j.transpose_mul(&j))
    }

    pub fn solver(&self) -> SvdSolver<T> {
        SvdSolver {
            pseudo_inverse: self.pseudo_inverse().clone(),
            non_singular: self.is_full_rank(),
        }
    }

    pub fn into_solver(mut self) -> SvdSolver<T> {
        let non_singular = self.is_full_rank();
        let pseudo_inverse = match self.cached_pinv.take() {
            Some(p) => p,
            None => self.compute_pseudo_inverse(),
        };
        SvdSolver {
            pseudo_inverse,
            non_singular,
        }
    }
}

// ── SvdSolver ───────────────────────────────────────────────────────

/// Least-squares solver from an SVD: `x = A⁺·b`.
///
/// Never fails with `Singular`; [`inverse`](DecompositionSolver::inverse)
/// returns the pseudo-inverse.
#[derive(Debug, Clone)]
pub struct SvdSolver<T> {
    /// `n x m`
    pseudo_inverse: DynMatrix<T>,
    non_singular: bool,
}

impl<T: FloatScalar> DecompositionSolver<T> for SvdSolver<T> {
    fn is_non_singular(&self) -> bool {
        self.non_singular
    }

    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError> {
        check_rows(b, self.nrows())?;
        Ok(&self.pseudo_inverse * &DynMatrix::from_matrix_ref(b))
    }

    fn inverse(&self) -> Result<DynMatrix<T>, LinalgError> {
        Ok(self.pseudo_inverse.clone())
    }

    fn nrows(&self) -> usize {
        self.pseudo_inverse.ncols()
    }

    fn ncols(&self) -> usize {
        self.pseudo_inverse.nrows()
    }
}

// ── SvdDecomposer ───────────────────────────────────────────────────

/// Decomposer producing [`SvdSolver`]s, optionally with a fixed rank
/// tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SvdDecomposer {
    tolerance: Option<f64>,
}

impl SvdDecomposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance: Some(tolerance),
        }
    }
}

impl<T: FloatScalar + 'static> MatrixDecomposer<T> for SvdDecomposer {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(tolerance = ?self.tolerance, "decomposing with SVD");
        let svd = match self.tolerance {
            Some(t) => SvdDecomposition::with_tolerance(a, cast(t))?,
            None => SvdDecomposition::new(a)?,
        };
        Ok(Box::new(svd.into_solver()))
    }
}
