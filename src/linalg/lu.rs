use std::sync::OnceLock;

use num_traits::ToPrimitive;
use tracing::{debug, trace};

use crate::dynmatrix::DynMatrix;
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::{check_rows, LinalgError};
use crate::traits::{cast, LinalgScalar, MatrixMut, MatrixRef, Scalar};

/// Default absolute pivot threshold below which a float LU is singular.
pub const DEFAULT_SINGULARITY_THRESHOLD: f64 = 1e-11;

// ── Elimination kernel ──────────────────────────────────────────────

/// Chooses the pivot row for one column of an elimination.
///
/// Returns `None` when no acceptable pivot exists, which marks the matrix
/// singular and stops the elimination.
pub(crate) trait PivotPolicy<T> {
    fn choose<M: MatrixRef<T>>(&self, lu: &M, col: usize) -> Option<usize>;
}

/// Largest modulus among the candidate rows, singular below an absolute
/// threshold.
pub(crate) struct LargestModulus<R> {
    pub(crate) threshold: R,
}

impl<T: LinalgScalar> PivotPolicy<T> for LargestModulus<T::Real> {
    fn choose<M: MatrixRef<T>>(&self, lu: &M, col: usize) -> Option<usize> {
        let mut max_row = col;
        let mut max_val = lu.get(col, col).modulus();
        for row in (col + 1)..lu.nrows() {
            let val = lu.get(row, col).modulus();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < self.threshold {
            debug!(col, magnitude = ?max_val, "LU pivot below singularity threshold");
            return None;
        }
        Some(max_row)
    }
}

/// Outcome of [`eliminate`].
#[derive(Debug)]
pub(crate) struct Elimination {
    /// `pivot[i]` is the original row now at position `i`.
    pub(crate) pivot: Vec<usize>,
    /// Whether an even number of row swaps was made.
    pub(crate) even: bool,
    pub(crate) singular: bool,
}

/// Gaussian elimination with row pivoting, in place.
///
/// On return the strict lower triangle of `lu` holds the multipliers of L
/// (unit diagonal implied) and the upper triangle holds U. If the policy
/// rejects a column the elimination stops there and the result is flagged
/// singular; `lu` is then only partially reduced.
pub(crate) fn eliminate<T: Scalar>(
    lu: &mut impl MatrixMut<T>,
    policy: &impl PivotPolicy<T>,
) -> Elimination {
    let n = lu.nrows();
    let mut pivot: Vec<usize> = (0..n).collect();
    let mut even = true;

    for col in 0..n {
        let Some(max_row) = policy.choose(&*lu, col) else {
            return Elimination {
                pivot,
                even,
                singular: true,
            };
        };

        if max_row != col {
            lu.swap_rows(col, max_row);
            pivot.swap(col, max_row);
            even = !even;
        }

        let p = *lu.get(col, col);
        for row in (col + 1)..n {
            let factor = *lu.get(row, col) / p;
            *lu.get_mut(row, col) = factor;
            if factor == T::zero() {
                continue;
            }
            for j in (col + 1)..n {
                let u = *lu.get(col, j);
                let x = lu.get_mut(row, j);
                *x = *x - factor * u;
            }
        }
    }

    Elimination {
        pivot,
        even,
        singular: false,
    }
}

// ── LuDecomposition ─────────────────────────────────────────────────

/// LU decomposition with partial row pivoting: `P·A = L·U`.
///
/// Float matrices are built with [`new`](Self::new) or
/// [`with_threshold`](Self::with_threshold); exact fields use the
/// constructors in the field section ([`over_field`](Self::over_field) and
/// friends). A singular input still decomposes: [`l`](Self::l),
/// [`u`](Self::u) and [`p`](Self::p) return `None`, the determinant is zero,
/// and the solver reports singular.
///
/// ```
/// use lindecomp::{DynMatrix, DynVector};
/// use lindecomp::linalg::{DecompositionSolver, LuDecomposition};
///
/// let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 2.0, 5.0, 3.0, 1.0, 0.0, 8.0]);
/// let lu = LuDecomposition::new(&a).unwrap();
/// assert!((lu.det() + 1.0).abs() < 1e-12);
/// assert_eq!(lu.pivot(), &[1, 2, 0]);
///
/// let x = lu.solver().solve(&DynVector::from_slice(&[1.0, 0.0, 0.0])).unwrap();
/// assert!((x[0] + 40.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    lu: DynMatrix<T>,
    pivot: Vec<usize>,
    even: bool,
    singular: bool,
    threshold: Option<f64>,
    cached_l: OnceLock<DynMatrix<T>>,
    cached_u: OnceLock<DynMatrix<T>>,
    cached_p: OnceLock<DynMatrix<T>>,
}

impl<T: LinalgScalar> LuDecomposition<T> {
    /// Decompose with [`DEFAULT_SINGULARITY_THRESHOLD`].
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Result<Self, LinalgError> {
        Self::with_threshold(a, cast(DEFAULT_SINGULARITY_THRESHOLD))
    }

    /// Decompose, treating any pivot with modulus below `threshold` as zero.
    pub fn with_threshold(
        a: &(impl MatrixRef<T> + ?Sized),
        threshold: T::Real,
    ) -> Result<Self, LinalgError> {
        Self::with_policy(a, &LargestModulus { threshold }, threshold.to_f64())
    }
}

impl<T: Scalar> LuDecomposition<T> {
    pub(crate) fn with_policy(
        a: &(impl MatrixRef<T> + ?Sized),
        policy: &impl PivotPolicy<T>,
        threshold: Option<f64>,
    ) -> Result<Self, LinalgError> {
        if a.nrows() != a.ncols() {
            return Err(LinalgError::NonSquareMatrix {
                rows: a.nrows(),
                cols: a.ncols(),
            });
        }
        let mut lu = DynMatrix::from_matrix_ref(a);
        let Elimination {
            pivot,
            even,
            singular,
        } = eliminate(&mut lu, policy);
        Ok(Self {
            lu,
            pivot,
            even,
            singular,
            threshold,
            cached_l: OnceLock::new(),
            cached_u: OnceLock::new(),
            cached_p: OnceLock::new(),
        })
    }

    /// Dimension of the decomposed matrix.
    #[inline]
    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Unit lower-triangular factor, or `None` if singular.
    pub fn l(&self) -> Option<&DynMatrix<T>> {
        if self.singular {
            return None;
        }
        Some(self.cached_l.get_or_init(|| {
            trace!(n = self.dim(), "caching LU factor L");
            let n = self.dim();
            DynMatrix::from_fn(n, n, |i, j| match i.cmp(&j) {
                std::cmp::Ordering::Greater => self.lu[(i, j)],
                std::cmp::Ordering::Equal => T::one(),
                std::cmp::Ordering::Less => T::zero(),
            })
        }))
    }

    /// Upper-triangular factor, or `None` if singular.
    pub fn u(&self) -> Option<&DynMatrix<T>> {
        if self.singular {
            return None;
        }
        Some(self.cached_u.get_or_init(|| {
            trace!(n = self.dim(), "caching LU factor U");
            let n = self.dim();
            DynMatrix::from_fn(n, n, |i, j| if i <= j { self.lu[(i, j)] } else { T::zero() })
        }))
    }

    /// Row permutation matrix with `P[i][pivot[i]] == 1`, or `None` if singular.
    pub fn p(&self) -> Option<&DynMatrix<T>> {
        if self.singular {
            return None;
        }
        Some(self.cached_p.get_or_init(|| {
            trace!(n = self.dim(), "caching LU permutation P");
            let n = self.dim();
            DynMatrix::from_fn(n, n, |i, j| if self.pivot[i] == j { T::one() } else { T::zero() })
        }))
    }

    /// Pivot array: row `i` of `P·A` is row `pivot[i]` of `A`.
    pub fn pivot(&self) -> &[usize] {
        &self.pivot
    }

    /// Whether the elimination hit an unacceptable pivot.
    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// Absolute pivot threshold, `None` for field decompositions.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Determinant, exactly zero when singular.
    pub fn det(&self) -> T {
        if self.singular {
            return T::zero();
        }
        let sign = if self.even { T::one() } else { T::zero() - T::one() };
        (0..self.dim()).fold(sign, |d, i| d * self.lu[(i, i)])
    }

    /// A solver sharing this decomposition's factors.
    pub fn solver(&self) -> LuSolver<T> {
        LuSolver {
            lu: self.lu.clone(),
            pivot: self.pivot.clone(),
            singular: self.singular,
        }
    }

    /// Consume the decomposition into its solver.
    pub fn into_solver(self) -> LuSolver<T> {
        LuSolver {
            lu: self.lu,
            pivot: self.pivot,
            singular: self.singular,
        }
    }
}

// ── LuSolver ────────────────────────────────────────────────────────

/// Solver for `A·X = B` from an LU decomposition. Exact: never returns an
/// approximate answer for a singular matrix.
#[derive(Debug, Clone)]
pub struct LuSolver<T> {
    lu: DynMatrix<T>,
    pivot: Vec<usize>,
    singular: bool,
}

impl<T: Scalar> DecompositionSolver<T> for LuSolver<T> {
    fn is_non_singular(&self) -> bool {
        !self.singular
    }

    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError> {
        let n = self.pivot.len();
        check_rows(b, n)?;
        if self.singular {
            return Err(LinalgError::Singular);
        }
        let k = b.ncols();

        // P·b
        let mut x = DynMatrix::from_fn(n, k, |i, j| *b.get(self.pivot[i], j));

        // L·y = P·b
        for col in 0..n {
            for i in (col + 1)..n {
                let l = self.lu[(i, col)];
                if l == T::zero() {
                    continue;
                }
                for j in 0..k {
                    x[(i, j)] = x[(i, j)] - x[(col, j)] * l;
                }
            }
        }

        // U·x = y
        for col in (0..n).rev() {
            let d = self.lu[(col, col)];
            for j in 0..k {
                x[(col, j)] = x[(col, j)] / d;
            }
            for i in 0..col {
                let u = self.lu[(i, col)];
                for j in 0..k {
                    x[(i, j)] = x[(i, j)] - x[(col, j)] * u;
                }
            }
        }

        Ok(x)
    }

    fn nrows(&self) -> usize {
        self.pivot.len()
    }

    fn ncols(&self) -> usize {
        self.pivot.len()
    }
}

// ── LuDecomposer ────────────────────────────────────────────────────

/// [`MatrixDecomposer`] producing [`LuSolver`]s with a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuDecomposer {
    threshold: f64,
}

impl LuDecomposer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for LuDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_SINGULARITY_THRESHOLD)
    }
}

impl<T: LinalgScalar + 'static> MatrixDecomposer<T> for LuDecomposer {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(threshold = self.threshold, "decomposing with LU");
        let lu = LuDecomposition::with_threshold(a, cast(self.threshold))?;
        Ok(Box::new(lu.into_solver()))
    }
}
