//! LU decomposition over exact or non-ordered fields.
//!
//! The elimination is the same as for floats; only the pivot choice and the
//! zero test change. Singularity is decided by a caller-supplied predicate
//! (exact `is_zero` by default), never by a numeric threshold.

use tracing::{debug, trace};

use crate::linalg::lu::{LuDecomposition, PivotPolicy};
use crate::linalg::solver::{DecompositionSolver, MatrixDecomposer};
use crate::linalg::LinalgError;
use crate::traits::{Field, MatrixRef};

/// Largest [`Field::magnitude`] among the candidates; singular when the
/// predicate says the chosen pivot is zero.
struct NumericPivot<F> {
    is_zero: F,
}

impl<T: Field, F: Fn(&T) -> bool> PivotPolicy<T> for NumericPivot<F> {
    fn choose<M: MatrixRef<T>>(&self, lu: &M, col: usize) -> Option<usize> {
        let mut max_row = col;
        let mut largest = f64::NEG_INFINITY;
        for row in col..lu.nrows() {
            let m = lu.get(row, col).magnitude();
            if m > largest {
                largest = m;
                max_row = row;
            }
        }
        if (self.is_zero)(lu.get(max_row, col)) {
            debug!(col, "field LU pivot is zero");
            return None;
        }
        Some(max_row)
    }
}

/// First candidate row the predicate does not consider zero.
struct FirstNonZero<F> {
    is_zero: F,
}

impl<T: Field, F: Fn(&T) -> bool> PivotPolicy<T> for FirstNonZero<F> {
    fn choose<M: MatrixRef<T>>(&self, lu: &M, col: usize) -> Option<usize> {
        let found = (col..lu.nrows()).find(|&row| !(self.is_zero)(lu.get(row, col)));
        if found.is_none() {
            debug!(col, "field LU column has no non-zero pivot");
        }
        found
    }
}

fn exact_zero<T: Field>(x: &T) -> bool {
    x.is_zero()
}

impl<T: Field> LuDecomposition<T> {
    /// Decompose over a field with exact zero test and numeric pivoting.
    ///
    /// ```
    /// # #[cfg(feature = "rational")] {
    /// use lindecomp::DynMatrix;
    /// use lindecomp::linalg::LuDecomposition;
    /// use num_rational::Ratio;
    ///
    /// let r = |n: i64| Ratio::from_integer(n);
    /// let a = DynMatrix::from_rows(2, 2, &[r(1), r(2), r(3), r(4)]);
    /// let lu = LuDecomposition::over_field(&a).unwrap();
    /// assert_eq!(lu.det(), r(-2));
    /// # }
    /// ```
    pub fn over_field(a: &(impl MatrixRef<T> + ?Sized)) -> Result<Self, LinalgError> {
        Self::with_pivoting(a, exact_zero::<T>, true)
    }

    /// Decompose with a custom zero predicate and numeric pivoting.
    pub fn with_zero_checker(
        a: &(impl MatrixRef<T> + ?Sized),
        is_zero: impl Fn(&T) -> bool,
    ) -> Result<Self, LinalgError> {
        Self::with_pivoting(a, is_zero, true)
    }

    /// Decompose with a custom zero predicate.
    ///
    /// With `numeric_pivoting` the candidate of largest magnitude is the
    /// pivot; without it the first candidate the predicate accepts is, which
    /// keeps the rows in their original order as far as possible.
    pub fn with_pivoting(
        a: &(impl MatrixRef<T> + ?Sized),
        is_zero: impl Fn(&T) -> bool,
        numeric_pivoting: bool,
    ) -> Result<Self, LinalgError> {
        if numeric_pivoting {
            Self::with_policy(a, &NumericPivot { is_zero }, None)
        } else {
            Self::with_policy(a, &FirstNonZero { is_zero }, None)
        }
    }
}

// ── FieldLuDecomposer ───────────────────────────────────────────────

/// [`MatrixDecomposer`] for field LU with a fixed zero predicate.
#[derive(Debug, Clone, Copy)]
pub struct FieldLuDecomposer<F> {
    is_zero: F,
    numeric_pivoting: bool,
}

impl<F> FieldLuDecomposer<F> {
    pub fn new(is_zero: F, numeric_pivoting: bool) -> Self {
        Self {
            is_zero,
            numeric_pivoting,
        }
    }
}

impl<T, F> MatrixDecomposer<T> for FieldLuDecomposer<F>
where
    T: Field + 'static,
    F: Fn(&T) -> bool,
{
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError> {
        trace!(numeric = self.numeric_pivoting, "decomposing with field LU");
        let lu = LuDecomposition::with_pivoting(a, &self.is_zero, self.numeric_pivoting)?;
        Ok(Box::new(lu.into_solver()))
    }
}
