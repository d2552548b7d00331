//! Dense matrix decompositions and the solvers built on them.
//!
//! Every decomposition copies its input, factors it eagerly, and derives the
//! remaining matrices (Q, Lᵀ, P, ...) lazily on first access. Each one hands
//! out a [`DecompositionSolver`] that owns the factor data it needs, and a
//! matching [`MatrixDecomposer`] goes straight from a matrix to a boxed solver.
//!
//! | Decomposition | Input | Solver behaviour on rank deficiency |
//! |---------------|-------|-------------------------------------|
//! | [`LuDecomposition`] | square | `Singular` |
//! | [`QrDecomposition`] | any | `Singular` |
//! | [`RrqrDecomposition`] | any | `Singular` |
//! | [`CholeskyDecomposition`] | symmetric positive definite | never singular |
//! | [`SvdDecomposition`] | any | least squares |

pub(crate) mod cholesky;
pub(crate) mod field_lu;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod rectangular_cholesky;
pub(crate) mod rrqr;
pub(crate) mod solver;
pub(crate) mod svd;

pub use cholesky::{
    CholeskyDecomposer, CholeskyDecomposition, CholeskySolver,
    DEFAULT_ABSOLUTE_POSITIVITY_THRESHOLD, DEFAULT_RELATIVE_SYMMETRY_THRESHOLD,
};
pub use field_lu::FieldLuDecomposer;
pub use lu::{LuDecomposer, LuDecomposition, LuSolver, DEFAULT_SINGULARITY_THRESHOLD};
pub use qr::{QrDecomposer, QrDecomposition, QrSolver, DEFAULT_QR_THRESHOLD};
pub use rectangular_cholesky::RectangularCholeskyDecomposition;
pub use rrqr::{RrqrDecomposer, RrqrDecomposition, RrqrSolver};
pub use solver::{DecompositionSolver, MatrixDecomposer};
pub use svd::{SvdDecomposer, SvdDecomposition, SvdSolver};

use thiserror::Error;

/// Errors from decompositions and solvers.
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::{CholeskyDecomposition, LinalgError, LuDecomposition};
///
/// let rect = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(
///     LuDecomposition::new(&rect).unwrap_err(),
///     LinalgError::NonSquareMatrix { rows: 2, cols: 3 }
/// );
///
/// let not_pd = DynMatrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(
///     CholeskyDecomposition::new(&not_pd).unwrap_err(),
///     LinalgError::NotPositiveDefinite
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LinalgError {
    /// The decomposition needs a square matrix.
    #[error("matrix is not square: {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    /// A right-hand side (or other operand) has the wrong number of rows.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Matrix is singular (or rank deficient) within the decomposition threshold.
    #[error("matrix is singular")]
    Singular,
    /// Matrix is not positive definite.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    /// Matrix is not symmetric within the relative threshold.
    #[error("matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },
    /// Input rows are empty or ragged.
    #[error("invalid matrix: {reason}")]
    InvalidMatrix { reason: &'static str },
    /// Iterative algorithm did not converge within the iteration budget.
    #[error("iterative algorithm did not converge")]
    ConvergenceFailure,
    /// No singular value reaches the requested covariance cutoff.
    #[error("cutoff singular value {cutoff} is larger than the largest singular value {largest}")]
    CutoffTooLarge { cutoff: f64, largest: f64 },
}

/// Check that `b` has `expected` rows.
pub(crate) fn check_rows<T>(
    b: &(impl crate::traits::MatrixRef<T> + ?Sized),
    expected: usize,
) -> Result<(), LinalgError> {
    if b.nrows() != expected {
        return Err(LinalgError::DimensionMismatch {
            expected,
            got: b.nrows(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            LinalgError::NonSquareMatrix { rows: 2, cols: 3 }.to_string(),
            "matrix is not square: 2x3"
        );
        assert_eq!(
            LinalgError::DimensionMismatch { expected: 3, got: 2 }.to_string(),
            "dimension mismatch: expected 3, got 2"
        );
        assert_eq!(
            LinalgError::NotSymmetric { row: 0, col: 1 }.to_string(),
            "matrix is not symmetric at (0, 1)"
        );
        assert_eq!(
            LinalgError::CutoffTooLarge { cutoff: 20.0, largest: 16.0 }.to_string(),
            "cutoff singular value 20 is larger than the largest singular value 16"
        );
    }

    #[test]
    fn errors_are_std_errors() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&LinalgError::Singular);
    }
}
