use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::LinalgError;
use crate::traits::{MatrixRef, Scalar};

/// Solves `A·X = B` from a finished decomposition of `A`.
///
/// Implemented by [`LuSolver`](super::LuSolver), [`QrSolver`](super::QrSolver),
/// [`RrqrSolver`](super::RrqrSolver), [`CholeskySolver`](super::CholeskySolver)
/// and [`SvdSolver`](super::SvdSolver). Each owns a copy of the factor data,
/// so it outlives the decomposition that produced it. The trait is object
/// safe:
///
/// ```
/// use lindecomp::{DynMatrix, DynVector};
/// use lindecomp::linalg::{DecompositionSolver, LuDecomposition, QrDecomposition};
///
/// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 1.0, 2.0, 3.0]);
/// let solvers: Vec<Box<dyn DecompositionSolver<f64>>> = vec![
///     Box::new(LuDecomposition::new(&a).unwrap().into_solver()),
///     Box::new(QrDecomposition::new(&a).into_solver()),
/// ];
/// let b = DynVector::from_slice(&[1.0, 2.0]);
/// for s in &solvers {
///     let x = s.solve(&b).unwrap();
///     assert!((x[0] - 0.1).abs() < 1e-12);
///     assert!((x[1] - 0.6).abs() < 1e-12);
/// }
/// ```
pub trait DecompositionSolver<T: Scalar> {
    /// Whether the decomposed matrix is invertible within the decomposition's
    /// tolerance.
    fn is_non_singular(&self) -> bool;

    /// Solve for every column of `b` at once.
    ///
    /// `b` must have [`nrows`](Self::nrows) rows; the result has
    /// [`ncols`](Self::ncols) rows.
    fn solve_matrix(&self, b: &dyn MatrixRef<T>) -> Result<DynMatrix<T>, LinalgError>;

    /// Row dimension of the decomposed matrix.
    fn nrows(&self) -> usize;

    /// Column dimension of the decomposed matrix.
    fn ncols(&self) -> usize;

    /// Solve for a single right-hand side.
    fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>, LinalgError> {
        let x = self.solve_matrix(b)?;
        Ok(DynVector::from_column(&x, 0))
    }

    /// Inverse (or pseudo-inverse) of the decomposed matrix: `solve(I)`.
    fn inverse(&self) -> Result<DynMatrix<T>, LinalgError> {
        self.solve_matrix(&DynMatrix::eye(self.nrows()))
    }
}

/// Turns a matrix straight into a solver, carrying the decomposition's
/// configuration (tolerances, pivoting mode).
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::{LuDecomposer, MatrixDecomposer, SvdDecomposer};
///
/// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// let decomposers: [&dyn MatrixDecomposer<f64>; 2] =
///     [&LuDecomposer::default(), &SvdDecomposer::default()];
/// for d in decomposers {
///     let solver = d.decompose(&a).unwrap();
///     assert!(!solver.is_non_singular());
/// }
/// ```
pub trait MatrixDecomposer<T: Scalar> {
    fn decompose(&self, a: &dyn MatrixRef<T>) -> Result<Box<dyn DecompositionSolver<T>>, LinalgError>;
}
