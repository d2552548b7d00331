use tracing::debug;

use crate::dynmatrix::DynMatrix;
use crate::linalg::LinalgError;
use crate::traits::{FloatScalar, MatrixRef};

/// Pivoted Cholesky of a positive semidefinite matrix: `A = B·Bᵀ` with `B`
/// of size `n x rank`.
///
/// The largest remaining diagonal element is eliminated first, and the
/// elimination stops once every remaining diagonal element is at or below
/// `small`. The rows of the root follow the original row order, so `B` is
/// generally not triangular.
///
/// ```
/// use lindecomp::DynMatrix;
/// use lindecomp::linalg::RectangularCholeskyDecomposition;
///
/// // rank 2: product of a 3x2 matrix with its transpose
/// let a = DynMatrix::from_rows(3, 3, &[
///     5.0_f64, 11.0, 17.0,
///     11.0, 25.0, 39.0,
///     17.0, 39.0, 61.0,
/// ]);
/// let chol = RectangularCholeskyDecomposition::with_small(&a, 1e-10).unwrap();
/// assert_eq!(chol.rank(), 2);
/// assert_eq!(chol.root().ncols(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RectangularCholeskyDecomposition<T> {
    root: DynMatrix<T>,
    rank: usize,
}

impl<T: FloatScalar> RectangularCholeskyDecomposition<T> {
    /// Decompose, stopping only at non-positive diagonal elements.
    pub fn new(a: &(impl MatrixRef<T> + ?Sized)) -> Result<Self, LinalgError> {
        Self::with_small(a, T::zero())
    }

    /// Decompose, treating diagonal elements at or below `small` as zero.
    pub fn with_small(a: &(impl MatrixRef<T> + ?Sized), small: T) -> Result<Self, LinalgError> {
        let (rows, cols) = (a.nrows(), a.ncols());
        if rows != cols {
            return Err(LinalgError::NonSquareMatrix { rows, cols });
        }
        let order = rows;
        let mut c = DynMatrix::from_matrix_ref(a);
        let mut b = DynMatrix::<T>::zeros(order, order);
        let mut index: Vec<usize> = (0..order).collect();

        let mut r = 0;
        while r < order {
            let mut swap_r = r;
            for i in (r + 1)..order {
                let (ii, is) = (index[i], index[swap_r]);
                if c[(ii, ii)] > c[(is, is)] {
                    swap_r = i;
                }
            }
            if swap_r != r {
                index.swap(r, swap_r);
                b.swap_rows(r, swap_r);
            }

            let ir = index[r];
            if c[(ir, ir)] <= small {
                if r == 0 {
                    debug!(diagonal = ?c[(ir, ir)], "largest diagonal element is not positive");
                    return Err(LinalgError::NotPositiveDefinite);
                }
                if index[r..].iter().any(|&i| c[(i, i)] < -small) {
                    debug!(rank = r, "negative diagonal element left after elimination");
                    return Err(LinalgError::NotPositiveDefinite);
                }
                debug!(rank = r, "remaining diagonal elements are negligible");
                break;
            }

            let pivot = c[(ir, ir)];
            let root = pivot.sqrt();
            b[(r, r)] = root;
            let inverse = T::one() / root;
            let inverse2 = T::one() / pivot;
            for i in (r + 1)..order {
                let ii = index[i];
                let cir = c[(ii, ir)];
                let e = inverse * cir;
                b[(i, r)] = e;
                c[(ii, ii)] = c[(ii, ii)] - cir * cir * inverse2;
                for j in (r + 1)..i {
                    let ij = index[j];
                    let f = c[(ii, ij)] - e * b[(j, r)];
                    c[(ii, ij)] = f;
                    c[(ij, ii)] = f;
                }
            }
            r += 1;
        }

        let rank = r;
        let mut root = DynMatrix::zeros(order, rank);
        for (i, &row) in index.iter().enumerate() {
            root.row_slice_mut(row).copy_from_slice(&b.row_slice(i)[..rank]);
        }
        Ok(Self { root, rank })
    }

    /// The `n x rank` root `B` with `B·Bᵀ = A`.
    pub fn root(&self) -> &DynMatrix<T> {
        &self.root
    }

    /// Numerical rank found by the elimination.
    pub fn rank(&self) -> usize {
        self.rank
    }
}
