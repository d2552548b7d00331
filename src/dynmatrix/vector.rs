use std::ops::{Index, IndexMut};

use crate::traits::{MatrixMut, MatrixRef, Scalar};

use super::DynMatrix;

/// Dynamically-sized column vector (wraps an `N x 1` `DynMatrix`).
///
/// Right-hand sides and solutions of the decomposition solvers use this
/// type. As a [`MatrixRef`] it reads as a single column.
///
/// # Examples
///
/// ```
/// use lindecomp::DynVector;
///
/// let v = DynVector::from_slice(&[1.0_f64, 2.0, 3.0]);
/// assert_eq!(v[0], 1.0);
/// assert_eq!(v.len(), 3);
/// assert!((v.dot(&v) - 14.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynVector<T> {
    pub(crate) inner: DynMatrix<T>,
}

impl<T: Scalar> DynVector<T> {
    /// Create a vector from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            inner: DynMatrix::from_rows(data.len(), 1, data),
        }
    }

    /// Create a vector from an owned `Vec`.
    ///
    /// ```
    /// use lindecomp::DynVector;
    /// let v = DynVector::from_vec(vec![1.0, 2.0, 3.0]);
    /// assert_eq!(v[2], 3.0);
    /// ```
    pub fn from_vec(data: Vec<T>) -> Self {
        let n = data.len();
        Self {
            inner: DynMatrix::from_vec(n, 1, data),
        }
    }

    /// Zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            inner: DynMatrix::zeros(n, 1),
        }
    }

    /// Dot product.
    ///
    /// Panics if the lengths differ.
    pub fn dot(&self, rhs: &Self) -> T {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        self.as_slice()
            .iter()
            .zip(rhs.as_slice())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    /// Copy column `j` of a matrix into a vector.
    pub(crate) fn from_column(m: &(impl MatrixRef<T> + ?Sized), j: usize) -> Self {
        Self::from_vec((0..m.nrows()).map(|i| *m.get(i, j)).collect())
    }
}

impl<T> DynVector<T> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    /// Whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the vector data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    /// View the vector data as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.inner.data
    }

    /// Consume the vector, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.inner.data
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<usize> for DynVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.inner.data[i]
    }
}

impl<T> IndexMut<usize> for DynVector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.inner.data[i]
    }
}

// ── MatrixRef / MatrixMut ───────────────────────────────────────────

impl<T> MatrixRef<T> for DynVector<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        1
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        self.inner.get(row, col)
    }
}

impl<T> MatrixMut<T> for DynVector<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        self.inner.get_mut(row, col)
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl<T> From<DynVector<T>> for DynMatrix<T> {
    /// An `N x 1` column matrix.
    fn from(v: DynVector<T>) -> Self {
        v.inner
    }
}

impl<T> From<Vec<T>> for DynVector<T> {
    fn from(data: Vec<T>) -> Self {
        let n = data.len();
        Self {
            inner: DynMatrix {
                data,
                nrows: n,
                ncols: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice() {
        let v = DynVector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(v.len(), 3);
        assert_eq!(v[1], 2.0);
        assert!(!v.is_empty());
    }

    #[test]
    fn zeros() {
        let v = DynVector::<f64>::zeros(4);
        assert_eq!(v.len(), 4);
        assert!(v.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn index_mut() {
        let mut v = DynVector::from_slice(&[1.0, 2.0]);
        v[0] = 10.0;
        assert_eq!(v[0], 10.0);
    }

    #[test]
    fn dot_product() {
        let a = DynVector::from_slice(&[1.0, 2.0, 3.0]);
        let b = DynVector::from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(a.dot(&b), 32.0);
    }

    #[test]
    fn reads_as_column() {
        let v = DynVector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(MatrixRef::nrows(&v), 3);
        assert_eq!(MatrixRef::ncols(&v), 1);
        assert_eq!(*v.get(2, 0), 3.0);

        let m: DynMatrix<f64> = v.into();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 1);
    }

    #[test]
    fn column_of_matrix() {
        let m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let c = DynVector::from_column(&m, 1);
        assert_eq!(c.as_slice(), &[2.0, 4.0]);
    }
}
