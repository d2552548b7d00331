use num_traits::{Float, Zero};

use crate::traits::LinalgScalar;

use super::vector::DynVector;
use super::DynMatrix;

// ── Vector norms ────────────────────────────────────────────────────

impl<T: LinalgScalar> DynVector<T> {
    /// L2 (Euclidean) norm.
    ///
    /// ```
    /// use lindecomp::DynVector;
    /// let v = DynVector::from_slice(&[3.0_f64, 4.0]);
    /// assert!((v.norm() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm(&self) -> T::Real {
        self.inner.frobenius_norm()
    }
}

// ── Matrix norms ────────────────────────────────────────────────────

impl<T: LinalgScalar> DynMatrix<T> {
    /// Frobenius norm (square root of the sum of squared moduli).
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// assert!((m.frobenius_norm() - 30.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T::Real {
        let sum = self
            .data
            .iter()
            .map(|x| x.modulus())
            .fold(<T::Real as Zero>::zero(), |acc, m| acc + m * m);
        Float::sqrt(sum)
    }

    /// One norm (maximum absolute column sum).
    pub fn norm_one(&self) -> T::Real {
        (0..self.ncols)
            .map(|j| {
                (0..self.nrows).fold(<T::Real as Zero>::zero(), |acc, i| acc + self[(i, j)].modulus())
            })
            .fold(<T::Real as Zero>::zero(), Float::max)
    }

    /// Infinity norm (maximum absolute row sum).
    ///
    /// ```
    /// use lindecomp::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[1.0_f64, -2.0, 3.0, 4.0]);
    /// assert!((m.norm_inf() - 7.0).abs() < 1e-12);
    /// assert!((m.norm_one() - 6.0).abs() < 1e-12);
    /// ```
    pub fn norm_inf(&self) -> T::Real {
        (0..self.nrows)
            .map(|i| {
                self.row_slice(i)
                    .iter()
                    .fold(<T::Real as Zero>::zero(), |acc, x| acc + x.modulus())
            })
            .fold(<T::Real as Zero>::zero(), Float::max)
    }

    /// Largest element modulus.
    pub fn max_abs(&self) -> T::Real {
        self.data
            .iter()
            .map(|x| x.modulus())
            .fold(<T::Real as Zero>::zero(), Float::max)
    }
}
