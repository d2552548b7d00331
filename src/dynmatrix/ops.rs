use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::traits::Scalar;

use super::{DynMatrix, DynVector};

// ── Element-wise addition / subtraction ─────────────────────────────

fn zip_with<T: Scalar>(
    lhs: &DynMatrix<T>,
    rhs: &DynMatrix<T>,
    sym: &str,
    f: impl Fn(T, T) -> T,
) -> DynMatrix<T> {
    assert_eq!(
        (lhs.nrows, lhs.ncols),
        (rhs.nrows, rhs.ncols),
        "dimension mismatch: {}x{} {} {}x{}",
        lhs.nrows,
        lhs.ncols,
        sym,
        rhs.nrows,
        rhs.ncols,
    );
    let data = lhs
        .data
        .iter()
        .zip(rhs.data.iter())
        .map(|(&a, &b)| f(a, b))
        .collect();
    DynMatrix {
        data,
        nrows: lhs.nrows,
        ncols: lhs.ncols,
    }
}

macro_rules! impl_elementwise {
    ($trait:ident, $method:ident, $assign:ident, $assign_method:ident, $sym:literal, $op:tt) => {
        impl<T: Scalar> $trait<&DynMatrix<T>> for &DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
                zip_with(self, rhs, $sym, |a, b| a $op b)
            }
        }

        impl<T: Scalar> $trait<DynMatrix<T>> for &DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
                self $op &rhs
            }
        }

        impl<T: Scalar> $trait<&DynMatrix<T>> for DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
                &self $op rhs
            }
        }

        impl<T: Scalar> $trait for DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
                &self $op &rhs
            }
        }

        impl<T: Scalar> $assign<&DynMatrix<T>> for DynMatrix<T> {
            fn $assign_method(&mut self, rhs: &DynMatrix<T>) {
                assert_eq!(
                    (self.nrows, self.ncols),
                    (rhs.nrows, rhs.ncols),
                    "dimension mismatch: {}x{} {}= {}x{}",
                    self.nrows,
                    self.ncols,
                    $sym,
                    rhs.nrows,
                    rhs.ncols,
                );
                for (a, &b) in self.data.iter_mut().zip(rhs.data.iter()) {
                    *a = *a $op b;
                }
            }
        }
    };
}

impl_elementwise!(Add, add, AddAssign, add_assign, "+", +);
impl_elementwise!(Sub, sub, SubAssign, sub_assign, "-", -);

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar> Neg for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn neg(self) -> DynMatrix<T> {
        DynMatrix {
            data: self.data.iter().map(|&x| T::zero() - x).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Neg for DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn neg(self) -> DynMatrix<T> {
        -&self
    }
}

// ── Matrix multiply ─────────────────────────────────────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = DynMatrix::zeros(self.nrows, rhs.ncols);
        for i in 0..self.nrows {
            let a_row = self.row_slice(i);
            let out_row = out.row_slice_mut(i);
            for (k, &a) in a_row.iter().enumerate() {
                if a == T::zero() {
                    continue;
                }
                for (o, &b) in out_row.iter_mut().zip(rhs.row_slice(k)) {
                    *o = *o + a * b;
                }
            }
        }
        out
    }
}

impl<T: Scalar> Mul<DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;
    fn mul(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
        self * &rhs
    }
}

impl<T: Scalar> Mul<&DynMatrix<T>> for DynMatrix<T> {
    type Output = DynMatrix<T>;
    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        &self * rhs
    }
}

impl<T: Scalar> Mul for DynMatrix<T> {
    type Output = DynMatrix<T>;
    fn mul(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
        &self * &rhs
    }
}

// ── Matrix * vector ─────────────────────────────────────────────────

impl<T: Scalar> Mul<&DynVector<T>> for &DynMatrix<T> {
    type Output = DynVector<T>;

    fn mul(self, rhs: &DynVector<T>) -> DynVector<T> {
        assert_eq!(
            self.ncols,
            rhs.len(),
            "dimension mismatch: {}x{} * vector of length {}",
            self.nrows,
            self.ncols,
            rhs.len(),
        );
        let data = (0..self.nrows)
            .map(|i| {
                self.row_slice(i)
                    .iter()
                    .zip(rhs.as_slice())
                    .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
            })
            .collect();
        DynVector::from_vec(data)
    }
}

impl<T: Scalar> Mul<&DynVector<T>> for DynMatrix<T> {
    type Output = DynVector<T>;
    fn mul(self, rhs: &DynVector<T>) -> DynVector<T> {
        &self * rhs
    }
}

// ── Scalar multiply ─────────────────────────────────────────────────

impl<T: Scalar> Mul<T> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: T) -> DynMatrix<T> {
        DynMatrix {
            data: self.data.iter().map(|&x| x * rhs).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Mul<T> for DynMatrix<T> {
    type Output = DynMatrix<T>;
    fn mul(mut self, rhs: T) -> DynMatrix<T> {
        self *= rhs;
        self
    }
}

impl<T: Scalar> MulAssign<T> for DynMatrix<T> {
    fn mul_assign(&mut self, rhs: T) {
        for x in &mut self.data {
            *x = *x * rhs;
        }
    }
}
