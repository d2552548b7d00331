use core::fmt::Debug;
use num_traits::{Float, Num, NumCast, One, Zero};

#[cfg(feature = "complex")]
use num_complex::Complex;

#[cfg(feature = "rational")]
use num_rational::Ratio;

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, integers, and (behind features) complex numbers
/// and rationals.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point matrix elements.
///
/// Required by the decompositions that need `sqrt` and ordered comparisons
/// (QR, Cholesky, SVD). Implies `LinalgScalar<Real = Self>` since real floats
/// are their own real type.
pub trait FloatScalar: Scalar + Float + LinalgScalar<Real = Self> {}

impl<T: Scalar + Float + LinalgScalar<Real = T>> FloatScalar for T {}

/// Convert an `f64` constant into a float type (NaN if unrepresentable).
#[inline]
pub(crate) fn cast<R: FloatScalar>(x: f64) -> R {
    <R as NumCast>::from(x).unwrap_or_else(R::nan)
}

/// Trait for matrix elements that support floating-point linear algebra.
///
/// Covers both real floats (`f32`, `f64`) and complex numbers (`Complex<f32>`,
/// `Complex<f64>`). Used by the magnitude-pivoted LU and Householder QR.
pub trait LinalgScalar: Scalar {
    /// The real component type (`Self` for reals, `T` for `Complex<T>`).
    type Real: FloatScalar;

    /// Absolute value / modulus: `|z|` for complex, `.abs()` for real.
    fn modulus(self) -> Self::Real;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Machine epsilon of the underlying real type.
    fn lepsilon() -> Self::Real;

    /// Promote a real value into `Self`.
    fn from_real(r: Self::Real) -> Self;
}

macro_rules! impl_linalg_scalar_real {
    ($($t:ty),*) => {
        $(
            impl LinalgScalar for $t {
                type Real = $t;

                #[inline] fn modulus(self) -> $t { Float::abs(self) }
                #[inline] fn conj(self) -> $t { self }
                #[inline] fn re(self) -> $t { self }
                #[inline] fn lepsilon() -> $t { <$t as Float>::epsilon() }
                #[inline] fn from_real(r: $t) -> $t { r }
            }
        )*
    };
}

impl_linalg_scalar_real!(f32, f64);

#[cfg(feature = "complex")]
impl<T: FloatScalar> LinalgScalar for Complex<T> {
    type Real = T;

    #[inline]
    fn modulus(self) -> T {
        self.norm()
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn lepsilon() -> T {
        T::epsilon()
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }
}

/// Abstract field element for exact (or at least non-ordered) arithmetic.
///
/// Elimination over a field only needs the `Scalar` operations and a zero
/// test. `magnitude` ranks pivot candidates when numeric pivoting is enabled;
/// it never decides singularity.
///
/// ```
/// use lindecomp::traits::Field;
/// assert_eq!((-2.5_f64).magnitude(), 2.5);
/// ```
pub trait Field: Scalar {
    /// Non-negative size of the element, used only to order pivot candidates.
    fn magnitude(self) -> f64;
}

impl Field for f64 {
    #[inline]
    fn magnitude(self) -> f64 {
        self.abs()
    }
}

impl Field for f32 {
    #[inline]
    fn magnitude(self) -> f64 {
        <f64 as From<f32>>::from(self.abs())
    }
}

#[cfg(feature = "complex")]
impl Field for Complex<f64> {
    #[inline]
    fn magnitude(self) -> f64 {
        self.norm()
    }
}

#[cfg(feature = "complex")]
impl Field for Complex<f32> {
    #[inline]
    fn magnitude(self) -> f64 {
        <f64 as From<f32>>::from(self.norm())
    }
}

#[cfg(feature = "rational")]
macro_rules! impl_field_ratio {
    ($($t:ty),*) => {
        $(
            impl Field for Ratio<$t> {
                #[inline]
                fn magnitude(self) -> f64 {
                    (*self.numer() as f64 / *self.denom() as f64).abs()
                }
            }
        )*
    };
}

#[cfg(feature = "rational")]
impl_field_ratio!(i32, i64);

/// Read-only access to a matrix-like type.
///
/// Decompositions only ever read their input through this trait, so any
/// storage layout (dense, blocked, map-backed) can be factored.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling the in-place
/// kernels to work generically.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;

    /// Swap two whole rows.
    fn swap_rows(&mut self, a: usize, b: usize)
    where
        T: Copy,
    {
        if a == b {
            return;
        }
        for j in 0..self.ncols() {
            let tmp = *self.get(a, j);
            *self.get_mut(a, j) = *self.get(b, j);
            *self.get_mut(b, j) = tmp;
        }
    }
}
