//! # lindecomp
//!
//! Dense matrix decompositions with a uniform solver contract. Every
//! decomposition factors its input once and hands out a solver for
//! `A·X = B`; exact fields (rationals, or any type implementing [`Field`])
//! get their own LU.
//!
//! ## Quick start
//!
//! ```
//! use lindecomp::{DynMatrix, DynVector};
//! use lindecomp::linalg::{DecompositionSolver, LuDecomposition};
//!
//! let a = DynMatrix::from_rows(3, 3, &[
//!     2.0_f64, 1.0, -1.0,
//!     -3.0, -1.0, 2.0,
//!     -2.0, 1.0, 2.0,
//! ]);
//! let b = DynVector::from_slice(&[8.0, -11.0, -3.0]);
//! let x = LuDecomposition::new(&a).unwrap().solver().solve(&b).unwrap();
//! assert!((x[0] - 2.0).abs() < 1e-12);
//! assert!((x[1] - 3.0).abs() < 1e-12);
//! assert!((x[2] + 1.0).abs() < 1e-12);
//! ```
//!
//! ## Modules
//!
//! - [`dynmatrix`]: Heap-allocated `DynMatrix<T>` with runtime dimensions
//!   and row-major `Vec<T>` storage, plus the [`DynVector<T>`] column
//!   vector. Convenience methods `a.lu()`, `a.qr()`, `a.svd()`,
//!   `a.solve(&b)`, `a.inverse()`, `a.det()` and `a.rank()`.
//!
//! - [`linalg`]: LU (partial pivoting, plus an exact variant over any
//!   [`Field`]), Householder QR, rank-revealing QR, Cholesky, pivoted
//!   rectangular Cholesky and SVD. Each decomposition produces a
//!   [`DecompositionSolver`](linalg::DecompositionSolver); the
//!   [`MatrixDecomposer`](linalg::MatrixDecomposer) structs go straight from
//!   a matrix to a boxed solver.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`Field`]: exact or non-ordered elements, with a pivot-ranking magnitude
//!   - [`LinalgScalar`]: real floats and complex numbers
//!   - [`FloatScalar`]: real floats, used by QR, Cholesky and SVD
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access; every
//!     decomposition accepts any `MatrixRef`
//!
//! ## Cargo features
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `complex`  | no      | `Complex<f32>` / `Complex<f64>` elements via `num-complex` |
//! | `rational` | no      | `Ratio<i32>` / `Ratio<i64>` field elements via `num-rational` |
//! | `all`      | no      | Both of the above |
//!
//! ## Logging
//!
//! Singular pivots, rank deficiency and convergence problems are reported
//! through `tracing` at `debug`/`warn` level; cache fills and dispatch at
//! `trace`. The crate never installs a subscriber.

pub mod dynmatrix;
pub mod linalg;
pub mod traits;

pub use dynmatrix::{DynMatrix, DynVector};
pub use linalg::LinalgError;
pub use traits::{Field, FloatScalar, LinalgScalar, MatrixMut, MatrixRef, Scalar};

#[cfg(feature = "complex")]
pub use num_complex::Complex;

#[cfg(feature = "rational")]
pub use num_rational::Ratio;
