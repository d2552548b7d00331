#![cfg(feature = "complex")]

use lindecomp::linalg::{
    DecompositionSolver, LinalgError, LuDecomposition, MatrixDecomposer, QrDecomposer,
    QrDecomposition,
};
use lindecomp::{DynMatrix, DynVector};
use num_complex::Complex;

type C = Complex<f64>;

fn c(re: f64, im: f64) -> C {
    Complex::new(re, im)
}

const TOL: f64 = 1e-10;

fn assert_complex_near(a: C, b: C, tol: f64, msg: &str) {
    assert!(
        (a.re - b.re).abs() < tol && (a.im - b.im).abs() < tol,
        "{}: {:?} vs {:?}",
        msg,
        a,
        b
    );
}

// ── LU tests ─────────────────────────────────────────────────────────

#[test]
fn complex_lu_solve() {
    let a = DynMatrix::from_rows(2, 2, &[c(2.0, 1.0), c(1.0, -1.0), c(1.0, 0.0), c(3.0, 2.0)]);
    let b = DynVector::from_slice(&[c(5.0, 3.0), c(7.0, 4.0)]);

    let x = a.solve(&b).unwrap();

    let ax = &a * &x;
    for i in 0..2 {
        assert_complex_near(ax[i], b[i], TOL, &format!("row {}", i));
    }
}

#[test]
fn complex_lu_det() {
    let a = DynMatrix::from_rows(2, 2, &[c(1.0, 1.0), c(2.0, 0.0), c(0.0, 1.0), c(1.0, -1.0)]);
    // (1+i)(1-i) - 2i = 2 - 2i
    assert_complex_near(a.det().unwrap(), c(2.0, -2.0), TOL, "det");
    let lu = LuDecomposition::new(&a).unwrap();
    assert_complex_near(lu.det(), c(2.0, -2.0), TOL, "lu det");
}

#[test]
fn complex_lu_inverse() {
    let a = DynMatrix::from_rows(2, 2, &[c(2.0, 1.0), c(1.0, -1.0), c(0.0, 1.0), c(3.0, 0.0)]);
    let id = &a * &a.inverse().unwrap();
    for i in 0..2 {
        for j in 0..2 {
            let expected = if i == j { c(1.0, 0.0) } else { c(0.0, 0.0) };
            assert_complex_near(id[(i, j)], expected, TOL, &format!("id[{},{}]", i, j));
        }
    }
}

#[test]
fn field_lu_skips_signed_zero_pivot() {
    let a = DynMatrix::from_rows(2, 2, &[c(-0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]);
    let lu = LuDecomposition::over_field(&a).unwrap();
    assert!(!lu.is_singular());
    assert_eq!(lu.pivot(), &[1, 0]);

    let x = lu
        .into_solver()
        .solve(&DynVector::from_slice(&[c(2.0, 0.0), c(0.0, 2.0)]))
        .unwrap();
    assert_eq!(x.as_slice(), &[c(0.0, 2.0), c(2.0, 0.0)]);
}

#[test]
fn field_lu_agrees_with_modulus_pivoting() {
    let a = DynMatrix::from_rows(
        3,
        3,
        &[
            c(1.0, 2.0),
            c(0.5, 0.0),
            c(0.0, -1.0),
            c(3.0, -1.0),
            c(2.0, 2.0),
            c(1.0, 0.0),
            c(0.0, 0.5),
            c(-1.0, 1.0),
            c(4.0, 0.0),
        ],
    );
    let float = LuDecomposition::new(&a).unwrap();
    let field = LuDecomposition::over_field(&a).unwrap();
    assert_eq!(float.pivot(), field.pivot());
    assert_complex_near(float.det(), field.det(), TOL, "det");
}

// ── QR tests ─────────────────────────────────────────────────────────

fn assert_matrix_near(a: &DynMatrix<C>, b: &DynMatrix<C>, tol: f64, msg: &str) {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()), "{}: shape", msg);
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            assert_complex_near(a[(i, j)], b[(i, j)], tol, &format!("{}[{},{}]", msg, i, j));
        }
    }
}

fn complex_3x3() -> DynMatrix<C> {
    DynMatrix::from_rows(
        3,
        3,
        &[
            c(1.0, 2.0),
            c(0.5, 0.0),
            c(0.0, -1.0),
            c(3.0, -1.0),
            c(2.0, 2.0),
            c(1.0, 0.0),
            c(0.0, 0.5),
            c(-1.0, 1.0),
            c(4.0, 0.0),
        ],
    )
}

#[test]
fn complex_qr_reconstructs() {
    let a = complex_3x3();
    let qr = a.qr();
    let (q, r) = (qr.q(), qr.r());
    assert_matrix_near(&(q * r), &a, TOL, "QR");
    assert_matrix_near(&(&q.adjoint() * q), &DynMatrix::eye(3), TOL, "QᴴQ");
    assert_matrix_near(qr.qt(), &q.adjoint(), TOL, "Qᴴ");
    for i in 0..3 {
        for j in 0..i {
            assert_eq!(r[(i, j)], c(0.0, 0.0), "R[{},{}]", i, j);
        }
    }
}

#[test]
fn complex_qr_rectangular() {
    let tall = DynMatrix::from_rows(
        3,
        2,
        &[c(1.0, 1.0), c(0.0, 2.0), c(2.0, 0.0), c(1.0, -1.0), c(0.0, -1.0), c(3.0, 0.0)],
    );
    for a in [tall.clone(), tall.transpose()] {
        let qr = QrDecomposition::new(&a);
        let m = a.nrows();
        assert_matrix_near(&(qr.q() * qr.r()), &a, TOL, "QR");
        assert_matrix_near(&(&qr.q().adjoint() * qr.q()), &DynMatrix::eye(m), TOL, "QᴴQ");
    }
}

#[test]
fn complex_qr_solve() {
    let a = DynMatrix::from_rows(2, 2, &[c(2.0, 1.0), c(1.0, -1.0), c(1.0, 0.0), c(3.0, 2.0)]);
    let b = DynVector::from_slice(&[c(5.0, 3.0), c(7.0, 4.0)]);

    let x = a.qr().solver().solve(&b).unwrap();
    let ax = &a * &x;
    for i in 0..2 {
        assert_complex_near(ax[i], b[i], TOL, &format!("row {}", i));
    }
    let lu_x = a.solve(&b).unwrap();
    for i in 0..2 {
        assert_complex_near(x[i], lu_x[i], TOL, &format!("x[{}]", i));
    }
}

#[test]
fn complex_qr_least_squares_through_decomposer() {
    let a = DynMatrix::from_rows(
        3,
        2,
        &[c(1.0, 1.0), c(0.0, 2.0), c(2.0, 0.0), c(1.0, -1.0), c(0.0, -1.0), c(3.0, 0.0)],
    );
    // consistent system: the least-squares solution is exact
    let x_true = DynVector::from_slice(&[c(1.0, -2.0), c(0.5, 1.0)]);
    let b = &a * &x_true;
    let solver = MatrixDecomposer::<C>::decompose(&QrDecomposer::default(), &a).unwrap();
    assert!(solver.is_non_singular());
    let x = solver.solve(&b).unwrap();
    for i in 0..2 {
        assert_complex_near(x[i], x_true[i], TOL, &format!("x[{}]", i));
    }
}

#[test]
fn complex_qr_rank_deficient() {
    // second column is twice the first
    let a = DynMatrix::from_rows(2, 2, &[c(1.0, 1.0), c(2.0, 2.0), c(1.0, 0.0), c(2.0, 0.0)]);
    let qr = QrDecomposition::with_threshold(&a, 1e-12);
    assert!(qr.r()[(1, 1)].norm() < 1e-12);
    let solver = qr.into_solver();
    assert!(!solver.is_non_singular());
    assert_eq!(
        solver.solve(&DynVector::from_slice(&[c(1.0, 0.0), c(0.0, 0.0)])),
        Err(LinalgError::Singular)
    );
}

// ── Norm tests ───────────────────────────────────────────────────────

#[test]
fn complex_vector_norm() {
    // |[3+4i, 0]| = 5
    let v = DynVector::from_slice(&[c(3.0, 4.0), c(0.0, 0.0)]);
    assert!((v.norm() - 5.0).abs() < TOL);
}

#[test]
fn complex_matrix_norms() {
    let a = DynMatrix::from_rows(2, 2, &[c(3.0, 4.0), c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0)]);
    assert!((a.frobenius_norm() - 27.0_f64.sqrt()).abs() < TOL);
    assert!((a.norm_one() - 6.0).abs() < TOL);
    assert!((a.norm_inf() - 5.0).abs() < TOL);
    assert!((a.max_abs() - 5.0).abs() < TOL);
}
