use lindecomp::linalg::{DecompositionSolver, QrDecomposition, RrqrDecomposition, SvdDecomposition};
use lindecomp::DynMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-10;

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DynMatrix<f64> {
    let data = (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect();
    DynMatrix::from_vec(rows, cols, data)
}

fn assert_near(a: &DynMatrix<f64>, b: &DynMatrix<f64>, tol: f64, msg: &str) {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()), "{}: shape", msg);
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            assert!(
                (a[(i, j)] - b[(i, j)]).abs() < tol,
                "{}: ({}, {}) {} vs {}",
                msg,
                i,
                j,
                a[(i, j)],
                b[(i, j)]
            );
        }
    }
}

const SHAPES: [(usize, usize); 6] = [(1, 1), (4, 4), (6, 3), (3, 6), (7, 2), (5, 5)];

#[test]
fn random_qr_identities() {
    let mut rng = StdRng::seed_from_u64(42);
    for (m, n) in SHAPES {
        let a = random_matrix(&mut rng, m, n);
        let qr = QrDecomposition::new(&a);
        let (q, r, h) = (qr.q(), qr.r(), qr.h());

        assert_near(&(q * r), &a, TOL, "A = Q·R");
        assert_near(&q.transpose_mul(q), &DynMatrix::eye(m), TOL, "QᵀQ = I");
        assert_eq!(qr.qt(), &q.transpose());
        for i in 0..m {
            for j in 0..n {
                if i > j {
                    assert_eq!(r[(i, j)], 0.0, "R below diagonal");
                }
                if j > i {
                    assert_eq!(h[(i, j)], 0.0, "H above diagonal");
                }
            }
        }
    }
}

#[test]
fn random_rrqr_identities() {
    let mut rng = StdRng::seed_from_u64(43);
    for (m, n) in SHAPES {
        let a = random_matrix(&mut rng, m, n);
        let rrqr = RrqrDecomposition::new(&a);
        let p = rrqr.p();
        assert_near(&(&a * p), &(rrqr.q() * rrqr.r()), TOL, "A·P = Q·R");
        assert_near(&p.mul_transpose(p), &DynMatrix::eye(n), 1e-15, "P·Pᵀ = I");

        let r = rrqr.r();
        for k in 1..m.min(n) {
            assert!(r[(k - 1, k - 1)].abs() >= r[(k, k)].abs() - 1e-12);
        }
        assert_eq!(rrqr.rank(1e-10), m.min(n));
    }
}

#[test]
fn rrqr_reveals_rank_of_low_rank_product() {
    let mut rng = StdRng::seed_from_u64(5);
    let left = random_matrix(&mut rng, 6, 2);
    let right = random_matrix(&mut rng, 2, 5);
    let a = &left * &right;
    assert_eq!(RrqrDecomposition::new(&a).rank(1e-10), 2);
}

#[test]
fn least_squares_agrees_with_svd() {
    let mut rng = StdRng::seed_from_u64(9);
    let a = random_matrix(&mut rng, 8, 3);
    let b = random_matrix(&mut rng, 8, 2);

    let x_qr = QrDecomposition::new(&a).solver().solve_matrix(&b).unwrap();
    let x_svd = SvdDecomposition::new(&a).unwrap().solver().solve_matrix(&b).unwrap();
    assert_near(&x_qr, &x_svd, TOL, "QR vs SVD");

    // the residual is orthogonal to the column space
    let residual = &(&a * &x_qr) - &b;
    assert_near(&a.transpose_mul(&residual), &DynMatrix::zeros(3, 2), TOL, "Aᵀ·r = 0");
}

#[test]
fn underdetermined_trailing_rows_are_zero() {
    let mut rng = StdRng::seed_from_u64(21);
    let a = random_matrix(&mut rng, 2, 5);
    let b = random_matrix(&mut rng, 2, 3);
    let x = QrDecomposition::new(&a).solver().solve_matrix(&b).unwrap();
    assert_eq!((x.nrows(), x.ncols()), (5, 3));
    for i in 2..5 {
        for j in 0..3 {
            assert_eq!(x[(i, j)], 0.0);
        }
    }
    assert_near(&(&a * &x), &b, TOL, "A·X = B");
}
