use lindecomp::linalg::{
    CholeskyDecomposition, DecompositionSolver, LinalgError, LuDecomposition,
    RectangularCholeskyDecomposition,
};
use lindecomp::DynMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-10;

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DynMatrix<f64> {
    let data = (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect();
    DynMatrix::from_vec(rows, cols, data)
}

/// `BᵀB + n·I`, symmetric positive definite.
fn random_spd(rng: &mut StdRng, n: usize) -> DynMatrix<f64> {
    let b = random_matrix(rng, n, n);
    &b.transpose_mul(&b) + &(DynMatrix::eye(n) * n as f64)
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

#[test]
fn random_spd_factorization() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in 1..=7 {
        let a = random_spd(&mut rng, n);
        let chol = CholeskyDecomposition::new(&a).unwrap();
        let l = chol.l();
        assert_near(&l.mul_transpose(l), &a, TOL, "A = L·Lᵀ");
        for i in 0..n {
            assert!(l[(i, i)] > 0.0);
            for j in (i + 1)..n {
                assert_eq!(l[(i, j)], 0.0);
            }
        }

        let lu_det = LuDecomposition::new(&a).unwrap().det();
        assert!((chol.det() - lu_det).abs() < 1e-9 * lu_det.abs());
        assert!((chol.ln_det() - lu_det.ln()).abs() < 1e-10);

        let inv = chol.solver().inverse().unwrap();
        assert_near(&(&a * &inv), &DynMatrix::eye(n), 1e-9, "A·A⁻¹");
    }
}

#[test]
fn solutions_match_lu() {
    let mut rng = StdRng::seed_from_u64(23);
    let a = random_spd(&mut rng, 6);
    let b = random_matrix(&mut rng, 6, 2);
    let x_chol = CholeskyDecomposition::new(&a).unwrap().into_solver().solve_matrix(&b).unwrap();
    let x_lu = LuDecomposition::new(&a).unwrap().into_solver().solve_matrix(&b).unwrap();
    assert_near(&x_chol, &x_lu, TOL, "Cholesky vs LU");
}

#[test]
fn one_ulp_asymmetry_is_accepted() {
    let mut a = DynMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
    a[(1, 0)] = 2.0 + 4e-16;
    assert!(!a.is_symmetric());
    // the factor is built from the upper triangle
    let chol = CholeskyDecomposition::new(&a).unwrap();
    assert_eq!(chol.l()[(1, 0)], 1.0);
}

#[test]
fn semidefinite_is_rejected_by_strict_cholesky() {
    let mut rng = StdRng::seed_from_u64(29);
    let b = random_matrix(&mut rng, 5, 3);
    let a = b.mul_transpose(&b);
    assert_eq!(
        CholeskyDecomposition::new(&a).unwrap_err(),
        LinalgError::NotPositiveDefinite
    );

    let rect = RectangularCholeskyDecomposition::with_small(&a, 1e-12).unwrap();
    assert_eq!(rect.rank(), 3);
    let root = rect.root();
    assert_eq!((root.nrows(), root.ncols()), (5, 3));
    assert_near(&root.mul_transpose(root), &a, TOL, "root·rootᵀ = A");
}

#[test]
fn rectangular_full_rank_matches_dimension() {
    let mut rng = StdRng::seed_from_u64(31);
    let a = random_spd(&mut rng, 4);
    let rect = RectangularCholeskyDecomposition::new(&a).unwrap();
    assert_eq!(rect.rank(), 4);
    assert_near(&rect.root().mul_transpose(rect.root()), &a, TOL, "root·rootᵀ = A");
}
