use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lindecomp::linalg::{
    CholeskyDecomposition, DecompositionSolver, LuDecomposition, QrDecomposition,
    RrqrDecomposition, SvdDecomposition,
};
use lindecomp::{DynMatrix, DynVector};

const SIZES: [usize; 3] = [8, 32, 64];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn general(n: usize) -> DynMatrix<f64> {
    DynMatrix::from_fn(n, n, |i, j| ((i * 7 + j * 13) % 17) as f64 + if i == j { n as f64 } else { 0.0 })
}

fn spd(n: usize) -> DynMatrix<f64> {
    let a = DynMatrix::from_fn(n, n, |i, j| ((i + 1) * (j + 1)) as f64 / n as f64 + if i == j { 10.0 } else { 0.0 });
    a.mul_transpose(&a)
}

// ---------------------------------------------------------------------------
// Factorizations
// ---------------------------------------------------------------------------

fn lu(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| LuDecomposition::new(std::hint::black_box(a)))
        });
    }
    g.finish();
}

fn qr(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| QrDecomposition::new(std::hint::black_box(a)).solver())
        });
    }
    g.finish();
}

fn rrqr(c: &mut Criterion) {
    let mut g = c.benchmark_group("rrqr");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| RrqrDecomposition::new(std::hint::black_box(a)).rank(1e-10))
        });
    }
    g.finish();
}

fn cholesky(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky");
    for n in SIZES {
        let a = spd(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| CholeskyDecomposition::new(std::hint::black_box(a)))
        });
    }
    g.finish();
}

fn svd(c: &mut Criterion) {
    let mut g = c.benchmark_group("svd");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| SvdDecomposition::new(std::hint::black_box(a)))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Solves against a prepared factorization
// ---------------------------------------------------------------------------

fn solve_64(c: &mut Criterion) {
    let n = 64;
    let a = spd(n);
    let rhs = DynVector::from_vec((0..n).map(|i| i as f64).collect());
    let mut g = c.benchmark_group("solve_64");

    let lu = LuDecomposition::new(&a).unwrap().into_solver();
    g.bench_function("lu", |b| b.iter(|| lu.solve(std::hint::black_box(&rhs))));

    let chol = CholeskyDecomposition::new(&a).unwrap().into_solver();
    g.bench_function("cholesky", |b| b.iter(|| chol.solve(std::hint::black_box(&rhs))));

    let qr = QrDecomposition::new(&a).into_solver();
    g.bench_function("qr", |b| b.iter(|| qr.solve(std::hint::black_box(&rhs))));

    let svd = SvdDecomposition::new(&a).unwrap().into_solver();
    g.bench_function("svd", |b| b.iter(|| svd.solve(std::hint::black_box(&rhs))));

    g.finish();
}

criterion_group!(benches, lu, qr, rrqr, cholesky, svd, solve_64);
criterion_main!(benches);
