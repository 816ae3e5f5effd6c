//! Direct solves checked against Faer's full-pivoting LU on random systems.

use approx::assert_abs_diff_eq;
use faer::linalg::solvers::SolveCore;
use linalg_core::{Matrix, QrMethod, Solve, build};
use rand::SeedableRng;
use rand::distributions::Uniform;
use rand::rngs::StdRng;

/// Random diagonally dominant `n x n` system and a random right-hand side.
fn random_system(n: usize, seed: u64) -> (Matrix<f64>, Vec<f64>) {
    let b = build::<f64>();
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    let a = b
        .dense_random(n, n, &dist, &mut rng)
        .add(&b.dense_diagonal(n, n, n as f64))
        .unwrap();
    let rhs = b.dense_vector_random(n, &dist, &mut rng).to_vec();
    (a, rhs)
}

fn faer_solve(a: &Matrix<f64>, rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    let m = a.to_faer();
    let factor = faer::linalg::solvers::FullPivLu::new(m.as_ref());
    let mut y = rhs.to_vec();
    let y_mat = faer::MatMut::from_column_major_slice_mut(&mut y, n, 1);
    factor.solve_in_place_with_conj(faer::Conj::No, y_mat);
    y
}

#[test]
fn lu_solve_matches_faer() {
    let b = build::<f64>();
    for (n, seed) in [(4, 1), (10, 2), (25, 3)] {
        let (a, rhs) = random_system(n, seed);
        let x = a.solve(&b.dense_vector_of_slice(&rhs)).unwrap().to_vec();
        let expected = faer_solve(&a, &rhs);
        for i in 0..n {
            assert_abs_diff_eq!(x[i], expected[i], epsilon = 1e-9);
        }
    }
}

#[test]
fn sparse_operands_solve_like_dense_ones() {
    let b = build::<f64>();
    let (a, rhs) = random_system(8, 7);
    let sparse = b.sparse_of_matrix(&a);
    let rhs = b.dense_vector_of_slice(&rhs);
    let x_dense = a.solve(&rhs).unwrap().to_vec();
    let x_sparse = sparse.solve(&rhs).unwrap().to_vec();
    for (d, s) in x_dense.iter().zip(&x_sparse) {
        assert_abs_diff_eq!(*d, *s, epsilon = 1e-12);
    }
}

#[test]
fn qr_and_lu_agree_on_square_systems() {
    let b = build::<f64>();
    let (a, rhs) = random_system(6, 11);
    let rhs = b.dense_vector_of_slice(&rhs);
    let via_lu = a.lu().unwrap().solve(&rhs).unwrap().to_vec();
    let via_qr = a.qr(QrMethod::Full).unwrap().solve(&rhs).unwrap().to_vec();
    for (l, q) in via_lu.iter().zip(&via_qr) {
        assert_abs_diff_eq!(*l, *q, epsilon = 1e-10);
    }
}

#[test]
fn identity_solve_returns_the_input() {
    let b = build::<f64>();
    let x = b.dense_vector_of_slice(&[1.0, 2.0, 3.0]);
    assert_eq!(b.dense_identity(3).solve(&x).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
}
