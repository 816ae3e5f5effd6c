//! Iterative solvers against direct solves, and the stop-criteria controller
//! driven by hand-written solvers.

use approx::assert_abs_diff_eq;
use linalg_core::{
    BiCgStab, ConjugateGradient, DiagonalPreconditioner, DivergenceStopCriterion, FailureStopCriterion,
    Ilu0Preconditioner, IterationCountStopCriterion, IterationStatus, IterationStopCriterion, IterativeSolver,
    Matrix, Preconditioner, ResidualStopCriterion, Result, SolverIterator, Vector, build,
};

/// Sparse tridiagonal `[-1, diag, -1]` of order `n`.
fn tridiagonal(n: usize, diag: f64) -> Matrix<f64> {
    build::<f64>().sparse_from_fn(n, n, |i, j| {
        if i == j {
            diag
        } else if i.abs_diff(j) == 1 {
            -1.0
        } else {
            0.0
        }
    })
}

fn tight_criteria(max: usize) -> Vec<Box<dyn IterationStopCriterion<f64>>> {
    vec![
        Box::new(FailureStopCriterion::new()),
        Box::new(IterationCountStopCriterion::new(max)),
        Box::new(ResidualStopCriterion::new(1e-12, 0).unwrap()),
    ]
}

fn assert_solves(a: &Matrix<f64>, x: &Vector<f64>, b: &Vector<f64>, epsilon: f64) {
    let back = a.multiply_vector(x).unwrap().to_vec();
    for (p, e) in back.iter().zip(b.to_vec()) {
        assert_abs_diff_eq!(*p, e, epsilon = epsilon);
    }
}

#[test]
fn bicgstab_matches_direct_on_nonsymmetric_system() {
    let b = build::<f64>();
    let a = b
        .dense_of_row_arrays(&[
            [6.0, 1.0, 0.0, 2.0],
            [-1.0, 7.0, 2.0, 0.0],
            [0.0, 3.0, 8.0, -1.0],
            [1.0, 0.0, -2.0, 5.0],
        ])
        .unwrap();
    let rhs = b.dense_vector_of_slice(&[1.0, -2.0, 3.0, 4.0]);
    let (x, status) = a.solve_iterative(&rhs, &mut BiCgStab, Some(tight_criteria(100)), None).unwrap();
    assert_eq!(status, IterationStatus::Converged);
    let direct = a.solve(&rhs).unwrap();
    for (xi, di) in x.to_vec().into_iter().zip(direct.to_vec()) {
        assert_abs_diff_eq!(xi, di, epsilon = 1e-9);
    }
}

#[test]
fn cg_converges_on_sparse_spd_system() {
    let n = 20;
    let a = tridiagonal(n, 2.5);
    let rhs = build::<f64>().dense_vector_from_fn(n, |i| (i % 3) as f64 - 1.0);
    let mut jacobi = DiagonalPreconditioner::<f64>::new();
    let (x, status) = a
        .solve_iterative(&rhs, &mut ConjugateGradient, None, Some(&mut jacobi))
        .unwrap();
    assert!(status.is_converged());
    assert_solves(&a, &x, &rhs, 1e-8);
}

#[test]
fn ilu0_preconditioned_bicgstab_on_tridiagonal() {
    let n = 50;
    let a = tridiagonal(n, 4.0);
    let rhs = build::<f64>().dense_vector_filled(n, 1.0);
    let mut ilu = Ilu0Preconditioner::<f64>::new();
    let (x, status) = a
        .solve_iterative(&rhs, &mut BiCgStab, Some(tight_criteria(200)), Some(&mut ilu))
        .unwrap();
    assert_eq!(status, IterationStatus::Converged);
    assert_solves(&a, &x, &rhs, 1e-9);
}

#[test]
fn matrix_right_hand_sides_converge_column_by_column() {
    let b = build::<f64>();
    let a = tridiagonal(6, 3.0);
    let rhs = b.dense_from_fn(6, 3, |i, j| (i * 3 + j) as f64);
    let (x, status) = a.solve_iterative_matrix(&rhs, &mut BiCgStab, None, None).unwrap();
    assert_eq!(status, IterationStatus::Converged);
    let back = a.multiply(&x).unwrap();
    for (p, e) in back.to_column_major().into_iter().zip(rhs.to_column_major()) {
        assert_abs_diff_eq!(p, e, epsilon = 1e-8);
    }
}

/// Never improves the guess; only reports the initial residual, scaled by
/// `growth` every iteration.
struct Stalled {
    growth: f64,
    iterations: usize,
}

impl IterativeSolver<f64> for Stalled {
    fn solve(
        &mut self,
        matrix: &Matrix<f64>,
        input: &Vector<f64>,
        result: &mut Vector<f64>,
        iterator: &mut SolverIterator<f64>,
        preconditioner: &mut dyn Preconditioner<f64>,
    ) -> Result<()> {
        preconditioner.setup(matrix)?;
        let mut residual = input.subtract(&matrix.multiply_vector(result)?)?;
        let mut k = 0;
        while !iterator.determine_status(k, result, input, &residual)?.is_terminal() {
            residual = residual.multiply_scalar(self.growth);
            k += 1;
        }
        self.iterations = k;
        Ok(())
    }
}

#[test]
fn default_criteria_stop_at_the_iteration_ceiling() {
    let b = build::<f64>();
    let a = b.dense_identity(3);
    let rhs = b.dense_vector_of_slice(&[1.0, 2.0, 3.0]);
    let mut solver = Stalled { growth: 1.0, iterations: 0 };
    let (x, status) = a.solve_iterative(&rhs, &mut solver, None, None).unwrap();
    assert_eq!(status, IterationStatus::StoppedWithoutConvergence);
    assert_eq!(solver.iterations, b.options().max_iterations);
    assert_eq!(x.to_vec(), vec![0.0; 3]);
}

#[test]
fn growing_residual_is_reported_as_divergence() {
    let b = build::<f64>();
    let a = b.dense_identity(2);
    let rhs = b.dense_vector_of_slice(&[1.0, 1.0]);
    let criteria: Vec<Box<dyn IterationStopCriterion<f64>>> = vec![
        Box::new(IterationCountStopCriterion::new(100)),
        Box::new(DivergenceStopCriterion::new(0.5, 3).unwrap()),
    ];
    let mut solver = Stalled { growth: 2.0, iterations: 0 };
    let (_, status) = a.solve_iterative(&rhs, &mut solver, Some(criteria), None).unwrap();
    assert_eq!(status, IterationStatus::Diverged);
    assert!(solver.iterations < 100);
}

#[test]
fn most_severe_verdict_wins() {
    let b = build::<f64>();
    let mut iterator = SolverIterator::<f64>::new(vec![
        Box::new(ResidualStopCriterion::new(1e-8, 0).unwrap()),
        Box::new(FailureStopCriterion::new()),
    ]);
    let solution = b.dense_vector_of_slice(&[f64::NAN, 1.0]);
    let source = b.dense_vector_filled(2, 1.0);
    let residual = b.dense_vector(2);
    let status = iterator.determine_status(4, &solution, &source, &residual).unwrap();
    assert_eq!(status, IterationStatus::Failed);
    assert_eq!(iterator.status(), IterationStatus::Failed);
}

#[test]
fn residual_criterion_alone_rejects_a_nan_residual() {
    let b = build::<f64>();
    let mut iterator = SolverIterator::<f64>::new(vec![Box::new(ResidualStopCriterion::new(1e-6, 0).unwrap())]);
    let ones = b.dense_vector_filled(2, 1.0);
    let nan = b.dense_vector_of_slice(&[f64::NAN, f64::NAN]);
    let status = iterator.determine_status(1, &ones, &ones, &nan).unwrap();
    assert_ne!(status, IterationStatus::Converged);
    assert_eq!(status, IterationStatus::Failed);

    let mut iterator = SolverIterator::<f64>::new(vec![Box::new(ResidualStopCriterion::new(1e-6, 0).unwrap())]);
    let inf = b.dense_vector_of_slice(&[1.0, f64::NEG_INFINITY]);
    assert_eq!(iterator.determine_status(1, &ones, &ones, &inf).unwrap(), IterationStatus::Failed);
}

#[test]
fn cancelled_iterator_stops_the_solver_immediately() {
    let b = build::<f64>();
    let a = b.dense_identity(2);
    let rhs = b.dense_vector_of_slice(&[1.0, 1.0]);
    let mut x = b.dense_vector(2);
    let mut iterator = SolverIterator::new(tight_criteria(10));
    let mut solver = Stalled { growth: 1.0, iterations: 0 };
    iterator.cancel();
    // `try_solve_iterative` resets first, so drive the solver directly.
    solver
        .solve(&a, &rhs, &mut x, &mut iterator, &mut DiagonalPreconditioner::<f64>::new())
        .unwrap();
    assert_eq!(iterator.status(), IterationStatus::Cancelled);
    assert_eq!(solver.iterations, 0);
}
