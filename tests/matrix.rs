use adcore::matrix::{append_col, append_row, elementwise, inverse_spd};
use adcore::{functions, AdError, Arena, ArenaGuard, Dual, Dual64, Matrix, Scalar, Var64};
use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `A·Aᵀ + n·I` for a random `A` with entries in [-1, 1].
fn random_spd(rng: &mut StdRng, n: usize) -> Matrix<f64> {
    let a = Matrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
    let aat = a.multiply(&a.transpose()).unwrap();
    Matrix::from_fn(n, n, |i, j| aat[(i, j)] + if i == j { n as f64 } else { 0.0 })
}

/// Lower-triangular entries of a symmetric matrix, row by row.
fn lower_triangle(m: &Matrix<f64>) -> Vec<f64> {
    let n = m.rows();
    (0..n)
        .flat_map(|i| (0..=i).map(move |j| (i, j)))
        .map(|(i, j)| m[(i, j)])
        .collect()
}

/// Rebuild a symmetric matrix from its lower triangle.
fn symmetric<S: Scalar>(n: usize, theta: &[S]) -> Matrix<S> {
    Matrix::from_fn(n, n, |i, j| {
        let (r, c) = if i >= j { (i, j) } else { (j, i) };
        theta[r * (r + 1) / 2 + c]
    })
}

fn assert_identity(m: &Matrix<f64>, tol: f64) {
    for i in 0..m.rows() {
        for j in 0..m.cols() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(m[(i, j)], expected, epsilon = tol);
        }
    }
}

// ── append ──

#[test]
fn append_col_ones_and_zeros() {
    let a = Matrix::from_fn(2, 2, |_, _| 1.0);
    let b = Matrix::<f64>::zeros(2, 1);
    let c = append_col(&a, &b).unwrap();
    assert_eq!(c.shape(), (2, 3));
    assert_eq!(c.as_slice(), &[1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
}

#[test]
fn append_col_row_mismatch() {
    let a = Matrix::<f64>::zeros(2, 2);
    let b = Matrix::<f64>::zeros(3, 1);
    let err = append_col(&a, &b).unwrap_err();
    assert_eq!(
        err,
        AdError::SizeMismatch {
            op: "append_col",
            lhs_name: "rows of A",
            lhs: 2,
            rhs_name: "rows of B",
            rhs: 3,
        }
    );
    assert!(err.is_domain());
    let msg = err.to_string();
    assert!(msg.contains('2') && msg.contains('3'), "{msg}");
}

#[test]
fn append_col_row_vectors() {
    let a = Matrix::row_vector(vec![1.0, 2.0]);
    let b = Matrix::row_vector(vec![3.0]);
    let c = append_col(&a, &b).unwrap();
    assert_eq!(c, Matrix::row_vector(vec![1.0, 2.0, 3.0]));
}

#[test]
fn append_row_stacks() {
    let a = Matrix::from_vec(1, 2, vec![1.0, 2.0]);
    let b = Matrix::from_vec(2, 2, vec![3.0, 4.0, 5.0, 6.0]);
    let c = append_row(&a, &b).unwrap();
    assert_eq!(c.shape(), (3, 2));
    assert_eq!(c[(2, 1)], 6.0);

    let err = append_row(&a, &Matrix::<f64>::zeros(1, 3)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "append_row: columns of A (2) does not match columns of B (3)"
    );
}

#[test]
fn append_copies_handles() {
    let mut arena = Arena::<f64>::new();
    let x = arena.new_variable(1.0).unwrap();
    let y = arena.new_variable(2.0).unwrap();
    let a = Matrix::column_vector(vec![x]);
    let b = Matrix::column_vector(vec![y]);
    let c = append_col(&a, &b).unwrap();
    assert_eq!(arena.node_count(), 2);
    assert_eq!(c[(0, 0)].index(), x.index());
    assert_eq!(c[(0, 1)].index(), y.index());
}

#[test]
fn append_gradient_is_identity() {
    // f = Σ_j j · [x | y]_{0j}
    let g = adcore::grad(
        |v: &[Var64]| {
            let a = Matrix::row_vector(vec![v[0], v[1]]);
            let b = Matrix::row_vector(vec![v[2]]);
            let c = append_col(&a, &b)?;
            Ok(c.iter().enumerate().fold(Var64::zero(), |acc, (j, &e)| {
                acc + e * (j as f64 + 1.0)
            }))
        },
        &[0.1, 0.2, 0.3],
    )
    .unwrap();
    assert_eq!(g, vec![1.0, 2.0, 3.0]);
}

// ── inverse_spd: primal ──

#[test]
fn inverse_times_matrix_is_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    for n in 1..=6 {
        let m = random_spd(&mut rng, n);
        let inv = inverse_spd(&m).unwrap();
        assert_identity(&inv.multiply(&m).unwrap(), 1e-10);
        assert_identity(&m.multiply(&inv).unwrap(), 1e-10);
    }
}

#[test]
fn inverse_matches_nalgebra() {
    let mut rng = StdRng::seed_from_u64(2);
    let m = random_spd(&mut rng, 5);
    let inv = inverse_spd(&m).unwrap();
    let reference = DMatrix::from_row_slice(5, 5, m.as_slice())
        .try_inverse()
        .unwrap();
    for i in 0..5 {
        for j in 0..5 {
            assert_relative_eq!(inv[(i, j)], reference[(i, j)], epsilon = 1e-12);
        }
    }
}

#[test]
fn inverse_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(3);
    let inv = inverse_spd(&random_spd(&mut rng, 4)).unwrap();
    for i in 0..4 {
        for j in 0..i {
            assert_relative_eq!(inv[(i, j)], inv[(j, i)], epsilon = 1e-14);
        }
    }
}

#[test]
fn non_square_is_rejected() {
    let err = inverse_spd(&Matrix::<f64>::zeros(2, 3)).unwrap_err();
    assert_eq!(
        err,
        AdError::NotSquare {
            op: "inverse_spd",
            rows: 2,
            cols: 3
        }
    );
}

#[test]
fn non_symmetric_is_rejected_before_factorization() {
    // Also indefinite; symmetry is checked first.
    let m = Matrix::from_vec(2, 2, vec![1.0, 3.0, 2.0, 1.0]);
    match inverse_spd(&m) {
        Err(AdError::NotSymmetric {
            op,
            row,
            col,
            upper,
            lower,
        }) => {
            assert_eq!(op, "inverse_spd");
            assert_eq!((row, col), (0, 1));
            assert_eq!((upper, lower), (3.0, 2.0));
        }
        other => panic!("expected NotSymmetric, got {other:?}"),
    }
}

#[test]
fn small_asymmetry_is_tolerated() {
    let m = Matrix::from_vec(2, 2, vec![2.0, 1.0, 1.0 + 1e-10, 2.0]);
    assert!(inverse_spd(&m).is_ok());
}

#[test]
fn indefinite_is_rejected() {
    let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 1.0]);
    let err = inverse_spd(&m).unwrap_err();
    assert!(matches!(err, AdError::NotPositiveDefinite { op: "inverse_spd", .. }));
    assert!(err.is_domain());
}

#[test]
fn semidefinite_is_rejected() {
    let m = Matrix::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]);
    assert!(matches!(
        inverse_spd(&m),
        Err(AdError::NotPositiveDefinite { pivot: 1, .. })
    ));
}

// ── inverse_spd: derivatives ──

#[test]
fn reverse_gradient_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(4);
    let n = 3;
    let m = random_spd(&mut rng, n);
    let theta = lower_triangle(&m);
    let w: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();

    // f(θ) = Σ W ∘ inverse(M(θ))
    fn objective<S: Scalar>(n: usize, w: &[f64], theta: &[S]) -> adcore::Result<S> {
        let inv = inverse_spd(&symmetric(n, theta))?;
        Ok(inv
            .iter()
            .zip(w)
            .fold(S::zero(), |acc, (&b, &wk)| acc + b * S::lit(wk)))
    }

    let g = adcore::grad(|v: &[Var64]| objective(n, &w, v), &theta).unwrap();
    let h = 1e-7;
    for k in 0..theta.len() {
        let mut tp = theta.clone();
        let mut tm = theta.clone();
        tp[k] += h;
        tm[k] -= h;
        let fd = (objective(n, &w, &tp).unwrap() - objective(n, &w, &tm).unwrap()) / (2.0 * h);
        assert_relative_eq!(g[k], fd, epsilon = 1e-7, max_relative = 1e-5);
    }
}

#[test]
fn every_output_depends_on_every_input() {
    let mut rng = StdRng::seed_from_u64(5);
    let m = random_spd(&mut rng, 3);
    let mut arena = Arena::<f64>::new();
    let vars: Vec<Var64> = m
        .iter()
        .map(|&v| arena.new_variable(v).unwrap())
        .collect();
    let input = Matrix::from_vec(3, 3, vars);
    let inv = {
        let _guard = ArenaGuard::new(&mut arena);
        inverse_spd(&input).unwrap()
    };
    assert_eq!(arena.node_count(), 9 + 9);
    for entry in inv.iter() {
        let node = arena.node(entry.index());
        assert_eq!(node.operands.len(), 9);
    }
}

#[test]
fn failed_inverse_records_nothing() {
    let mut arena = Arena::<f64>::new();
    let vars: Vec<Var64> = [1.0, 2.0, 2.0, 1.0]
        .iter()
        .map(|&v| arena.new_variable(v).unwrap())
        .collect();
    let input = Matrix::from_vec(2, 2, vars);
    let result = {
        let _guard = ArenaGuard::new(&mut arena);
        inverse_spd(&input)
    };
    assert!(result.is_err());
    assert_eq!(arena.node_count(), 4);
}

#[test]
fn forward_tangent_is_minus_b_v_b() {
    let mut rng = StdRng::seed_from_u64(6);
    let n = 4;
    let m = random_spd(&mut rng, n);
    let v = random_spd(&mut rng, n);
    let input = Matrix::from_fn(n, n, |i, j| Dual::new(m[(i, j)], v[(i, j)]));

    let out: Matrix<Dual64> = inverse_spd(&input).unwrap();
    let b = inverse_spd(&m).unwrap();
    let expected = b.multiply(&v).unwrap().multiply(&b).unwrap();
    for i in 0..n {
        for j in 0..n {
            assert_relative_eq!(out[(i, j)].value, b[(i, j)], epsilon = 1e-14);
            assert_relative_eq!(out[(i, j)].tangent, -expected[(i, j)], epsilon = 1e-12);
        }
    }
}

#[test]
fn forward_and_reverse_agree() {
    let mut rng = StdRng::seed_from_u64(8);
    let n = 3;
    let theta = lower_triangle(&random_spd(&mut rng, n));

    fn log_trace<S: Scalar>(n: usize, theta: &[S]) -> adcore::Result<S> {
        let inv = inverse_spd(&symmetric(n, theta))?;
        let trace = (0..n).fold(S::zero(), |acc, i| acc + inv[(i, i)]);
        functions::log(trace)
    }

    let g = adcore::grad(|v: &[Var64]| log_trace(n, v), &theta).unwrap();
    let (_, jac) =
        adcore::jacobian(|d: &[Dual64]| Ok(vec![log_trace(n, d)?]), &theta).unwrap();
    for k in 0..theta.len() {
        assert_relative_eq!(g[k], jac[0][k], epsilon = 1e-12, max_relative = 1e-10);
    }
}

// ── elementwise ──

#[test]
fn elementwise_records_one_node_per_entry() {
    let mut arena = Arena::<f64>::new();
    let vars: Vec<Var64> = (0..6)
        .map(|k| arena.new_variable(k as f64 * 0.1).unwrap())
        .collect();
    let m = Matrix::from_vec(2, 3, vars);
    let out = {
        let _guard = ArenaGuard::new(&mut arena);
        elementwise(&functions::Exp, &m).unwrap()
    };
    assert_eq!(arena.node_count(), 12);
    for (k, e) in out.iter().enumerate() {
        assert_eq!(arena.node(e.index()).operands, &[k as u32]);
    }
}

#[test]
fn dot_self_gradient_is_twice_the_entries() {
    let x = [0.5, -1.5, 2.0, 0.25];
    let g = adcore::grad(
        |v: &[Var64]| Ok(Matrix::from_vec(2, 2, v.to_vec()).dot_self()),
        &x,
    )
    .unwrap();
    for (gi, xi) in g.iter().zip(&x) {
        assert_relative_eq!(*gi, 2.0 * xi, max_relative = 1e-14);
    }
}
