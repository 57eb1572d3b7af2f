use adcore::functions::{binary_log_loss, exp, inv_logit, normal_lpdf};
use adcore::matrix::inverse_spd;
use adcore::{AdError, Arena, GradientEvaluator, LogDensity, Matrix, Scalar};
use approx::assert_relative_eq;

/// Logistic regression with standard normal priors on both coefficients.
struct Logistic {
    x: Vec<f64>,
    y: Vec<i32>,
}

impl LogDensity<f64> for Logistic {
    fn dim(&self) -> usize {
        2
    }

    fn log_density<S: Scalar<Float = f64>>(&self, beta: &[S]) -> adcore::Result<S> {
        let zero = S::zero();
        let one = S::lit(1.0);
        let mut lp = normal_lpdf(beta[0], zero, one)? + normal_lpdf(beta[1], zero, one)?;
        for (&xi, &yi) in self.x.iter().zip(&self.y) {
            let p = inv_logit(beta[0] + beta[1] * S::lit(xi))?;
            lp = lp - binary_log_loss(yi, p)?;
        }
        Ok(lp)
    }
}

fn logistic() -> Logistic {
    Logistic {
        x: vec![-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0],
        y: vec![0, 0, 1, 0, 1, 1, 1],
    }
}

/// Zero-mean bivariate normal at a fixed point, covariance
/// `[[e^θ₀, θ₂], [θ₂, e^θ₁]]`.
struct Bivariate {
    point: [f64; 2],
}

impl LogDensity<f64> for Bivariate {
    fn dim(&self) -> usize {
        3
    }

    fn log_density<S: Scalar<Float = f64>>(&self, theta: &[S]) -> adcore::Result<S> {
        let (a, b) = (exp(theta[0])?, exp(theta[1])?);
        let sigma = Matrix::from_vec(2, 2, vec![a, theta[2], theta[2], b]);
        let precision = inverse_spd(&sigma)?;
        let y = Matrix::column_vector(vec![S::lit(self.point[0]), S::lit(self.point[1])]);
        let quad = y.transpose().multiply(&precision)?.multiply(&y)?;
        Ok(S::lit(-0.5) * quad[(0, 0)])
    }
}

fn central_gradient<M: LogDensity<f64>>(model: &M, x: &[f64]) -> Vec<f64> {
    let h = 1e-7;
    (0..x.len())
        .map(|i| {
            let mut xp = x.to_vec();
            let mut xm = x.to_vec();
            xp[i] += h;
            xm[i] -= h;
            (model.log_density(&xp[..]).unwrap() - model.log_density(&xm[..]).unwrap()) / (2.0 * h)
        })
        .collect()
}

#[test]
fn logistic_gradient_matches_finite_differences() {
    let model = logistic();
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    for beta in [[0.0, 0.0], [0.3, 1.2], [-1.0, 2.5]] {
        let (value, gradient) = evaluator.evaluate(&beta).unwrap();
        assert_relative_eq!(value, model.log_density(&beta[..]).unwrap(), max_relative = 1e-12);
        let fd = central_gradient(&model, &beta);
        for (&g, &f) in gradient.iter().zip(&fd) {
            assert_relative_eq!(g, f, epsilon = 1e-6, max_relative = 1e-6);
        }
    }
    assert_eq!(evaluator.evals(), 3);
    assert_eq!(evaluator.rejected(), 0);
}

#[test]
fn matrix_model_gradient_matches_finite_differences() {
    let model = Bivariate { point: [0.7, -1.3] };
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    let theta = [0.2, -0.4, 0.3];
    let (_, gradient) = evaluator.evaluate(&theta).unwrap();
    let fd = central_gradient(&model, &theta);
    for (&g, &f) in gradient.iter().zip(&fd) {
        assert_relative_eq!(g, f, epsilon = 1e-6, max_relative = 1e-5);
    }
}

#[test]
fn directional_derivative_matches_gradient() {
    let model = Bivariate { point: [1.0, 0.5] };
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    let theta = [0.1, 0.2, -0.2];
    let v = [0.5, -1.0, 2.0];
    let (value, gradient) = evaluator.evaluate(&theta).unwrap();
    let (fwd_value, dd) = evaluator.directional_derivative(&theta, &v).unwrap();
    let expected: f64 = gradient.iter().zip(&v).map(|(g, v)| g * v).sum();
    assert_relative_eq!(fwd_value, value, max_relative = 1e-14);
    assert_relative_eq!(dd, expected, epsilon = 1e-12, max_relative = 1e-10);
}

#[test]
fn domain_error_rejects_the_proposal_only() {
    let model = Bivariate { point: [1.0, 1.0] };
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);

    // |θ₂| > e^{(θ₀+θ₁)/2}: covariance is indefinite.
    let err = evaluator.evaluate(&[0.0, 0.0, 2.0]).unwrap_err();
    assert!(matches!(err, AdError::NotPositiveDefinite { op: "inverse_spd", .. }));
    assert!(err.is_domain());
    assert_eq!(evaluator.rejected(), 1);

    // The evaluator is still usable.
    let (value, _) = evaluator.evaluate(&[0.0, 0.0, 0.5]).unwrap();
    assert!(value.is_finite());
    assert_eq!(evaluator.evals(), 2);
    assert_eq!(evaluator.rejected(), 1);
}

#[test]
fn arena_is_reset_between_evaluations() {
    let model = logistic();
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    evaluator.evaluate(&[0.1, 0.2]).unwrap();
    let first = (evaluator.arena().node_count(), evaluator.arena().epoch());
    evaluator.evaluate(&[0.3, 0.4]).unwrap();
    let second = (evaluator.arena().node_count(), evaluator.arena().epoch());
    assert_eq!(first.0, second.0);
    assert_eq!(second.1, first.1 + 1);
}

#[test]
fn gradient_reads_the_seeded_inputs() {
    let model = logistic();
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    let (_, gradient) = evaluator.evaluate(&[0.0, 0.0]).unwrap();
    let arena = evaluator.arena();
    assert_eq!(gradient.len(), 2);
    assert_eq!(gradient[0], arena.adjoints()[0]);
    assert_eq!(gradient[1], arena.adjoints()[1]);
}

#[test]
fn configured_arena_limit_is_fatal() {
    let model = logistic();
    let mut evaluator = GradientEvaluator::<f64, _>::with_arena(&model, Arena::with_limit(10));
    let err = evaluator.evaluate(&[0.0, 0.0]).unwrap_err();
    assert_eq!(err, AdError::ArenaExhausted { capacity: 10 });
    assert!(!err.is_domain());
}

#[test]
#[should_panic(expected = "parameter count must match model dimension")]
fn wrong_parameter_count_panics() {
    let model = logistic();
    let mut evaluator = GradientEvaluator::<f64, _>::new(&model);
    let _ = evaluator.evaluate(&[0.0]);
}
