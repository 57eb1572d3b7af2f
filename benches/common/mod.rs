#![allow(dead_code)]

use adcore::functions::{binary_log_loss, inv_logit, normal_lpdf};
use adcore::{LogDensity, Scalar};

// ─── Rosenbrock ────────────────────────────────────────────────────────────

pub fn rosenbrock<S: Scalar>(x: &[S]) -> adcore::Result<S> {
    let one = S::lit(1.0);
    let hundred = S::lit(100.0);
    let mut sum = S::zero();
    for i in 0..x.len() - 1 {
        let t1 = one - x[i];
        let t2 = x[i + 1] - x[i] * x[i];
        sum = sum + t1 * t1 + hundred * t2 * t2;
    }
    Ok(sum)
}

// ─── Logistic regression ───────────────────────────────────────────────────
// n coefficients, 4n observations with deterministic covariates.
// Exercises inv_logit, binary_log_loss and normal_lpdf.

pub struct Logistic {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<i32>,
}

impl Logistic {
    pub fn new(dim: usize) -> Self {
        let rows = 4 * dim;
        let x = (0..rows)
            .map(|r| {
                (0..dim)
                    .map(|c| ((r * dim + c + 1) as f64).sin())
                    .collect()
            })
            .collect();
        let y = (0..rows).map(|r| (r % 3 == 0) as i32).collect();
        Logistic { x, y }
    }
}

impl LogDensity<f64> for Logistic {
    fn dim(&self) -> usize {
        self.x[0].len()
    }

    fn log_density<S: Scalar<Float = f64>>(&self, beta: &[S]) -> adcore::Result<S> {
        let (zero, one) = (S::zero(), S::lit(1.0));
        let mut lp = S::zero();
        for &b in beta {
            lp = lp + normal_lpdf(b, zero, one)?;
        }
        for (row, &y) in self.x.iter().zip(&self.y) {
            let mut eta = S::zero();
            for (&xi, &b) in row.iter().zip(beta) {
                eta = eta + b * S::lit(xi);
            }
            lp = lp - binary_log_loss(y, inv_logit(eta)?)?;
        }
        Ok(lp)
    }
}

// ─── Helpers ───────────────────────────────────────────────────────────────

pub fn make_input(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.5 + 0.01 * i as f64).collect()
}
