//! Domain-checked primitives built on the [`Elementary`] contract.
//!
//! Each primitive is a unit struct (or a struct holding its non-differentiable
//! data) plus a generic free function, so the same call works for plain
//! floats, duals and tape variables.

use crate::elementary::Elementary;
use crate::error::{AdError, Result};
use crate::float::Float;
use crate::scalar::Scalar;

fn domain<F: Float>(
    op: &'static str,
    operand: &'static str,
    value: F,
    requirement: &'static str,
) -> AdError {
    AdError::Domain {
        op,
        operand,
        value: value.to_f64().unwrap_or(f64::NAN),
        requirement,
    }
}

/// `eˣ`
pub struct Exp;

impl<F: Float> Elementary<F> for Exp {
    fn name(&self) -> &'static str {
        "exp"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        Ok(args[0].exp())
    }
    fn compute_partials(&self, _args: &[F], value: F, partials: &mut [F]) {
        partials[0] = value;
    }
}

/// Natural logarithm; `x` must be positive.
pub struct Log;

impl<F: Float> Elementary<F> for Log {
    fn name(&self) -> &'static str {
        "log"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let x = args[0];
        if x.is_nan() || x <= F::zero() {
            return Err(domain("log", "x", x, "positive"));
        }
        Ok(x.ln())
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        partials[0] = args[0].recip();
    }
}

/// `ln(1 + x)`; `x` must exceed -1.
pub struct Log1p;

impl<F: Float> Elementary<F> for Log1p {
    fn name(&self) -> &'static str {
        "log1p"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let x = args[0];
        if x.is_nan() || x <= -F::one() {
            return Err(domain("log1p", "x", x, "greater than -1"));
        }
        Ok(x.ln_1p())
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        partials[0] = (F::one() + args[0]).recip();
    }
}

/// Square root. The derivative `1 / (2√x)` is unbounded at zero, so `x`
/// must be strictly positive.
pub struct Sqrt;

impl<F: Float> Elementary<F> for Sqrt {
    fn name(&self) -> &'static str {
        "sqrt"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let x = args[0];
        if x.is_nan() || x <= F::zero() {
            return Err(domain("sqrt", "x", x, "positive"));
        }
        Ok(x.sqrt())
    }
    fn compute_partials(&self, _args: &[F], value: F, partials: &mut [F]) {
        partials[0] = F::one() / (value + value);
    }
}

pub struct Sinh;

impl<F: Float> Elementary<F> for Sinh {
    fn name(&self) -> &'static str {
        "sinh"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        Ok(args[0].sinh())
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        partials[0] = args[0].cosh();
    }
}

pub struct Cosh;

impl<F: Float> Elementary<F> for Cosh {
    fn name(&self) -> &'static str {
        "cosh"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        Ok(args[0].cosh())
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        partials[0] = args[0].sinh();
    }
}

pub struct Tanh;

impl<F: Float> Elementary<F> for Tanh {
    fn name(&self) -> &'static str {
        "tanh"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        Ok(args[0].tanh())
    }
    fn compute_partials(&self, _args: &[F], value: F, partials: &mut [F]) {
        partials[0] = F::one() - value * value;
    }
}

pub struct Square;

impl<F: Float> Elementary<F> for Square {
    fn name(&self) -> &'static str {
        "square"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        Ok(args[0] * args[0])
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        partials[0] = args[0] + args[0];
    }
}

/// Logistic sigmoid `1 / (1 + e⁻ˣ)`.
pub struct InvLogit;

impl<F: Float> Elementary<F> for InvLogit {
    fn name(&self) -> &'static str {
        "inv_logit"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let x = args[0];
        // Branch keeps exp() from overflowing for large |x|.
        if x >= F::zero() {
            Ok(F::one() / (F::one() + (-x).exp()))
        } else {
            let e = x.exp();
            Ok(e / (F::one() + e))
        }
    }
    fn compute_partials(&self, _args: &[F], value: F, partials: &mut [F]) {
        partials[0] = value * (F::one() - value);
    }
}

/// Absolute value. The derivative at exactly zero is taken as 0.
pub struct Fabs;

impl<F: Float> Elementary<F> for Fabs {
    fn name(&self) -> &'static str {
        "fabs"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        if args[0].is_nan() {
            return Err(domain("fabs", "x", args[0], "a number"));
        }
        Ok(args[0].abs())
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        let x = args[0];
        partials[0] = if x > F::zero() {
            F::one()
        } else if x < F::zero() {
            -F::one()
        } else {
            F::zero()
        };
    }
}

/// `xʸ` with both operands differentiable; the base must be positive.
pub struct Pow;

impl<F: Float> Elementary<F> for Pow {
    fn name(&self) -> &'static str {
        "pow"
    }
    fn arity(&self) -> usize {
        2
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let (x, y) = (args[0], args[1]);
        if x.is_nan() || x <= F::zero() {
            return Err(domain("pow", "base", x, "positive"));
        }
        Ok(x.powf(y))
    }
    fn compute_partials(&self, args: &[F], value: F, partials: &mut [F]) {
        let (x, y) = (args[0], args[1]);
        partials[0] = y * value / x;
        partials[1] = value * x.ln();
    }
}

/// `x / y` with the divisor checked. The `/` operators divide unchecked and
/// carry infinite partials through a zero divisor; this primitive refuses it.
pub struct Divide;

impl<F: Float> Elementary<F> for Divide {
    fn name(&self) -> &'static str {
        "divide"
    }
    fn arity(&self) -> usize {
        2
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let y = args[1];
        if y == F::zero() || y.is_nan() {
            return Err(domain("divide", "y", y, "a nonzero number"));
        }
        Ok(args[0] / y)
    }
    fn compute_partials(&self, args: &[F], value: F, partials: &mut [F]) {
        let y = args[1];
        partials[0] = y.recip();
        partials[1] = -value / y;
    }
}

/// `ln Σ eˣⁱ` over any number of operands, computed around the maximum.
pub struct LogSumExp {
    pub len: usize,
}

impl<F: Float> Elementary<F> for LogSumExp {
    fn name(&self) -> &'static str {
        "log_sum_exp"
    }
    fn arity(&self) -> usize {
        self.len
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        if let Some(&x) = args.iter().find(|x| x.is_nan()) {
            return Err(domain("log_sum_exp", "x", x, "a number"));
        }
        let max = args.iter().copied().fold(F::neg_infinity(), F::max);
        if max == F::neg_infinity() {
            return Ok(max);
        }
        if max.is_infinite() {
            return Err(domain("log_sum_exp", "max(x)", max, "finite"));
        }
        let sum = args
            .iter()
            .fold(F::zero(), |acc, &x| acc + (x - max).exp());
        Ok(max + sum.ln())
    }
    fn compute_partials(&self, args: &[F], value: F, partials: &mut [F]) {
        // Every operand is -inf: the result is flat in all of them.
        if value == F::neg_infinity() {
            partials.fill(F::zero());
            return;
        }
        for (p, &x) in partials.iter_mut().zip(args) {
            *p = (x - value).exp();
        }
    }
}

/// Log loss of a predicted probability `y_hat` against a binary outcome `y`:
/// `-ln(y_hat)` when `y = 1`, `-ln(1 - y_hat)` when `y = 0`.
///
/// The outcome selects the branch; there is no smoothing between them.
pub struct BinaryLogLoss {
    pub y: i32,
}

impl<F: Float> Elementary<F> for BinaryLogLoss {
    fn name(&self) -> &'static str {
        "binary_log_loss"
    }
    fn arity(&self) -> usize {
        1
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let y_hat = args[0];
        match self.y {
            0 => {
                if y_hat.is_nan() || y_hat >= F::one() {
                    return Err(domain("binary_log_loss", "y_hat", y_hat, "less than 1"));
                }
                Ok(-(-y_hat).ln_1p())
            }
            1 => {
                if y_hat.is_nan() || y_hat <= F::zero() {
                    return Err(domain("binary_log_loss", "y_hat", y_hat, "positive"));
                }
                Ok(-y_hat.ln())
            }
            y => Err(AdError::Domain {
                op: "binary_log_loss",
                operand: "y",
                value: f64::from(y),
                requirement: "0 or 1",
            }),
        }
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        let y_hat = args[0];
        partials[0] = if self.y != 0 {
            -y_hat.recip()
        } else {
            (F::one() - y_hat).recip()
        };
    }
}

/// Log density of `Normal(mu, sigma)` at `y`; `sigma` must be positive.
pub struct NormalLpdf;

impl<F: Float> Elementary<F> for NormalLpdf {
    fn name(&self) -> &'static str {
        "normal_lpdf"
    }
    fn arity(&self) -> usize {
        3
    }
    fn compute_value(&self, args: &[F]) -> Result<F> {
        let (y, mu, sigma) = (args[0], args[1], args[2]);
        if sigma.is_nan() || sigma <= F::zero() || sigma.is_infinite() {
            return Err(domain("normal_lpdf", "sigma", sigma, "positive and finite"));
        }
        if !y.is_finite() {
            return Err(domain("normal_lpdf", "y", y, "finite"));
        }
        if !mu.is_finite() {
            return Err(domain("normal_lpdf", "mu", mu, "finite"));
        }
        let z = (y - mu) / sigma;
        let half = F::from_f64(0.5).unwrap();
        let log_sqrt_two_pi = (F::TAU()).sqrt().ln();
        Ok(-half * z * z - sigma.ln() - log_sqrt_two_pi)
    }
    fn compute_partials(&self, args: &[F], _value: F, partials: &mut [F]) {
        let (y, mu, sigma) = (args[0], args[1], args[2]);
        let inv_sigma = sigma.recip();
        let z = (y - mu) * inv_sigma;
        partials[0] = -z * inv_sigma;
        partials[1] = z * inv_sigma;
        partials[2] = (z * z - F::one()) * inv_sigma;
    }
}

// ── Generic entry points ──

pub fn exp<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Exp, &[x])
}

pub fn log<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Log, &[x])
}

pub fn log1p<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Log1p, &[x])
}

pub fn sqrt<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Sqrt, &[x])
}

pub fn sinh<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Sinh, &[x])
}

pub fn cosh<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Cosh, &[x])
}

pub fn tanh<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Tanh, &[x])
}

pub fn square<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Square, &[x])
}

pub fn inv_logit<S: Scalar>(x: S) -> Result<S> {
    S::apply(&InvLogit, &[x])
}

pub fn fabs<S: Scalar>(x: S) -> Result<S> {
    S::apply(&Fabs, &[x])
}

pub fn pow<S: Scalar>(x: S, y: S) -> Result<S> {
    S::apply(&Pow, &[x, y])
}

pub fn divide<S: Scalar>(x: S, y: S) -> Result<S> {
    S::apply(&Divide, &[x, y])
}

pub fn log_sum_exp<S: Scalar>(xs: &[S]) -> Result<S> {
    S::apply(&LogSumExp { len: xs.len() }, xs)
}

pub fn binary_log_loss<S: Scalar>(y: i32, y_hat: S) -> Result<S> {
    S::apply(&BinaryLogLoss { y }, &[y_hat])
}

pub fn normal_lpdf<S: Scalar>(y: S, mu: S, sigma: S) -> Result<S> {
    S::apply(&NormalLpdf, &[y, mu, sigma])
}
