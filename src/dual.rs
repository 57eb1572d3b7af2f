use std::fmt::{self, Display};

use crate::float::Real;

/// Forward-mode dual number: a value paired with its tangent.
///
/// `Dual { value, tangent }` represents `value + tangent·ε` where `ε² = 0`.
/// Every primitive maps `Dual(v, t)` to `Dual(f(v), f'(v)·t)`, so the chain
/// rule composes through ordinary function application with no graph.
///
/// `T` may itself be a `Dual`, which yields second-order derivatives:
///
/// ```
/// use adcore::Dual;
///
/// // d²/dx² sinh(x) = sinh(x)
/// let x = Dual::new(Dual::new(0.5_f64, 1.0), Dual::new(1.0, 0.0));
/// let y = x.sinh();
/// assert!((y.tangent.tangent - 0.5_f64.sinh()).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Dual<T: Real> {
    /// Primal value.
    pub value: T,
    /// Tangent (directional derivative) value.
    pub tangent: T,
}

impl<T: Real + Display> Display for Dual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.value, self.tangent)
    }
}

impl<T: Real> Default for Dual<T> {
    fn default() -> Self {
        Dual::constant(T::zero())
    }
}

impl<T: Real> Dual<T> {
    #[inline]
    pub fn new(value: T, tangent: T) -> Self {
        Dual { value, tangent }
    }

    /// A dual with zero tangent.
    #[inline]
    pub fn constant(value: T) -> Self {
        Dual::new(value, T::zero())
    }

    /// A dual with unit tangent: the seed for differentiating along `value`.
    #[inline]
    pub fn variable(value: T) -> Self {
        Dual::new(value, T::one())
    }

    /// Pushes the tangent through a scalar function `f` whose value `f(x)`
    /// and derivative `f'(x)` at `x = self.value` are already known.
    #[inline]
    pub fn map(self, value: T, derivative: T) -> Self {
        Dual::new(value, derivative * self.tangent)
    }

    // Common elementary functions, callable without importing
    // `num_traits::Float`. The rest live on that impl.

    #[inline]
    pub fn exp(self) -> Self {
        let y = self.value.exp();
        self.map(y, y)
    }

    #[inline]
    pub fn ln(self) -> Self {
        self.map(self.value.ln(), self.value.recip())
    }

    #[inline]
    pub fn sqrt(self) -> Self {
        let y = self.value.sqrt();
        self.map(y, (y + y).recip())
    }

    #[inline]
    pub fn powi(self, n: i32) -> Self {
        let x = self.value;
        let derivative = match n {
            0 => T::zero(),
            _ => T::from(n).unwrap() * x.powi(n - 1),
        };
        self.map(x.powi(n), derivative)
    }

    #[inline]
    pub fn sin(self) -> Self {
        let (s, c) = self.value.sin_cos();
        self.map(s, c)
    }

    #[inline]
    pub fn cos(self) -> Self {
        let (s, c) = self.value.sin_cos();
        self.map(c, -s)
    }

    #[inline]
    pub fn sinh(self) -> Self {
        self.map(self.value.sinh(), self.value.cosh())
    }

    #[inline]
    pub fn cosh(self) -> Self {
        self.map(self.value.cosh(), self.value.sinh())
    }

    /// `tanh' = 1 - tanh²`, taken from the result.
    #[inline]
    pub fn tanh(self) -> Self {
        let y = self.value.tanh();
        self.map(y, T::one() - y * y)
    }

    /// Absolute value. The derivative at zero (either sign) is 0, matching
    /// [`functions::fabs`](crate::functions::fabs).
    #[inline]
    pub fn abs(self) -> Self {
        let x = self.value;
        let derivative = if x == T::zero() { T::zero() } else { x.signum() };
        self.map(x.abs(), derivative)
    }
}
