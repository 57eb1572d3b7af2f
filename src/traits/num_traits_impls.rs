//! `num_traits` implementations for [`Dual`].
//!
//! With these in place `Dual<T>` is itself a [`Real`], so `Dual<Dual<f64>>`
//! carries second derivatives through the same methods.

use std::num::FpCategory;

use num_traits::{
    Float as NumFloat, FloatConst, FromPrimitive, Num, NumCast, One, Signed, ToPrimitive, Zero,
};

use crate::dual::Dual;
use crate::float::Real;

impl<T: Real> Zero for Dual<T> {
    #[inline]
    fn zero() -> Self {
        Dual::constant(T::zero())
    }
    #[inline]
    fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl<T: Real> One for Dual<T> {
    #[inline]
    fn one() -> Self {
        Dual::constant(T::one())
    }
}

impl<T: Real> Num for Dual<T> {
    type FromStrRadixErr = T::FromStrRadixErr;
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        T::from_str_radix(str, radix).map(Dual::constant)
    }
}

impl<T: Real> FromPrimitive for Dual<T> {
    #[inline]
    fn from_i64(n: i64) -> Option<Self> {
        <T as NumCast>::from(n).map(Dual::constant)
    }
    #[inline]
    fn from_u64(n: u64) -> Option<Self> {
        <T as NumCast>::from(n).map(Dual::constant)
    }
    #[inline]
    fn from_f64(n: f64) -> Option<Self> {
        <T as NumCast>::from(n).map(Dual::constant)
    }
}

impl<T: Real> ToPrimitive for Dual<T> {
    #[inline]
    fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }
    #[inline]
    fn to_u64(&self) -> Option<u64> {
        self.value.to_u64()
    }
    #[inline]
    fn to_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }
}

impl<T: Real> NumCast for Dual<T> {
    #[inline]
    fn from<N: ToPrimitive>(n: N) -> Option<Self> {
        <T as NumCast>::from(n).map(Dual::constant)
    }
}

impl<T: Real> Signed for Dual<T> {
    #[inline]
    fn abs(&self) -> Self {
        Dual::abs(*self)
    }
    #[inline]
    fn abs_sub(&self, other: &Self) -> Self {
        if self.value > other.value {
            *self - *other
        } else {
            Self::zero()
        }
    }
    #[inline]
    fn signum(&self) -> Self {
        Dual::constant(self.value.signum())
    }
    #[inline]
    fn is_positive(&self) -> bool {
        self.value.is_sign_positive()
    }
    #[inline]
    fn is_negative(&self) -> bool {
        self.value.is_sign_negative()
    }
}

/// `fn NAME() -> Self` returning the constant lifted from `T`.
macro_rules! lifted_constants {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            fn $name() -> Self {
                Dual::constant(T::$name())
            }
        )*
    };
}

/// `fn NAME(self) -> bool` asked of the primal only.
macro_rules! primal_predicates {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            fn $name(self) -> bool {
                self.value.$name()
            }
        )*
    };
}

/// Unary methods defined on `Dual` itself.
macro_rules! inherent_unary {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            fn $name(self) -> Self {
                Dual::$name(self)
            }
        )*
    };
}

/// `fn NAME(self)` from the primal result `y = x.NAME()` and the derivative
/// written in terms of `x` and `y`.
macro_rules! chain_rules {
    ($($name:ident: |$x:ident, $y:ident| $derivative:expr;)*) => {
        $(
            #[inline]
            #[allow(unused_variables)]
            fn $name(self) -> Self {
                let $x = self.value;
                let $y = $x.$name();
                self.map($y, $derivative)
            }
        )*
    };
}

/// Piecewise-constant functions: zero tangent away from the jumps.
macro_rules! step_functions {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            fn $name(self) -> Self {
                Dual::constant(self.value.$name())
            }
        )*
    };
}

#[allow(non_snake_case)]
impl<T: Real> FloatConst for Dual<T> {
    lifted_constants!(
        E, FRAC_1_PI, FRAC_1_SQRT_2, FRAC_2_PI, FRAC_2_SQRT_PI, FRAC_PI_2, FRAC_PI_3,
        FRAC_PI_4, FRAC_PI_6, FRAC_PI_8, LN_10, LN_2, LOG10_E, LOG2_E, PI, SQRT_2, TAU,
        LOG10_2, LOG2_10,
    );
}

impl<T: Real> NumFloat for Dual<T> {
    lifted_constants!(
        nan,
        infinity,
        neg_infinity,
        neg_zero,
        min_value,
        min_positive_value,
        max_value,
        epsilon,
    );

    primal_predicates!(
        is_nan,
        is_infinite,
        is_finite,
        is_normal,
        is_sign_positive,
        is_sign_negative,
    );

    inherent_unary!(exp, ln, sqrt, sin, cos, sinh, cosh, tanh, abs);

    step_functions!(floor, ceil, round, trunc, signum);

    chain_rules! {
        fract: |x, y| T::one();
        recip: |x, y| -y * y;
        cbrt: |x, y| (y * y * T::from(3).unwrap()).recip();
        exp2: |x, y| y * T::LN_2();
        exp_m1: |x, y| y + T::one();
        log2: |x, y| (x * T::LN_2()).recip();
        log10: |x, y| (x * T::LN_10()).recip();
        ln_1p: |x, y| (x + T::one()).recip();
        tan: |x, y| T::one() + y * y;
        asin: |x, y| (T::one() - x * x).sqrt().recip();
        acos: |x, y| -(T::one() - x * x).sqrt().recip();
        atan: |x, y| (T::one() + x * x).recip();
        asinh: |x, y| (x * x + T::one()).sqrt().recip();
        acosh: |x, y| (x * x - T::one()).sqrt().recip();
        atanh: |x, y| (T::one() - x * x).recip();
    }

    fn classify(self) -> FpCategory {
        self.value.classify()
    }

    fn powi(self, n: i32) -> Self {
        Dual::powi(self, n)
    }

    /// The exponent's tangent only enters through `ln(base)`, so a constant
    /// exponent works for negative bases too.
    fn powf(self, p: Self) -> Self {
        let (x, y) = (self.value, self.value.powf(p.value));
        let mut tangent = p.value * x.powf(p.value - T::one()) * self.tangent;
        if p.tangent != T::zero() {
            tangent = tangent + y * x.ln() * p.tangent;
        }
        Dual::new(y, tangent)
    }

    fn log(self, base: Self) -> Self {
        self.ln() / base.ln()
    }

    fn mul_add(self, a: Self, b: Self) -> Self {
        Dual::new(
            self.value.mul_add(a.value, b.value),
            self.tangent * a.value + self.value * a.tangent + b.tangent,
        )
    }

    fn sin_cos(self) -> (Self, Self) {
        let (s, c) = self.value.sin_cos();
        (self.map(s, c), self.map(c, -s))
    }

    /// `self` is the ordinate: `atan2(y, x)`.
    fn atan2(self, x: Self) -> Self {
        let y = self;
        let r2 = y.value * y.value + x.value * x.value;
        Dual::new(
            y.value.atan2(x.value),
            (x.value * y.tangent - y.value * x.tangent) / r2,
        )
    }

    fn hypot(self, other: Self) -> Self {
        let h = self.value.hypot(other.value);
        Dual::new(h, (self.value * self.tangent + other.value * other.tangent) / h)
    }

    // Ties keep `self`, tangent included.
    fn max(self, other: Self) -> Self {
        if other.value > self.value {
            other
        } else {
            self
        }
    }

    fn min(self, other: Self) -> Self {
        if other.value < self.value {
            other
        } else {
            self
        }
    }

    fn abs_sub(self, other: Self) -> Self {
        <Self as Signed>::abs_sub(&self, &other)
    }

    fn integer_decode(self) -> (u64, i16, i8) {
        self.value.integer_decode()
    }

    // Linear maps: the tangent scales by the conversion factor.
    fn to_degrees(self) -> Self {
        Dual::new(self.value.to_degrees(), self.tangent * T::one().to_degrees())
    }

    fn to_radians(self) -> Self {
        Dual::new(self.value.to_radians(), self.tangent * T::one().to_radians())
    }
}
