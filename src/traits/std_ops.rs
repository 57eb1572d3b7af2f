use std::cmp::Ordering;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use crate::arena::{self, ArenaThreadLocal, OpKind};
use crate::dual::Dual;
use crate::float::{Float, Real};
use crate::var::Var;

/// `x op= y` as `x = x op y` for a generic wrapper `$ty<_: $bound>`.
macro_rules! assign_via_binop {
    ($ty:ident: $bound:path; $($Assign:ident::$assign:ident => $op:tt),* $(,)?) => {
        $(
            impl<X: $bound> $Assign for $ty<X> {
                #[inline]
                fn $assign(&mut self, rhs: Self) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

/// Comparisons look at the primal value only.
macro_rules! compare_by_value {
    ($ty:ident: $bound:path) => {
        impl<X: $bound> PartialEq for $ty<X> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl<X: $bound> PartialOrd for $ty<X> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                self.value.partial_cmp(&other.value)
            }
        }
    };
}

// ── Dual<T> ──

impl<T: Real> Add for Dual<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Dual::new(self.value + rhs.value, self.tangent + rhs.tangent)
    }
}

impl<T: Real> Sub for Dual<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Dual::new(self.value - rhs.value, self.tangent - rhs.tangent)
    }
}

impl<T: Real> Mul for Dual<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Dual::new(
            self.value * rhs.value,
            self.tangent * rhs.value + self.value * rhs.tangent,
        )
    }
}

/// Unchecked, like the `Var` operator; see [`crate::functions::divide`].
impl<T: Real> Div for Dual<T> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q = self.value / rhs.value;
        Dual::new(q, (self.tangent - q * rhs.tangent) / rhs.value)
    }
}

impl<T: Real> Neg for Dual<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Dual::new(-self.value, -self.tangent)
    }
}

/// `x mod y` is `x - trunc(x / y) y`; the truncation is locally constant, so
/// away from jumps only the `x` tangent survives, plus `-trunc(x / y)` of `y`'s.
impl<T: Real> Rem for Dual<T> {
    type Output = Self;
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        let quotient = (self.value / rhs.value).trunc();
        Dual::new(
            self.value % rhs.value,
            self.tangent - quotient * rhs.tangent,
        )
    }
}

assign_via_binop!(Dual: Real;
    AddAssign::add_assign => +,
    SubAssign::sub_assign => -,
    MulAssign::mul_assign => *,
    DivAssign::div_assign => /,
    RemAssign::rem_assign => %,
);

compare_by_value!(Dual: Real);

/// Mixed arithmetic between `Dual<f>` and a plain `f`, which has no tangent.
macro_rules! dual_with_float {
    ($($f:ty),*) => {
        $(
            impl Add<$f> for Dual<$f> {
                type Output = Self;
                #[inline]
                fn add(self, c: $f) -> Self {
                    Dual::new(self.value + c, self.tangent)
                }
            }

            impl Add<Dual<$f>> for $f {
                type Output = Dual<$f>;
                #[inline]
                fn add(self, d: Dual<$f>) -> Dual<$f> {
                    d + self
                }
            }

            impl Sub<$f> for Dual<$f> {
                type Output = Self;
                #[inline]
                fn sub(self, c: $f) -> Self {
                    Dual::new(self.value - c, self.tangent)
                }
            }

            impl Sub<Dual<$f>> for $f {
                type Output = Dual<$f>;
                #[inline]
                fn sub(self, d: Dual<$f>) -> Dual<$f> {
                    Dual::new(self - d.value, -d.tangent)
                }
            }

            impl Mul<$f> for Dual<$f> {
                type Output = Self;
                #[inline]
                fn mul(self, c: $f) -> Self {
                    Dual::new(self.value * c, self.tangent * c)
                }
            }

            impl Mul<Dual<$f>> for $f {
                type Output = Dual<$f>;
                #[inline]
                fn mul(self, d: Dual<$f>) -> Dual<$f> {
                    d * self
                }
            }

            impl Div<$f> for Dual<$f> {
                type Output = Self;
                #[inline]
                fn div(self, c: $f) -> Self {
                    Dual::new(self.value / c, self.tangent / c)
                }
            }

            impl Div<Dual<$f>> for $f {
                type Output = Dual<$f>;
                #[inline]
                fn div(self, d: Dual<$f>) -> Dual<$f> {
                    let q = self / d.value;
                    Dual::new(q, -q * d.tangent / d.value)
                }
            }
        )*
    };
}

dual_with_float!(f32, f64);

// ── Var<F> ──
//
// Every operator records one node on the active arena. Mixed operations with
// a plain float record a one-operand `Affine` node.

#[inline]
fn binary<F: ArenaThreadLocal>(
    kind: OpKind,
    lhs: Var<F>,
    d_lhs: F,
    rhs: Var<F>,
    d_rhs: F,
    value: F,
) -> Var<F> {
    arena::with_active_arena(|a| a.push_binary(kind, lhs, d_lhs, rhs, d_rhs, value))
}

#[inline]
fn unary<F: ArenaThreadLocal>(kind: OpKind, x: Var<F>, dx: F, value: F) -> Var<F> {
    arena::with_active_arena(|a| a.push_unary(kind, x, dx, value))
}

impl<F: ArenaThreadLocal> Add for Var<F> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        binary(OpKind::Add, self, F::one(), rhs, F::one(), self.value + rhs.value)
    }
}

impl<F: ArenaThreadLocal> Sub for Var<F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        binary(OpKind::Sub, self, F::one(), rhs, -F::one(), self.value - rhs.value)
    }
}

impl<F: ArenaThreadLocal> Mul for Var<F> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        binary(OpKind::Mul, self, rhs.value, rhs, self.value, self.value * rhs.value)
    }
}

/// Unchecked: a zero divisor records infinite partials. [`functions::divide`]
/// rejects it with a domain error instead.
///
/// [`functions::divide`]: crate::functions::divide
impl<F: ArenaThreadLocal> Div for Var<F> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q = self.value / rhs.value;
        binary(OpKind::Div, self, rhs.value.recip(), rhs, -q / rhs.value, q)
    }
}

impl<F: ArenaThreadLocal> Neg for Var<F> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        unary(OpKind::Neg, self, -F::one(), -self.value)
    }
}

impl<F: ArenaThreadLocal> Rem for Var<F> {
    type Output = Self;
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        let quotient = (self.value / rhs.value).trunc();
        binary(OpKind::Rem, self, F::one(), rhs, -quotient, self.value % rhs.value)
    }
}

assign_via_binop!(Var: ArenaThreadLocal;
    AddAssign::add_assign => +,
    SubAssign::sub_assign => -,
    MulAssign::mul_assign => *,
    DivAssign::div_assign => /,
    RemAssign::rem_assign => %,
);

compare_by_value!(Var: Float);

macro_rules! var_with_float {
    ($($f:ty),*) => {
        $(
            impl Add<$f> for Var<$f> {
                type Output = Self;
                #[inline]
                fn add(self, c: $f) -> Self {
                    unary(OpKind::Affine, self, 1.0, self.value + c)
                }
            }

            impl Add<Var<$f>> for $f {
                type Output = Var<$f>;
                #[inline]
                fn add(self, v: Var<$f>) -> Var<$f> {
                    v + self
                }
            }

            impl Sub<$f> for Var<$f> {
                type Output = Self;
                #[inline]
                fn sub(self, c: $f) -> Self {
                    unary(OpKind::Affine, self, 1.0, self.value - c)
                }
            }

            impl Sub<Var<$f>> for $f {
                type Output = Var<$f>;
                #[inline]
                fn sub(self, v: Var<$f>) -> Var<$f> {
                    unary(OpKind::Affine, v, -1.0, self - v.value)
                }
            }

            impl Mul<$f> for Var<$f> {
                type Output = Self;
                #[inline]
                fn mul(self, c: $f) -> Self {
                    unary(OpKind::Affine, self, c, self.value * c)
                }
            }

            impl Mul<Var<$f>> for $f {
                type Output = Var<$f>;
                #[inline]
                fn mul(self, v: Var<$f>) -> Var<$f> {
                    v * self
                }
            }

            impl Div<$f> for Var<$f> {
                type Output = Self;
                #[inline]
                fn div(self, c: $f) -> Self {
                    unary(OpKind::Affine, self, c.recip(), self.value / c)
                }
            }

            impl Div<Var<$f>> for $f {
                type Output = Var<$f>;
                #[inline]
                fn div(self, v: Var<$f>) -> Var<$f> {
                    let q = self / v.value;
                    unary(OpKind::Affine, v, -q / v.value, q)
                }
            }
        )*
    };
}

var_with_float!(f32, f64);
