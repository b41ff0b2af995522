//! Numeric type hierarchy for generic math.
//!
//! The trait hierarchy is:
//! ```text
//! Scalar
//!   └── Float
//!         └── Real  (f32, f64)
//! ```
//!
//! All tensor operations are generic over [`Scalar`]; the linear algebra
//! routines require [`Float`]. The eigendecomposition engine is bounded on
//! [`Real`] because it is a real-arithmetic algorithm: complex eigenvalues
//! are represented as (re, im) pairs of the real element type.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Scalar — the root trait for every numeric element type
// ---------------------------------------------------------------------------

/// Base trait for all numeric types storable in a tensor.
///
/// This intentionally does *not* require floating-point operations so that
/// integer tensors remain first-class citizens.
pub trait Scalar:
    Copy
    + Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Default
    + 'static
{
    /// The additive identity (`0`).
    fn zero() -> Self;

    /// The multiplicative identity (`1`).
    fn one() -> Self;

    /// Convert from `usize` (used for index / shape arithmetic).
    fn from_usize(v: usize) -> Self;
}

// ---------------------------------------------------------------------------
// Float — adds operations that only make sense for floating-point numbers
// ---------------------------------------------------------------------------

/// Trait for floating-point scalar types (`f32`, `f64`).
pub trait Float: Scalar + Neg<Output = Self> {
    /// Machine epsilon.
    fn epsilon() -> Self;

    /// Positive infinity.
    fn infinity() -> Self;

    /// Not-a-number.
    fn nan() -> Self;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn is_nan(self) -> bool;
    fn is_finite(self) -> bool;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;

    /// Convert from an `f64` literal (used for constants).
    fn from_f64(v: f64) -> Self;
}

/// Trait alias for real-valued floats (non-complex).
///
/// Identical to [`Float`] today; exists so that future complex-number support
/// can distinguish `Float` (the full set) from `Real` (the reals), and so the
/// eigendecomposition engine states its real-arithmetic requirement in its
/// bounds.
pub trait Real: Float {}

// ===========================================================================
// Blanket / macro implementations
// ===========================================================================

macro_rules! impl_scalar_float {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline]
            fn zero() -> Self {
                0.0
            }
            #[inline]
            fn one() -> Self {
                1.0
            }
            #[inline]
            fn from_usize(v: usize) -> Self {
                v as Self
            }
        }

        impl Float for $ty {
            #[inline]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
            #[inline]
            fn infinity() -> Self {
                <$ty>::INFINITY
            }
            #[inline]
            fn nan() -> Self {
                <$ty>::NAN
            }
            #[inline]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }
            #[inline]
            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }
            #[inline]
            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as Self
            }
        }

        impl Real for $ty {}
    };
}

impl_scalar_float!(f32);
impl_scalar_float!(f64);

macro_rules! impl_scalar_int {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline]
            fn zero() -> Self {
                0
            }
            #[inline]
            fn one() -> Self {
                1
            }
            #[inline]
            #[allow(clippy::cast_possible_wrap)]
            fn from_usize(v: usize) -> Self {
                v as Self
            }
        }
    };
}

impl_scalar_int!(i8);
impl_scalar_int!(i16);
impl_scalar_int!(i32);
impl_scalar_int!(i64);
impl_scalar_int!(u8);
impl_scalar_int!(u16);
impl_scalar_int!(u32);
impl_scalar_int!(u64);
impl_scalar_int!(usize);
impl_scalar_int!(isize);
