//! Element traits for the four supported numeric types.
//!
//! `Scalar` is sealed: it is implemented for `f64`, `f32`, `Complex<f64>` and
//! `Complex<f32>` only. Every element type gets its own builder registry slot,
//! so resolving the factory for a type is a static dispatch, never a runtime
//! type switch.

use std::fmt::{self, Debug, Display};
use std::hash::Hasher;
use std::iter::Sum;
use std::ops::Neg;
use std::str::FromStr;

use faer::traits::ComplexField;
use num_complex::Complex;
use num_traits::NumAssign;
use rand::Rng;
use rand::distributions::Distribution;

use crate::context::registry::RegistrySlot;
use crate::error::{LinalgError, Result};

/// The closed set of element kinds a matrix or vector can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 64-bit real (`f64`)
    Real64,
    /// 32-bit real (`f32`)
    Real32,
    /// Complex with 64-bit parts
    Complex64,
    /// Complex with 32-bit parts
    Complex32,
}

impl ElementType {
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Real64 => "f64",
            ElementType::Real32 => "f32",
            ElementType::Complex64 => "complex64",
            ElementType::Complex32 => "complex32",
        }
    }

    pub fn is_complex(self) -> bool {
        matches!(self, ElementType::Complex64 | ElementType::Complex32)
    }

    pub fn is_single_precision(self) -> bool {
        matches!(self, ElementType::Real32 | ElementType::Complex32)
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f64" | "double" | "real64" => Ok(ElementType::Real64),
            "f32" | "single" | "float" | "real32" => Ok(ElementType::Real32),
            "complex64" | "complex" | "c64" => Ok(ElementType::Complex64),
            "complex32" | "c32" => Ok(ElementType::Complex32),
            other => Err(LinalgError::unsupported(format!(
                "element type `{other}` (supported: f64, f32, complex64, complex32)"
            ))),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for num_complex::Complex<f64> {}
    impl Sealed for num_complex::Complex<f32> {}
}

/// A matrix/vector element.
///
/// Besides the `Zero`/`One` constants from `num-traits`, this carries every
/// per-element kernel the pointwise operations are built from.
pub trait Scalar:
    sealed::Sealed
    + Copy
    + PartialEq
    + Debug
    + Display
    + Send
    + Sync
    + 'static
    + NumAssign
    + Neg<Output = Self>
    + Sum
{
    /// Real counterpart (`Self` for reals, the part type for complex).
    type Real: RealScalar;

    /// The same element as faer's dense kernels name it.
    type Field: ComplexField<Real = Self::Real> + Copy;

    const ELEMENT_TYPE: ElementType;

    fn into_field(self) -> Self::Field;
    fn from_field(v: Self::Field) -> Self;

    fn from_real(r: Self::Real) -> Self;
    fn from_f64(v: f64) -> Self;
    fn real(self) -> Self::Real;
    fn imaginary(self) -> Self::Real;
    fn conjugate(self) -> Self;
    /// Absolute value (modulus for complex).
    fn magnitude(self) -> Self::Real;
    fn magnitude_squared(self) -> Self::Real;
    fn is_nan(self) -> bool;
    fn is_finite(self) -> bool;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn log10(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn pow(self, exponent: Self) -> Self;
    fn floor(self) -> Self;
    fn ceiling(self) -> Self;
    fn round(self) -> Self;
    /// -1, 0 or 1 for reals; `z / |z|` for complex (0 at 0).
    fn sign(self) -> Self;

    /// Euclidean modulus (result has the sign of the divisor).
    fn modulus(self, divisor: Self) -> Result<Self>;
    /// Truncated remainder (result has the sign of the dividend).
    fn remainder(self, divisor: Self) -> Result<Self>;

    /// Draw an element from a continuous distribution. Complex elements draw
    /// real and imaginary parts independently.
    fn sample<D, R>(distribution: &D, rng: &mut R) -> Self
    where
        D: Distribution<f64> + ?Sized,
        R: Rng + ?Sized;

    /// Feed the value into a hasher; `-0` and `+0` hash alike.
    fn hash_value<H: Hasher>(self, state: &mut H);

    #[doc(hidden)]
    fn registry_slot() -> &'static RegistrySlot<Self>;
}

/// Real element types (`f64`, `f32`).
pub trait RealScalar: Scalar<Real = Self> + PartialOrd {
    fn epsilon() -> Self;
    fn infinity() -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    fn atan2(self, other: Self) -> Self;
    fn to_f64(self) -> f64;
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_real_scalar {
    ($t:ty, $element:expr, $bits:ident) => {
        impl Scalar for $t {
            type Real = $t;
            type Field = $t;
            const ELEMENT_TYPE: ElementType = $element;

            #[inline] fn into_field(self) -> $t { self }
            #[inline] fn from_field(v: $t) -> $t { v }

            #[inline] fn from_real(r: $t) -> $t { r }
            #[inline] fn from_f64(v: f64) -> $t { v as $t }
            #[inline] fn real(self) -> $t { self }
            #[inline] fn imaginary(self) -> $t { 0.0 }
            #[inline] fn conjugate(self) -> $t { self }
            #[inline] fn magnitude(self) -> $t { self.abs() }
            #[inline] fn magnitude_squared(self) -> $t { self * self }
            #[inline] fn is_nan(self) -> bool { <$t>::is_nan(self) }
            #[inline] fn is_finite(self) -> bool { <$t>::is_finite(self) }

            #[inline] fn sqrt(self) -> $t { <$t>::sqrt(self) }
            #[inline] fn exp(self) -> $t { <$t>::exp(self) }
            #[inline] fn ln(self) -> $t { <$t>::ln(self) }
            #[inline] fn log10(self) -> $t { <$t>::log10(self) }
            #[inline] fn sin(self) -> $t { <$t>::sin(self) }
            #[inline] fn cos(self) -> $t { <$t>::cos(self) }
            #[inline] fn tan(self) -> $t { <$t>::tan(self) }
            #[inline] fn asin(self) -> $t { <$t>::asin(self) }
            #[inline] fn acos(self) -> $t { <$t>::acos(self) }
            #[inline] fn atan(self) -> $t { <$t>::atan(self) }
            #[inline] fn sinh(self) -> $t { <$t>::sinh(self) }
            #[inline] fn cosh(self) -> $t { <$t>::cosh(self) }
            #[inline] fn tanh(self) -> $t { <$t>::tanh(self) }
            #[inline] fn pow(self, exponent: $t) -> $t { <$t>::powf(self, exponent) }
            #[inline] fn floor(self) -> $t { <$t>::floor(self) }
            #[inline] fn ceiling(self) -> $t { <$t>::ceil(self) }
            #[inline] fn round(self) -> $t { <$t>::round(self) }

            #[inline]
            fn sign(self) -> $t {
                if self == 0.0 || <$t>::is_nan(self) { self } else { <$t>::signum(self) }
            }

            fn modulus(self, divisor: $t) -> Result<$t> {
                Ok(((self % divisor) + divisor) % divisor)
            }

            fn remainder(self, divisor: $t) -> Result<$t> {
                Ok(self % divisor)
            }

            fn sample<D, R>(distribution: &D, rng: &mut R) -> $t
            where
                D: Distribution<f64> + ?Sized,
                R: Rng + ?Sized,
            {
                distribution.sample(rng) as $t
            }

            fn hash_value<H: Hasher>(self, state: &mut H) {
                let v: $t = if self == 0.0 { 0.0 } else { self };
                state.$bits(v.to_bits());
            }

            fn registry_slot() -> &'static RegistrySlot<$t> {
                static SLOT: RegistrySlot<$t> = RegistrySlot::new();
                &SLOT
            }
        }

        impl RealScalar for $t {
            #[inline] fn epsilon() -> $t { <$t>::EPSILON }
            #[inline] fn infinity() -> $t { <$t>::INFINITY }
            #[inline] fn max(self, other: $t) -> $t { <$t>::max(self, other) }
            #[inline] fn min(self, other: $t) -> $t { <$t>::min(self, other) }
            #[inline] fn atan2(self, other: $t) -> $t { <$t>::atan2(self, other) }
            #[inline] fn to_f64(self) -> f64 { self as f64 }
            #[inline] fn from_usize(n: usize) -> $t { n as $t }
        }
    };
}

impl_real_scalar!(f64, ElementType::Real64, write_u64);
impl_real_scalar!(f32, ElementType::Real32, write_u32);

macro_rules! impl_complex_scalar {
    ($r:ty, $element:expr, $bits:ident) => {
        impl Scalar for Complex<$r> {
            type Real = $r;
            type Field = Complex<$r>;
            const ELEMENT_TYPE: ElementType = $element;

            #[inline] fn into_field(self) -> Self { self }
            #[inline] fn from_field(v: Self) -> Self { v }

            #[inline] fn from_real(r: $r) -> Self { Complex::new(r, 0.0) }
            #[inline] fn from_f64(v: f64) -> Self { Complex::new(v as $r, 0.0) }
            #[inline] fn real(self) -> $r { self.re }
            #[inline] fn imaginary(self) -> $r { self.im }
            #[inline] fn conjugate(self) -> Self { self.conj() }
            #[inline] fn magnitude(self) -> $r { self.norm() }
            #[inline] fn magnitude_squared(self) -> $r { self.norm_sqr() }
            #[inline] fn is_nan(self) -> bool { Complex::is_nan(self) }
            #[inline] fn is_finite(self) -> bool { Complex::is_finite(self) }

            #[inline] fn sqrt(self) -> Self { Complex::sqrt(self) }
            #[inline] fn exp(self) -> Self { Complex::exp(self) }
            #[inline] fn ln(self) -> Self { Complex::ln(self) }
            #[inline] fn log10(self) -> Self { Complex::ln(self).unscale((10.0 as $r).ln()) }
            #[inline] fn sin(self) -> Self { Complex::sin(self) }
            #[inline] fn cos(self) -> Self { Complex::cos(self) }
            #[inline] fn tan(self) -> Self { Complex::tan(self) }
            #[inline] fn asin(self) -> Self { Complex::asin(self) }
            #[inline] fn acos(self) -> Self { Complex::acos(self) }
            #[inline] fn atan(self) -> Self { Complex::atan(self) }
            #[inline] fn sinh(self) -> Self { Complex::sinh(self) }
            #[inline] fn cosh(self) -> Self { Complex::cosh(self) }
            #[inline] fn tanh(self) -> Self { Complex::tanh(self) }
            #[inline] fn pow(self, exponent: Self) -> Self { Complex::powc(self, exponent) }
            #[inline] fn floor(self) -> Self { Complex::new(self.re.floor(), self.im.floor()) }
            #[inline] fn ceiling(self) -> Self { Complex::new(self.re.ceil(), self.im.ceil()) }
            #[inline] fn round(self) -> Self { Complex::new(self.re.round(), self.im.round()) }

            #[inline]
            fn sign(self) -> Self {
                let n = self.norm();
                if n == 0.0 { self } else { self.unscale(n) }
            }

            fn modulus(self, _divisor: Self) -> Result<Self> {
                Err(LinalgError::unsupported("modulus of complex elements"))
            }

            fn remainder(self, _divisor: Self) -> Result<Self> {
                Err(LinalgError::unsupported("remainder of complex elements"))
            }

            fn sample<D, R>(distribution: &D, rng: &mut R) -> Self
            where
                D: Distribution<f64> + ?Sized,
                R: Rng + ?Sized,
            {
                let re = distribution.sample(rng) as $r;
                let im = distribution.sample(rng) as $r;
                Complex::new(re, im)
            }

            fn hash_value<H: Hasher>(self, state: &mut H) {
                let re: $r = if self.re == 0.0 { 0.0 } else { self.re };
                let im: $r = if self.im == 0.0 { 0.0 } else { self.im };
                state.$bits(re.to_bits());
                state.$bits(im.to_bits());
            }

            fn registry_slot() -> &'static RegistrySlot<Self> {
                static SLOT: RegistrySlot<Complex<$r>> = RegistrySlot::new();
                &SLOT
            }
        }
    };
}

impl_complex_scalar!(f64, ElementType::Complex64, write_u64);
impl_complex_scalar!(f32, ElementType::Complex32, write_u32);

/// The larger of `a` and `b`, or NaN when either is NaN.
#[inline]
pub(crate) fn nan_max<R: RealScalar>(a: R, b: R) -> R {
    if a.is_nan() || b.is_nan() {
        if a.is_nan() { a } else { b }
    } else if b > a {
        b
    } else {
        a
    }
}
