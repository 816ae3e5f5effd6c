//! The named pointwise functions shared by `Matrix` and `Vector`.
//!
//! Each entry expands to `pointwise_<name>(&self) -> Self` and
//! `pointwise_<name>_into(&self, result)`, both forwarding a per-element
//! kernel from [`Scalar`](crate::core::Scalar) to the type's own
//! `pointwise_unary` / `pointwise_unary_into`. Adding a pointwise function
//! means adding one line here.

macro_rules! pointwise_family {
    () => {
        $crate::utils::pointwise::pointwise_family! {
            /// e^x of every element.
            pointwise_exp, pointwise_exp_into => |x: T| x.exp();
            /// Natural logarithm of every element.
            pointwise_log, pointwise_log_into => |x: T| x.ln();
            /// Base-10 logarithm of every element.
            pointwise_log10, pointwise_log10_into => |x: T| x.log10();
            pointwise_sqrt, pointwise_sqrt_into => |x: T| x.sqrt();
            pointwise_sin, pointwise_sin_into => |x: T| x.sin();
            pointwise_cos, pointwise_cos_into => |x: T| x.cos();
            pointwise_tan, pointwise_tan_into => |x: T| x.tan();
            pointwise_asin, pointwise_asin_into => |x: T| x.asin();
            pointwise_acos, pointwise_acos_into => |x: T| x.acos();
            pointwise_atan, pointwise_atan_into => |x: T| x.atan();
            pointwise_sinh, pointwise_sinh_into => |x: T| x.sinh();
            pointwise_cosh, pointwise_cosh_into => |x: T| x.cosh();
            pointwise_tanh, pointwise_tanh_into => |x: T| x.tanh();
            /// Absolute value (modulus for complex elements).
            pointwise_abs, pointwise_abs_into => |x: T| T::from_real(x.magnitude());
            pointwise_floor, pointwise_floor_into => |x: T| x.floor();
            pointwise_ceiling, pointwise_ceiling_into => |x: T| x.ceiling();
            pointwise_round, pointwise_round_into => |x: T| x.round();
            /// -1, 0 or 1 per element; `z/|z|` for complex.
            pointwise_sign, pointwise_sign_into => |x: T| x.sign();
        }
    };
    ($( $(#[$doc:meta])* $name:ident, $name_into:ident => $kernel:expr; )*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Self {
                self.pointwise_unary($kernel)
            }

            pub fn $name_into(&self, result: &mut Self) -> $crate::error::Result<()> {
                self.pointwise_unary_into($kernel, result)
            }
        )*
    };
}

pub(crate) use pointwise_family;
