//! The scalar abstraction used by every generic signature in this crate.

use nalgebra::{
    ClosedAddAssign, ClosedDivAssign, ClosedMulAssign, ClosedSubAssign, Scalar, SimdPartialOrd,
};
use num::{Float, FromPrimitive, ToPrimitive};

/// A trait alias bundling everything a coordinate scalar must provide.
///
/// Floating-point scalars only: the ray/box slab test depends on IEEE-754
/// division producing signed infinities for axis-parallel rays, so integer
/// coordinates are not supported. Implemented automatically for `f32` and
/// `f64`.
pub trait BvhScalar:
    Scalar
    + Copy
    + Float
    + FromPrimitive
    + ToPrimitive
    + ClosedAddAssign
    + ClosedSubAssign
    + ClosedMulAssign
    + ClosedDivAssign
    + SimdPartialOrd
{
}

impl<T> BvhScalar for T where
    T: Scalar
        + Copy
        + Float
        + FromPrimitive
        + ToPrimitive
        + ClosedAddAssign
        + ClosedSubAssign
        + ClosedMulAssign
        + ClosedDivAssign
        + SimdPartialOrd
{
}
