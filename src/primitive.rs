//! The capability traits a [`Bvh`] asks its caller to provide.
//!
//! The tree itself never looks inside a primitive. Everything it needs to
//! know is supplied through four small traits: how to bound a primitive
//! ([`PrimitiveBound`]), how to partition a run of primitives into two
//! child sets ([`PrimitiveSplit`]), how to test a primitive against a ray
//! ([`PrimitiveCollide`]), and how to test boxes and primitives against an
//! arbitrary region ([`RangeQuery`]). All four are monomorphized at the
//! call site, so there is no dispatch cost on the hot paths.
//!
//! [`Bvh`]: crate::bvh::Bvh

use nalgebra::{Point, SVector};

use crate::aabb::Aabb;
use crate::scalar::BvhScalar;

/// Maps a primitive to its bounding box.
///
/// The returned box must contain the primitive entirely. Implementations
/// should be cheap: the build calls this many times per primitive, and
/// callers with expensive geometry usually precompute the box and store it
/// alongside the primitive.
///
/// Implemented automatically for closures and functions of the matching
/// shape, so a plain `|p: &P| -> Aabb<T, D>` works everywhere a bound is
/// expected.
pub trait PrimitiveBound<P, T: BvhScalar, const D: usize> {
    /// Returns the bounding box of `primitive`.
    fn bound(&self, primitive: &P) -> Aabb<T, D>;
}

impl<F, P, T: BvhScalar, const D: usize> PrimitiveBound<P, T, D> for F
where
    F: Fn(&P) -> Aabb<T, D>,
{
    fn bound(&self, primitive: &P) -> Aabb<T, D> {
        self(primitive)
    }
}

/// Partitions a contiguous run of primitives into two child sets.
///
/// Given the full primitive slice and the half-open range
/// `begin..end` to partition, an implementation may reorder the
/// primitives inside that range in place and must return a split index
/// `m` with `begin <= m <= end`, such that `begin..m` and `m..end` are
/// the two child sets. Returning `begin` or `end` signals that the range
/// could not be split, and the caller stores it as a single leaf.
///
/// Implementations must not touch primitives outside `begin..end`.
///
/// Ready-made strategies live in the [`split`](crate::split) module.
pub trait PrimitiveSplit<P, T: BvhScalar, const D: usize> {
    /// Reorders `primitives[begin..end]` and returns the split index.
    fn split(&self, primitives: &mut [P], begin: usize, end: usize) -> usize;
}

impl<F, P, T: BvhScalar, const D: usize> PrimitiveSplit<P, T, D> for F
where
    F: Fn(&mut [P], usize, usize) -> usize,
{
    fn split(&self, primitives: &mut [P], begin: usize, end: usize) -> usize {
        self(primitives, begin, end)
    }
}

/// Tests a primitive against a ray during [`Bvh::intersect`].
///
/// `dist` is the best hit distance found so far. An implementation must
/// return `true` only when it finds a hit strictly closer than `dist`,
/// and must then write the new distance through `dist`. Under that
/// contract the traversal reports the nearest hit; an implementation that
/// accepts any hit below some fixed threshold instead turns the same
/// traversal into an any-hit query.
///
/// The collide object may carry mutable state, for example the identity
/// of the closest primitive found so far.
///
/// [`Bvh::intersect`]: crate::bvh::Bvh::intersect
pub trait PrimitiveCollide<P, T: BvhScalar, const D: usize> {
    /// Tests `primitive` against the ray `(origin, direction)`.
    fn collide(
        &mut self,
        primitive: &P,
        origin: &Point<T, D>,
        direction: &SVector<T, D>,
        dist: &mut T,
    ) -> bool;
}

/// Tests boxes and primitives against an arbitrary region during
/// [`Bvh::search`].
///
/// The two methods implement a coarse/fine pair. [`visit_aabb`] is a
/// conservative pre-filter deciding whether a subtree is worth entering:
/// it may report `true` for a box that contains no matching primitive,
/// but must never report `false` for a box that does, or matches will be
/// missed. [`visit_primitive`] is the exact test, called once per
/// primitive in every leaf that passes the coarse filter.
///
/// The query object may carry mutable state to accumulate results, which
/// is why both methods take `&mut self`.
///
/// [`Bvh::search`]: crate::bvh::Bvh::search
/// [`visit_aabb`]: RangeQuery::visit_aabb
/// [`visit_primitive`]: RangeQuery::visit_primitive
pub trait RangeQuery<P, T: BvhScalar, const D: usize> {
    /// Coarse test: does the region possibly intersect this box?
    fn visit_aabb(&mut self, aabb: &Aabb<T, D>) -> bool;

    /// Exact test: does the region intersect this primitive?
    fn visit_primitive(&mut self, primitive: &P) -> bool;
}
