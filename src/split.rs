//! Built-in primitive partitioning strategies for BVH construction.
//!
//! All three strategies pick the split dimension the same way: they bound
//! the centroids of the primitives in the range and split along the axis
//! where those centroids are spread the widest. They differ in where the
//! cut lands:
//!
//! * [`EqualCountsSplit`] halves the range around the median centroid.
//!   It always succeeds on two or more primitives, so leaves never exceed
//!   the build threshold, but the resulting boxes can overlap badly.
//! * [`MiddlePointSplit`] cuts at the spatial midpoint of the centroid
//!   bounds. Cheap and usually decent; degenerates on clustered input,
//!   in which case it falls back to the median.
//! * [`SahSplit`] buckets the range and cuts where the surface area
//!   heuristic estimates the lowest traversal cost. The slowest build of
//!   the three and typically the fastest trees to query.
//!
//! A strategy object wraps the same [`PrimitiveBound`] the build uses, so
//! both see identical boxes for each primitive.

use std::cmp::Ordering;

use crate::aabb::Aabb;
use crate::primitive::{PrimitiveBound, PrimitiveSplit};
use crate::scalar::BvhScalar;
use crate::utils::{partition_in_place, Bucket};

/// Bounds the centroids of the primitive boxes in `primitives`.
fn centroid_aabb<P, T: BvhScalar, const D: usize, B: PrimitiveBound<P, T, D>>(
    primitives: &[P],
    bound: &B,
) -> Aabb<T, D> {
    let mut cbox = Aabb::empty();
    for primitive in primitives {
        cbox.grow_mut(&bound.bound(primitive).center());
    }
    cbox
}

/// Reorders `primitives[begin..end]` so that the median element along
/// `dim` sits at `begin + n / 2`, with no larger centroid coordinate to
/// its left and no smaller one to its right, and returns that index.
fn median_partition<P, T: BvhScalar, const D: usize, B: PrimitiveBound<P, T, D>>(
    primitives: &mut [P],
    begin: usize,
    end: usize,
    dim: usize,
    bound: &B,
) -> usize {
    let mid = (end - begin) / 2;
    primitives[begin..end].select_nth_unstable_by(mid, |a, b| {
        let ca = bound.bound(a).center()[dim];
        let cb = bound.bound(b).center()[dim];
        ca.partial_cmp(&cb).unwrap_or(Ordering::Equal)
    });
    begin + mid
}

/// Splits a range of primitives into two equally-sized halves around the
/// median centroid.
///
/// Succeeds on every range of two or more primitives, which makes it the
/// strategy of choice when leaves must respect the build threshold
/// exactly. Also serves as the fallback for the other strategies when
/// their partitions degenerate.
pub struct EqualCountsSplit<B> {
    bound: B,
}

impl<B> EqualCountsSplit<B> {
    /// Creates an [`EqualCountsSplit`] using `bound` to box primitives.
    pub fn new(bound: B) -> EqualCountsSplit<B> {
        EqualCountsSplit { bound }
    }
}

impl<P, T: BvhScalar, const D: usize, B: PrimitiveBound<P, T, D>> PrimitiveSplit<P, T, D>
    for EqualCountsSplit<B>
{
    fn split(&self, primitives: &mut [P], begin: usize, end: usize) -> usize {
        if end - begin < 2 {
            return end;
        }

        let cbox = centroid_aabb(&primitives[begin..end], &self.bound);
        let dim = cbox.largest_axis();

        median_partition(primitives, begin, end, dim, &self.bound)
    }
}

/// Splits a range of primitives at the spatial midpoint of their centroid
/// bounds.
///
/// Falls back to the equal-counts median when every centroid lands on the
/// same side of the midpoint.
pub struct MiddlePointSplit<B> {
    bound: B,
}

impl<B> MiddlePointSplit<B> {
    /// Creates a [`MiddlePointSplit`] using `bound` to box primitives.
    pub fn new(bound: B) -> MiddlePointSplit<B> {
        MiddlePointSplit { bound }
    }
}

impl<P, T: BvhScalar, const D: usize, B: PrimitiveBound<P, T, D>> PrimitiveSplit<P, T, D>
    for MiddlePointSplit<B>
{
    fn split(&self, primitives: &mut [P], begin: usize, end: usize) -> usize {
        if end - begin < 2 {
            return end;
        }

        let cbox = centroid_aabb(&primitives[begin..end], &self.bound);
        let dim = cbox.largest_axis();

        let two = T::one() + T::one();
        let mid = (cbox.min[dim] + cbox.max[dim]) / two;

        let pivot = begin
            + partition_in_place(&mut primitives[begin..end], |p| {
                self.bound.bound(p).center()[dim] < mid
            });

        if pivot == begin || pivot == end {
            median_partition(primitives, begin, end, dim, &self.bound)
        } else {
            pivot
        }
    }
}

/// Splits a range of primitives where the surface area heuristic expects
/// the cheapest traversal.
///
/// The range is distributed over uniform-width buckets along the split
/// dimension. Every boundary between a bucket prefix and the remaining
/// suffix is a candidate cut, costed as
/// `area(left) * count(left) + area(right) * count(right)`, and the
/// cheapest candidate wins. Falls back to the equal-counts median when
/// the winning cut leaves one side empty or when the centroids have no
/// extent to bucket over.
pub struct SahSplit<B> {
    bound: B,
    n_buckets: usize,
}

impl<B> SahSplit<B> {
    /// Creates a [`SahSplit`] with the default bucket count.
    pub fn new(bound: B) -> SahSplit<B> {
        Self::with_buckets(bound, 16)
    }

    /// Creates a [`SahSplit`] with `n_buckets` buckets. More buckets probe
    /// more candidate cuts per node at a linearly higher build cost; the
    /// default of 16 is plenty for typical scenes.
    pub fn with_buckets(bound: B, n_buckets: usize) -> SahSplit<B> {
        SahSplit {
            bound,
            n_buckets: n_buckets.max(2),
        }
    }
}

impl<P, T: BvhScalar, const D: usize, B: PrimitiveBound<P, T, D>> PrimitiveSplit<P, T, D>
    for SahSplit<B>
{
    fn split(&self, primitives: &mut [P], begin: usize, end: usize) -> usize {
        if end - begin < 2 {
            return end;
        }

        let cbox = centroid_aabb(&primitives[begin..end], &self.bound);
        let dim = cbox.largest_axis();
        let extent = cbox.size()[dim];

        // All centroids coincide along every axis; bucketing cannot
        // separate them.
        if !(extent > T::zero()) {
            return median_partition(primitives, begin, end, dim, &self.bound);
        }

        let n_buckets = self.n_buckets;
        let scale = T::from_usize(n_buckets).unwrap_or_else(T::max_value);
        let bucket_index = |p: &P| -> usize {
            let t = (self.bound.bound(p).center()[dim] - cbox.min[dim]) / extent;
            let b = (scale * t).to_usize().unwrap_or(0);
            b.min(n_buckets - 1)
        };

        let mut buckets = vec![Bucket::<T, D>::empty(); n_buckets];
        for primitive in &primitives[begin..end] {
            buckets[bucket_index(primitive)].add(&self.bound.bound(primitive));
        }

        // Cost every cut between buckets [0, b] and [b + 1, n_buckets).
        let mut min_cost = T::infinity();
        let mut split_bucket = 0;
        for b in 0..n_buckets - 1 {
            let (left, right) = buckets.split_at(b + 1);
            let l = left.iter().fold(Bucket::empty(), Bucket::join_bucket);
            let r = right.iter().fold(Bucket::empty(), Bucket::join_bucket);

            let l_count = T::from_usize(l.count).unwrap_or_else(T::max_value);
            let r_count = T::from_usize(r.count).unwrap_or_else(T::max_value);
            let cost = l.aabb.surface_area() * l_count + r.aabb.surface_area() * r_count;

            if cost < min_cost {
                min_cost = cost;
                split_bucket = b;
            }
        }

        let pivot = begin
            + partition_in_place(&mut primitives[begin..end], |p| {
                bucket_index(p) <= split_bucket
            });

        if pivot == begin || pivot == end {
            median_partition(primitives, begin, end, dim, &self.bound)
        } else {
            pivot
        }
    }
}
