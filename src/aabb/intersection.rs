//! The ray/box intersection test used on the hot path of BVH traversal.

use nalgebra::{Point, SVector};

use crate::aabb::Aabb;
use crate::scalar::BvhScalar;
use crate::utils::{fast_max, fast_min};

impl<T: BvhScalar, const D: usize> Aabb<T, D> {
    /// Tests a ray against this [`Aabb`] with the slab method, using the
    /// precomputed elementwise inverse of the ray direction.
    ///
    /// `dist` is the current best hit distance along the ray; a box whose
    /// near intersection lies at or beyond `dist` reports no intersection,
    /// which lets a traversal prune subtrees that cannot improve on an
    /// already-found hit.
    ///
    /// When a direction component is zero, its inverse is an IEEE-754
    /// signed infinity. The two slab distances for that dimension are then
    /// infinities of opposite sign iff the origin lies between the slabs,
    /// leaving the running interval unchanged, and infinities of the same
    /// sign otherwise, which empties the interval and fails the test. No
    /// explicit zero check is needed.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(2.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0));
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(1.0, 0.0, 0.0);
    /// let inv_direction = direction.map(|x| 1.0 / x);
    ///
    /// assert!(aabb.intersects_ray(&origin, &inv_direction, f64::INFINITY));
    /// // A best hit closer than the box culls it.
    /// assert!(!aabb.intersects_ray(&origin, &inv_direction, 1.5));
    /// ```
    pub fn intersects_ray(
        &self,
        origin: &Point<T, D>,
        inv_direction: &SVector<T, D>,
        dist: T,
    ) -> bool {
        let k0 = (self.min - origin).component_mul(inv_direction);
        let k1 = (self.max - origin).component_mul(inv_direction);

        let mut t0 = fast_min(k0[0], k1[0]);
        let mut t1 = fast_max(k0[0], k1[0]);
        for i in 1..D {
            t0 = fast_max(t0, fast_min(k0[i], k1[i]));
            t1 = fast_min(t1, fast_max(k0[i], k1[i]));
        }

        t1 > T::zero() && t1 >= t0 && dist > t0
    }
}
