use std::ops::Index;

use nalgebra::{Point, SVector};

use crate::scalar::BvhScalar;
use crate::utils::{fast_max, largest_component_index};

/// An axis-aligned bounding box in `D`-dimensional space with scalar type
/// `T`, represented by its minimum and maximum corner points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb<T: BvhScalar, const D: usize> {
    /// Minimum coordinates.
    pub min: Point<T, D>,

    /// Maximum coordinates.
    pub max: Point<T, D>,
}

impl<T: BvhScalar, const D: usize> Aabb<T, D> {
    /// Creates a new [`Aabb`] with the given bounds.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// assert_eq!(aabb.min.x, -1.0);
    /// assert_eq!(aabb.max.x, 1.0);
    /// ```
    pub fn with_bounds(min: Point<T, D>, max: Point<T, D>) -> Aabb<T, D> {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`], the identity element of [`Aabb::join`]:
    /// joining any box with the empty box yields that box unchanged.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    ///
    /// let aabb = Aabb::<f32, 3>::empty();
    ///
    /// // The empty Aabb contains no points and is invalid.
    /// assert!(!aabb.is_valid());
    /// ```
    pub fn empty() -> Aabb<T, D> {
        Aabb {
            min: Point::from(SVector::repeat(T::infinity())),
            max: Point::from(SVector::repeat(T::neg_infinity())),
        }
    }

    /// Creates the smallest [`Aabb`] enclosing all the given points.
    /// Returns the empty box when `points` is empty.
    pub fn from_points(points: &[Point<T, D>]) -> Aabb<T, D> {
        let mut aabb = Aabb::empty();
        for point in points {
            aabb.grow_mut(point);
        }
        aabb
    }

    /// Returns true iff `min[i] <= max[i]` in every dimension.
    pub fn is_valid(&self) -> bool {
        (0..D).all(|i| self.min[i] <= self.max[i])
    }

    /// Strict variant of [`Aabb::is_valid`]: true iff `min[i] < max[i]`
    /// in every dimension, i.e. the box has positive extent everywhere.
    pub fn is_strictly_valid(&self) -> bool {
        (0..D).all(|i| self.min[i] < self.max[i])
    }

    /// Returns true if the point is inside the [`Aabb`], boundary included.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
    /// assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
    /// assert!(aabb.contains(&Point3::new(2.0, 2.0, 2.0)));
    /// assert!(!aabb.contains(&Point3::new(3.0, 1.0, 1.0)));
    /// ```
    pub fn contains(&self, p: &Point<T, D>) -> bool {
        (0..D).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// Strict variant of [`Aabb::contains`]: boundary points are outside.
    pub fn contains_strictly(&self, p: &Point<T, D>) -> bool {
        (0..D).all(|i| self.min[i] < p[i] && p[i] < self.max[i])
    }

    /// Returns true if `other` lies entirely inside this [`Aabb`],
    /// shared boundaries allowed.
    pub fn contains_aabb(&self, other: &Aabb<T, D>) -> bool {
        (0..D).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    /// Strict variant of [`Aabb::contains_aabb`].
    pub fn contains_aabb_strictly(&self, other: &Aabb<T, D>) -> bool {
        (0..D).all(|i| self.min[i] < other.min[i] && other.max[i] < self.max[i])
    }

    /// Returns true if this [`Aabb`] and `other` share at least one point,
    /// touching faces included.
    pub fn intersects_aabb(&self, other: &Aabb<T, D>) -> bool {
        (0..D).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Strict variant of [`Aabb::intersects_aabb`]: touching faces do not
    /// count as an intersection.
    pub fn intersects_aabb_strictly(&self, other: &Aabb<T, D>) -> bool {
        (0..D).all(|i| self.min[i] < other.max[i] && other.min[i] < self.max[i])
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`]
    /// and `other`.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let a = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(0.0, 0.0, 0.0));
    /// let b = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
    /// let joint = a.join(&b);
    ///
    /// assert_eq!(joint.min, Point3::new(-1.0, -1.0, -1.0));
    /// assert_eq!(joint.max, Point3::new(2.0, 2.0, 2.0));
    /// ```
    pub fn join(&self, other: &Aabb<T, D>) -> Aabb<T, D> {
        Aabb {
            min: Point::from(self.min.coords.inf(&other.min.coords)),
            max: Point::from(self.max.coords.sup(&other.max.coords)),
        }
    }

    /// Joins `other` into this [`Aabb`] in place.
    pub fn join_mut(&mut self, other: &Aabb<T, D>) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`]
    /// and the point `p`.
    pub fn grow(&self, p: &Point<T, D>) -> Aabb<T, D> {
        Aabb {
            min: Point::from(self.min.coords.inf(&p.coords)),
            max: Point::from(self.max.coords.sup(&p.coords)),
        }
    }

    /// Grows this [`Aabb`] to contain the point `p` in place.
    pub fn grow_mut(&mut self, p: &Point<T, D>) {
        *self = self.grow(p);
    }

    /// Returns the intersection of this [`Aabb`] and `other`: the largest
    /// box contained in both. The result is invalid when the two boxes are
    /// disjoint; check with [`Aabb::is_valid`].
    pub fn intersection(&self, other: &Aabb<T, D>) -> Aabb<T, D> {
        Aabb {
            min: Point::from(self.min.coords.sup(&other.min.coords)),
            max: Point::from(self.max.coords.inf(&other.max.coords)),
        }
    }

    /// Returns the center point of the [`Aabb`].
    pub fn center(&self) -> Point<T, D> {
        let two = T::one() + T::one();
        self.min + self.size() / two
    }

    /// Returns the size of this [`Aabb`] in all dimensions.
    pub fn size(&self) -> SVector<T, D> {
        self.max - self.min
    }

    /// Returns the index of the dimension along which this [`Aabb`] is
    /// widest. Ties resolve to the smallest index.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 5.0, 3.0));
    /// assert_eq!(aabb.largest_axis(), 1);
    /// ```
    pub fn largest_axis(&self) -> usize {
        largest_component_index(&self.size())
    }

    /// Returns the largest component of [`Aabb::size`].
    pub fn max_size(&self) -> T {
        let size = self.size();
        let mut result = T::neg_infinity();
        for i in 0..D {
            result = fast_max(result, size[i]);
        }
        result
    }

    /// Returns the total surface area of this [`Aabb`]:
    /// twice the sum over each dimension of the product of all other
    /// dimensions' sizes. For `D = 3` this is the usual
    /// `2 * (dx * dy + dx * dz + dy * dz)`; for `D = 2` it degenerates to
    /// the perimeter `2 * (dx + dy)`.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use nalgebra::{Point2, Point3};
    ///
    /// let cube = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
    /// assert_eq!(cube.surface_area(), 24.0);
    ///
    /// let rect = Aabb::with_bounds(Point2::new(0.0, 0.0), Point2::new(2.0, 3.0));
    /// assert_eq!(rect.surface_area(), 10.0);
    /// ```
    pub fn surface_area(&self) -> T {
        let size = self.size();
        let two = T::one() + T::one();
        let mut total = T::zero();
        for i in 0..D {
            let mut side = T::one();
            for j in 0..D {
                if j != i {
                    side = side * size[j];
                }
            }
            total = total + side;
        }
        total * two
    }

    /// Returns the volume of this [`Aabb`]: the product of its sizes in
    /// all dimensions.
    pub fn volume(&self) -> T {
        let size = self.size();
        let mut volume = T::one();
        for i in 0..D {
            volume = volume * size[i];
        }
        volume
    }
}

/// Make [`Aabb`]s indexable. `aabb[0]` gives a reference to the minimum
/// bound. All other indices return a reference to the maximum bound.
impl<T: BvhScalar, const D: usize> Index<usize> for Aabb<T, D> {
    type Output = Point<T, D>;

    fn index(&self, index: usize) -> &Point<T, D> {
        if index == 0 {
            &self.min
        } else {
            &self.max
        }
    }
}
