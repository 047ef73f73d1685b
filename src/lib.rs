//! A crate which exports generic axis-aligned bounding boxes and
//! N-dimensional binary bounding volume hierarchies.
//!
//! ## About
//!
//! This crate can be used by applications which run spatial queries over
//! collections of geometric primitives: ray intersection tests and range
//! searches. For that purpose a binary BVH (Bounding Volume Hierarchy)
//! reduces the per-query cost from O(n) to O(log2(n)) at the price of
//! building the tree once in advance, which makes it a standard
//! acceleration structure for ray tracers, picking, and collision
//! detection.
//!
//! The tree is generic over the primitive type, the scalar type, and the
//! dimension. It never inspects primitives itself; the caller supplies a
//! bounding function when building and small callback objects when
//! querying (see the [`primitive`] module). Partitioning during the build
//! is pluggable as well, with three strategies included (see [`split`]).
//!
//! Trees are build-once, query-many-times: there is no insertion or
//! removal after construction, and queries never mutate the tree.
//!
//! ## Example
//!
//! ```
//! use ndbvh::aabb::Aabb;
//! use ndbvh::bvh::Bvh;
//! use ndbvh::primitive::RangeQuery;
//! use ndbvh::split::SahSplit;
//! use nalgebra::{Point3, Vector3};
//!
//! struct Sphere {
//!     position: Point3<f64>,
//!     radius: f64,
//! }
//!
//! fn sphere_aabb(sphere: &Sphere) -> Aabb<f64, 3> {
//!     let half_size = Vector3::new(sphere.radius, sphere.radius, sphere.radius);
//!     Aabb::with_bounds(sphere.position - half_size, sphere.position + half_size)
//! }
//!
//! let mut spheres = Vec::new();
//! for i in 0..1000u32 {
//!     let position = Point3::new(i as f64, i as f64, i as f64);
//!     let radius = (i % 10) as f64 + 1.0;
//!     spheres.push(Sphere { position, radius });
//! }
//!
//! let split = SahSplit::new(sphere_aabb);
//! let bvh = Bvh::build(spheres, &sphere_aabb, &split, 1);
//!
//! // Count the spheres whose box overlaps a region of interest.
//! struct Overlapping {
//!     region: Aabb<f64, 3>,
//!     found: usize,
//! }
//!
//! impl RangeQuery<Sphere, f64, 3> for Overlapping {
//!     fn visit_aabb(&mut self, aabb: &Aabb<f64, 3>) -> bool {
//!         self.region.intersects_aabb(aabb)
//!     }
//!
//!     fn visit_primitive(&mut self, sphere: &Sphere) -> bool {
//!         if self.region.intersects_aabb(&sphere_aabb(sphere)) {
//!             self.found += 1;
//!             true
//!         } else {
//!             false
//!         }
//!     }
//! }
//!
//! let mut query = Overlapping {
//!     region: Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0)),
//!     found: 0,
//! };
//!
//! assert!(bvh.search(&mut query));
//! assert!(query.found > 0);
//! ```

#![cfg_attr(feature = "bench", feature(test))]
#![warn(missing_docs)]

#[cfg(all(feature = "bench", test))]
extern crate test;

pub mod aabb;
pub mod bvh;
pub mod primitive;
pub mod scalar;
pub mod split;
mod utils;

#[cfg(test)]
mod testbase;
