//! Axis Aligned Bounding Boxes.

mod aabb_impl;
mod intersection;

pub use aabb_impl::*;
