//! The bounding volume hierarchy: build and traversal.

mod bvh_impl;
mod bvh_node;

pub use bvh_impl::*;
pub use bvh_node::*;
