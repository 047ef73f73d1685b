//! This module defines [`Bvh`] and the functions for building and
//! traversing it.
//!
//! [`Bvh`]: struct.Bvh.html

use nalgebra::{Point, SVector};

use crate::aabb::Aabb;
use crate::bvh::BvhNode;
use crate::primitive::{PrimitiveBound, PrimitiveCollide, PrimitiveSplit, RangeQuery};
use crate::scalar::BvhScalar;

/// The [`Bvh`] data structure: a binary tree of [`Aabb`]s over a sequence
/// of caller-supplied primitives.
///
/// A tree is built once and queried many times. The build reorders the
/// primitives so that each leaf owns a contiguous run of them, and stores
/// the tree topology in a flat node array with the root at index 0. After
/// construction both arrays are immutable; queries take `&self`, so a
/// finished tree can serve any number of concurrent lookups as long as
/// every query brings its own callback state.
#[derive(Debug, Clone)]
pub struct Bvh<P, T: BvhScalar, const D: usize> {
    /// The primitives, reordered by the build.
    primitives: Vec<P>,

    /// The flat list of nodes, root first.
    nodes: Vec<BvhNode<T, D>>,
}

impl<P, T: BvhScalar, const D: usize> Bvh<P, T, D> {
    /// Builds a [`Bvh`] over `primitives`, taking ownership of them.
    ///
    /// `bound` maps a primitive to its box, `split` partitions ranges of
    /// primitives (see the [`split`](crate::split) module for the built-in
    /// strategies), and `threshold` is the attempted upper bound on
    /// primitives per leaf: ranges at or below it are stored as leaves
    /// without consulting `split`. A `threshold` of zero is treated as
    /// one. Leaves can end up larger than `threshold` when `split`
    /// declines a range; a strategy that always succeeds, like
    /// [`EqualCountsSplit`](crate::split::EqualCountsSplit), makes the
    /// bound exact.
    ///
    /// An empty input produces the empty tree.
    ///
    /// The build recurses once per tree level. The tree height is
    /// logarithmic for any of the built-in strategies on reasonably
    /// distributed input, but a hostile custom `split` can make it linear
    /// in the number of primitives.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use ndbvh::bvh::Bvh;
    /// use ndbvh::split::EqualCountsSplit;
    /// use nalgebra::Point3;
    ///
    /// let bound = |p: &Point3<f32>| Aabb::with_bounds(*p, *p);
    /// let split = EqualCountsSplit::new(bound);
    ///
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// ];
    /// let bvh = Bvh::build(points, &bound, &split, 1);
    ///
    /// assert_eq!(bvh.primitives().len(), 3);
    /// assert_eq!(bvh.nodes().len(), 5);
    /// assert!(bvh.aabb().contains(&Point3::new(1.0, 0.0, 0.0)));
    /// ```
    pub fn build<B, S>(primitives: Vec<P>, bound: &B, split: &S, threshold: usize) -> Bvh<P, T, D>
    where
        B: PrimitiveBound<P, T, D>,
        S: PrimitiveSplit<P, T, D>,
    {
        let mut bvh = Bvh {
            primitives,
            nodes: Vec::new(),
        };
        if bvh.primitives.is_empty() {
            return bvh;
        }

        let threshold = threshold.max(1);

        // A fully subdivided tree has one leaf per primitive.
        bvh.nodes.reserve(2 * bvh.primitives.len() - 1);
        bvh.nodes.push(BvhNode::placeholder());
        bvh.recursive_build(0, bvh.primitives.len(), 0, bound, split, threshold);
        bvh
    }

    /// Builds a [`Bvh`] over a copy of `primitives`. See [`Bvh::build`].
    pub fn build_from_slice<B, S>(
        primitives: &[P],
        bound: &B,
        split: &S,
        threshold: usize,
    ) -> Bvh<P, T, D>
    where
        P: Clone,
        B: PrimitiveBound<P, T, D>,
        S: PrimitiveSplit<P, T, D>,
    {
        Bvh::build(primitives.to_vec(), bound, split, threshold)
    }

    /// Builds the subtree over `primitives[begin..end]` into the node at
    /// `curr`, which has already been pushed as a placeholder.
    ///
    /// Nodes are appended while the array is being traversed, so children
    /// are always addressed through their indices and never through
    /// references held across an append.
    fn recursive_build<B, S>(
        &mut self,
        begin: usize,
        end: usize,
        curr: usize,
        bound: &B,
        split: &S,
        threshold: usize,
    ) where
        B: PrimitiveBound<P, T, D>,
        S: PrimitiveSplit<P, T, D>,
    {
        let n = end - begin;

        let m = if n > threshold {
            split.split(&mut self.primitives, begin, end)
        } else {
            end
        };
        debug_assert!(begin <= m && m <= end);

        if m == begin || m == end {
            // Either the range fits, or the split strategy declined it;
            // store it as one leaf either way.
            let mut aabb = Aabb::empty();
            for primitive in &self.primitives[begin..end] {
                aabb.join_mut(&bound.bound(primitive));
            }
            self.nodes[curr] = BvhNode::Leaf {
                aabb,
                offset: begin,
                len: n,
            };
        } else {
            let child_l_index = self.nodes.len();
            self.nodes.push(BvhNode::placeholder());
            self.recursive_build(begin, m, child_l_index, bound, split, threshold);

            let child_r_index = self.nodes.len();
            self.nodes.push(BvhNode::placeholder());
            self.recursive_build(m, end, child_r_index, bound, split, threshold);

            let aabb = self.nodes[child_l_index]
                .aabb()
                .join(self.nodes[child_r_index].aabb());
            self.nodes[curr] = BvhNode::Node {
                aabb,
                child_l_index,
                child_r_index,
            };
        }
    }

    /// Traverses the [`Bvh`] with a ray and reports whether `collide`
    /// found a hit below the initial value of `dist`.
    ///
    /// `dist` is in/out: the caller initializes it to an upper bound
    /// (typically positive infinity or a large sentinel), and on return it
    /// holds the distance of the best hit found, unchanged if there was
    /// none. The elementwise inverse of `direction` is computed once per
    /// query; zero direction components are handled by IEEE-754 infinity
    /// arithmetic as described at [`Aabb::intersects_ray`].
    ///
    /// Subtrees are visited near before far along the widest axis of
    /// their box, and any subtree whose box lies entirely beyond the
    /// current `dist` is skipped. Within a leaf, primitives are visited in
    /// storage order.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use ndbvh::bvh::Bvh;
    /// use ndbvh::primitive::PrimitiveCollide;
    /// use ndbvh::split::EqualCountsSplit;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// // Primitives are unit square "walls" at fixed x positions.
    /// struct WallCollide {
    ///     hit: Option<f64>,
    /// }
    ///
    /// impl PrimitiveCollide<f64, f64, 3> for WallCollide {
    ///     fn collide(
    ///         &mut self,
    ///         wall: &f64,
    ///         origin: &Point3<f64>,
    ///         direction: &Vector3<f64>,
    ///         dist: &mut f64,
    ///     ) -> bool {
    ///         let t = (*wall - origin.x) / direction.x;
    ///         let y = origin.y + t * direction.y;
    ///         let z = origin.z + t * direction.z;
    ///         if t > 0.0 && *dist > t && y.abs() <= 1.0 && z.abs() <= 1.0 {
    ///             *dist = t;
    ///             self.hit = Some(*wall);
    ///             true
    ///         } else {
    ///             false
    ///         }
    ///     }
    /// }
    ///
    /// let bound = |wall: &f64| {
    ///     Aabb::with_bounds(Point3::new(*wall, -1.0, -1.0), Point3::new(*wall, 1.0, 1.0))
    /// };
    /// let split = EqualCountsSplit::new(bound);
    /// let bvh = Bvh::build(vec![4.0, 2.0, 7.0], &bound, &split, 1);
    ///
    /// let mut collide = WallCollide { hit: None };
    /// let mut dist = f64::INFINITY;
    /// let hit = bvh.intersect(
    ///     &mut collide,
    ///     &Point3::new(0.0, 0.0, 0.0),
    ///     &Vector3::new(1.0, 0.0, 0.0),
    ///     &mut dist,
    /// );
    ///
    /// assert!(hit);
    /// assert_eq!(dist, 2.0);
    /// assert_eq!(collide.hit, Some(2.0));
    /// ```
    pub fn intersect<C>(
        &self,
        collide: &mut C,
        origin: &Point<T, D>,
        direction: &SVector<T, D>,
        dist: &mut T,
    ) -> bool
    where
        C: PrimitiveCollide<P, T, D>,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let inv_direction = direction.map(|x| T::one() / x);
        let neg: [bool; D] = std::array::from_fn(|i| direction[i] < T::zero());

        let mut hit = false;
        let mut stack = vec![0usize];

        while let Some(curr) = stack.pop() {
            let node = self.nodes[curr];
            if !node.aabb().intersects_ray(origin, &inv_direction, *dist) {
                continue;
            }

            match node {
                BvhNode::Leaf { offset, len, .. } => {
                    for primitive in &self.primitives[offset..offset + len] {
                        if collide.collide(primitive, origin, direction, dist) {
                            hit = true;
                        }
                    }
                }
                BvhNode::Node {
                    ref aabb,
                    child_l_index,
                    child_r_index,
                } => {
                    // Push far child first so the near child pops first.
                    if neg[aabb.largest_axis()] {
                        stack.push(child_l_index);
                        stack.push(child_r_index);
                    } else {
                        stack.push(child_r_index);
                        stack.push(child_l_index);
                    }
                }
            }
        }

        hit
    }

    /// Traverses the [`Bvh`] with a region query and reports whether any
    /// primitive matched.
    ///
    /// Subtrees whose box fails [`RangeQuery::visit_aabb`] are skipped
    /// wholesale; every primitive in every surviving leaf is handed to
    /// [`RangeQuery::visit_primitive`]. Siblings are visited left before
    /// right, and primitives within a leaf in storage order.
    ///
    /// # Examples
    /// ```
    /// use ndbvh::aabb::Aabb;
    /// use ndbvh::bvh::Bvh;
    /// use ndbvh::primitive::RangeQuery;
    /// use ndbvh::split::EqualCountsSplit;
    /// use nalgebra::Point3;
    ///
    /// // Counts points inside a box region.
    /// struct InRegion {
    ///     region: Aabb<f32, 3>,
    ///     count: usize,
    /// }
    ///
    /// impl RangeQuery<Point3<f32>, f32, 3> for InRegion {
    ///     fn visit_aabb(&mut self, aabb: &Aabb<f32, 3>) -> bool {
    ///         self.region.intersects_aabb(aabb)
    ///     }
    ///
    ///     fn visit_primitive(&mut self, p: &Point3<f32>) -> bool {
    ///         if self.region.contains(p) {
    ///             self.count += 1;
    ///             true
    ///         } else {
    ///             false
    ///         }
    ///     }
    /// }
    ///
    /// let bound = |p: &Point3<f32>| Aabb::with_bounds(*p, *p);
    /// let split = EqualCountsSplit::new(bound);
    /// let points: Vec<Point3<f32>> = (0..10).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
    /// let bvh = Bvh::build(points, &bound, &split, 1);
    ///
    /// let mut query = InRegion {
    ///     region: Aabb::with_bounds(Point3::new(2.5, -1.0, -1.0), Point3::new(6.5, 1.0, 1.0)),
    ///     count: 0,
    /// };
    /// assert!(bvh.search(&mut query));
    /// assert_eq!(query.count, 4);
    /// ```
    pub fn search<Q>(&self, query: &mut Q) -> bool
    where
        Q: RangeQuery<P, T, D>,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut hit = false;
        let mut stack = vec![0usize];

        while let Some(curr) = stack.pop() {
            let node = self.nodes[curr];
            if !query.visit_aabb(node.aabb()) {
                continue;
            }

            match node {
                BvhNode::Leaf { offset, len, .. } => {
                    for primitive in &self.primitives[offset..offset + len] {
                        if query.visit_primitive(primitive) {
                            hit = true;
                        }
                    }
                }
                BvhNode::Node {
                    child_l_index,
                    child_r_index,
                    ..
                } => {
                    stack.push(child_r_index);
                    stack.push(child_l_index);
                }
            }
        }

        hit
    }

    /// The primitives owned by this tree, in build order.
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// The nodes of this tree; the root, when one exists, is at index 0.
    pub fn nodes(&self) -> &[BvhNode<T, D>] {
        &self.nodes
    }

    /// The bounding box of the whole tree: the root's box, or the empty
    /// box when the tree is empty.
    pub fn aabb(&self) -> Aabb<T, D> {
        match self.nodes.first() {
            Some(root) => *root.aabb(),
            None => Aabb::empty(),
        }
    }

    /// Returns true if this tree contains no primitives.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks the structural invariants of this tree against `bound`:
    /// every inner box is exactly the join of its children, every leaf box
    /// is exactly the join of its primitives' bounds, children live at
    /// strictly greater indices than their parent, every node is reachable
    /// from the root exactly once, and the leaf runs tile the primitive
    /// array. Exact box equality is sound because joining only selects
    /// coordinates, which cannot introduce rounding error.
    pub fn is_consistent<B>(&self, bound: &B) -> bool
    where
        B: PrimitiveBound<P, T, D>,
    {
        if self.nodes.is_empty() {
            return self.primitives.is_empty();
        }

        let mut visited = 0;
        let mut leaf_ranges = Vec::new();
        if !self.consistent_subtree(0, &mut visited, &mut leaf_ranges, bound) {
            return false;
        }

        // A visit count short of the node count means a detached subtree.
        if visited != self.nodes.len() {
            return false;
        }

        // The leaf runs must tile the primitive array exactly.
        leaf_ranges.sort_unstable();
        let mut next = 0;
        for (offset, len) in leaf_ranges {
            if offset != next {
                return false;
            }
            next = offset + len;
        }
        next == self.primitives.len()
    }

    fn consistent_subtree<B>(
        &self,
        index: usize,
        visited: &mut usize,
        leaf_ranges: &mut Vec<(usize, usize)>,
        bound: &B,
    ) -> bool
    where
        B: PrimitiveBound<P, T, D>,
    {
        *visited += 1;
        match self.nodes[index] {
            BvhNode::Leaf { aabb, offset, len } => {
                if len == 0 || offset + len > self.primitives.len() {
                    return false;
                }
                leaf_ranges.push((offset, len));

                let mut joint = Aabb::empty();
                for primitive in &self.primitives[offset..offset + len] {
                    joint.join_mut(&bound.bound(primitive));
                }
                joint == aabb
            }
            BvhNode::Node {
                aabb,
                child_l_index,
                child_r_index,
            } => {
                if child_l_index <= index || child_r_index <= index {
                    return false;
                }
                if child_l_index >= self.nodes.len() || child_r_index >= self.nodes.len() {
                    return false;
                }

                let joint = self.nodes[child_l_index]
                    .aabb()
                    .join(self.nodes[child_r_index].aabb());
                joint == aabb
                    && self.consistent_subtree(child_l_index, visited, leaf_ranges, bound)
                    && self.consistent_subtree(child_r_index, visited, leaf_ranges, bound)
            }
        }
    }

    /// Assert version of [`Bvh::is_consistent`].
    pub fn assert_consistent<B>(&self, bound: &B)
    where
        B: PrimitiveBound<P, T, D>,
    {
        assert!(
            self.is_consistent(bound),
            "structural invariants of the Bvh are violated"
        );
    }

    /// Prints the [`Bvh`] in a tree-like visualization.
    pub fn pretty_print(&self) {
        fn print_node<T: BvhScalar, const D: usize>(
            nodes: &[BvhNode<T, D>],
            index: usize,
            depth: usize,
        ) {
            let padding = " ".repeat(depth);
            match nodes[index] {
                BvhNode::Node {
                    child_l_index,
                    child_r_index,
                    ref aabb,
                } => {
                    println!("{}node {:?}", padding, aabb);
                    print_node(nodes, child_l_index, depth + 1);
                    print_node(nodes, child_r_index, depth + 1);
                }
                BvhNode::Leaf { offset, len, .. } => {
                    println!("{}primitives\t{:?}", padding, offset..offset + len);
                }
            }
        }

        if !self.nodes.is_empty() {
            print_node(&self.nodes, 0, 0);
        }
    }
}


#[cfg(all(feature = "bench", test))]
mod bench {
    use crate::bvh::Bvh;
    use crate::split::SahSplit;
    use crate::testbase::{
        create_n_cubes, default_bounds, next_point3, triangle_bound, Triangle, TriangleCollide,
    };

    fn build_n_cubes_bvh(n: usize) -> Bvh<Triangle, f32, 3> {
        let triangles = create_n_cubes(n, &default_bounds());
        Bvh::build(
            triangles,
            &triangle_bound,
            &SahSplit::new(triangle_bound),
            1,
        )
    }

    #[bench]
    /// Benchmark the construction of a [`Bvh`] with 1,200 triangles.
    fn bench_build_1200_triangles(b: &mut ::test::Bencher) {
        let bounds = default_bounds();
        let triangles = create_n_cubes(100, &bounds);
        b.iter(|| {
            Bvh::build_from_slice(
                &triangles,
                &triangle_bound,
                &SahSplit::new(triangle_bound),
                1,
            )
        });
    }

    #[bench]
    /// Benchmark the construction of a [`Bvh`] with 12,000 triangles.
    fn bench_build_12k_triangles(b: &mut ::test::Bencher) {
        let bounds = default_bounds();
        let triangles = create_n_cubes(1_000, &bounds);
        b.iter(|| {
            Bvh::build_from_slice(
                &triangles,
                &triangle_bound,
                &SahSplit::new(triangle_bound),
                1,
            )
        });
    }

    #[bench]
    /// Benchmark intersecting a [`Bvh`] with 12,000 triangles.
    fn bench_intersect_12k_triangles(b: &mut ::test::Bencher) {
        let bvh = build_n_cubes_bvh(1_000);
        let bounds = default_bounds();
        let mut seed = 0;
        b.iter(|| {
            let origin = next_point3(&mut seed, &bounds);
            let target = next_point3(&mut seed, &bounds);
            let mut collide = TriangleCollide::new();
            let mut dist = f32::INFINITY;
            bvh.intersect(&mut collide, &origin, &(target - origin), &mut dist)
        });
    }
}
