//! Common utilities shared by unit tests.

use proptest::prelude::*;

use crate::primitive::{PrimitiveCollide, RangeQuery};

/// A vector represented as a tuple.
pub type TupleVec = (f32, f32, f32);

pub type TAabb2 = crate::aabb::Aabb<f32, 2>;
pub type TAabb3 = crate::aabb::Aabb<f32, 3>;
pub type TPoint3 = nalgebra::Point<f32, 3>;
pub type TVector3 = nalgebra::SVector<f32, 3>;

/// Generates a [`TupleVec`] for [`proptest::strategy::Strategy`] from
/// -10e10 to 10e10. A small enough range to prevent most fp32 errors from
/// breaking certain tests.
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Convert a [`TupleVec`] to a [`TPoint3`].
pub fn tuple_to_point(tpl: &TupleVec) -> TPoint3 {
    TPoint3::new(tpl.0, tpl.1, tpl.2)
}

/// Convert a [`TupleVec`] to a [`TVector3`].
pub fn tuple_to_vector(tpl: &TupleVec) -> TVector3 {
    TVector3::new(tpl.0, tpl.1, tpl.2)
}

/// Define some simple bounded structure.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitBox {
    pub id: i32,
    pub pos: TPoint3,
}

impl UnitBox {
    pub fn new(id: i32, pos: TPoint3) -> UnitBox {
        UnitBox { id, pos }
    }
}

/// A [`UnitBox`]'s [`Aabb`] is a unit box centered on its position.
pub fn unit_box_bound(b: &UnitBox) -> TAabb3 {
    let offset = TVector3::new(0.5, 0.5, 0.5);
    TAabb3::with_bounds(b.pos - offset, b.pos + offset)
}

/// Generate 21 [`UnitBox`]'s along the X axis centered on whole numbers
/// (-10, -9, ..., 10). The index is set to the rounded x-coordinate of the
/// box center.
pub fn generate_aligned_boxes() -> Vec<UnitBox> {
    let mut shapes = Vec::new();
    for x in -10..11 {
        shapes.push(UnitBox::new(x, TPoint3::new(x as f32, 0.0, 0.0)));
    }
    shapes
}

/// A triangle struct. Instance of a more complex primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub id: usize,
    pub a: TPoint3,
    pub b: TPoint3,
    pub c: TPoint3,
    aabb: TAabb3,
}

impl Triangle {
    pub fn new(a: TPoint3, b: TPoint3, c: TPoint3) -> Triangle {
        Triangle {
            id: 0,
            a,
            b,
            c,
            aabb: TAabb3::empty().grow(&a).grow(&b).grow(&c),
        }
    }
}

/// Bound function for [`Triangle`] primitives.
pub fn triangle_bound(triangle: &Triangle) -> TAabb3 {
    triangle.aabb
}

/// Möller-Trumbore ray/triangle intersection, without backface culling.
/// Returns true and lowers `dist` when the triangle is hit strictly closer
/// than the current `dist`.
pub fn ray_hits_triangle(
    a: &TPoint3,
    b: &TPoint3,
    c: &TPoint3,
    origin: &TPoint3,
    direction: &TVector3,
    dist: &mut f32,
) -> bool {
    let a_to_b = b - a;
    let a_to_c = c - a;

    let u_vec = direction.cross(&a_to_c);
    let det = a_to_b.dot(&u_vec);
    if det.abs() < f32::EPSILON {
        return false;
    }
    let inv_det = 1.0 / det;

    let a_to_origin = origin - a;
    let u = a_to_origin.dot(&u_vec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let v_vec = a_to_origin.cross(&a_to_b);
    let v = direction.dot(&v_vec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = a_to_c.dot(&v_vec) * inv_det;
    if t > 0.0 && *dist > t {
        *dist = t;
        true
    } else {
        false
    }
}

/// Collide callback for [`Triangle`] primitives, remembering the id of the
/// closest triangle hit so far.
pub struct TriangleCollide {
    pub hit_id: Option<usize>,
}

impl TriangleCollide {
    pub fn new() -> TriangleCollide {
        TriangleCollide { hit_id: None }
    }
}

impl PrimitiveCollide<Triangle, f32, 3> for TriangleCollide {
    fn collide(
        &mut self,
        triangle: &Triangle,
        origin: &TPoint3,
        direction: &TVector3,
        dist: &mut f32,
    ) -> bool {
        let hit = ray_hits_triangle(
            &triangle.a,
            &triangle.b,
            &triangle.c,
            origin,
            direction,
            dist,
        );
        if hit {
            self.hit_id = Some(triangle.id);
        }
        hit
    }
}

/// Intersects every triangle in turn. The reference result the tree
/// traversal must reproduce.
pub fn brute_force_intersect(
    triangles: &[Triangle],
    origin: &TPoint3,
    direction: &TVector3,
    dist: &mut f32,
) -> Option<usize> {
    let mut hit_id = None;
    for triangle in triangles {
        if ray_hits_triangle(&triangle.a, &triangle.b, &triangle.c, origin, direction, dist) {
            hit_id = Some(triangle.id);
        }
    }
    hit_id
}

/// Range query matching everything that overlaps a fixed box, collecting
/// the ids of matching [`UnitBox`] primitives.
pub struct OverlapQuery {
    pub region: TAabb3,
    pub hits: Vec<i32>,
}

impl OverlapQuery {
    pub fn new(region: TAabb3) -> OverlapQuery {
        OverlapQuery {
            region,
            hits: Vec::new(),
        }
    }
}

impl RangeQuery<UnitBox, f32, 3> for OverlapQuery {
    fn visit_aabb(&mut self, aabb: &TAabb3) -> bool {
        self.region.intersects_aabb(aabb)
    }

    fn visit_primitive(&mut self, primitive: &UnitBox) -> bool {
        if self.region.intersects_aabb(&unit_box_bound(primitive)) {
            self.hits.push(primitive.id);
            true
        } else {
            false
        }
    }
}

/// Range query accepting every box and every primitive, recording the ids
/// of all primitives it is shown.
pub struct CountingQuery {
    pub visited: Vec<i32>,
}

impl CountingQuery {
    pub fn new() -> CountingQuery {
        CountingQuery {
            visited: Vec::new(),
        }
    }
}

impl RangeQuery<UnitBox, f32, 3> for CountingQuery {
    fn visit_aabb(&mut self, _aabb: &TAabb3) -> bool {
        true
    }

    fn visit_primitive(&mut self, primitive: &UnitBox) -> bool {
        self.visited.push(primitive.id);
        true
    }
}

/// Pushes the 12 surface triangles of an axis-aligned cube centered at
/// `pos` with the given half extent onto `triangles`.
pub fn push_cube(pos: TPoint3, half_extent: f32, triangles: &mut Vec<Triangle>) {
    let h = half_extent;
    let top_front_right = pos + TVector3::new(h, h, -h);
    let top_back_right = pos + TVector3::new(h, h, h);
    let top_back_left = pos + TVector3::new(-h, h, h);
    let top_front_left = pos + TVector3::new(-h, h, -h);
    let bottom_front_right = pos + TVector3::new(h, -h, -h);
    let bottom_back_right = pos + TVector3::new(h, -h, h);
    let bottom_back_left = pos + TVector3::new(-h, -h, h);
    let bottom_front_left = pos + TVector3::new(-h, -h, -h);

    triangles.push(Triangle::new(top_back_right, top_front_right, top_front_left));
    triangles.push(Triangle::new(top_front_left, top_back_left, top_back_right));
    triangles.push(Triangle::new(
        bottom_front_left,
        bottom_front_right,
        bottom_back_right,
    ));
    triangles.push(Triangle::new(
        bottom_back_right,
        bottom_back_left,
        bottom_front_left,
    ));
    triangles.push(Triangle::new(top_back_left, top_front_left, bottom_front_left));
    triangles.push(Triangle::new(
        bottom_front_left,
        bottom_back_left,
        top_back_left,
    ));
    triangles.push(Triangle::new(
        bottom_front_right,
        top_front_right,
        top_back_right,
    ));
    triangles.push(Triangle::new(
        top_back_right,
        bottom_back_right,
        bottom_front_right,
    ));
    triangles.push(Triangle::new(
        top_front_left,
        top_front_right,
        bottom_front_right,
    ));
    triangles.push(Triangle::new(
        bottom_front_right,
        bottom_front_left,
        top_front_left,
    ));
    triangles.push(Triangle::new(
        bottom_back_right,
        top_back_right,
        top_back_left,
    ));
    triangles.push(Triangle::new(
        top_back_left,
        bottom_back_left,
        bottom_back_right,
    ));
}

/// Implementation of splitmix64.
/// For reference see: <http://xoroshiro.di.unimi.it/splitmix64.c>
fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(0x9E3779B97F4A7C15u64);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EBu64);
    z ^ (z >> 31)
}

/// Generates a new [`i32`] triple. Mutates the seed.
fn next_point3_raw(seed: &mut u64) -> (i32, i32, i32) {
    let u = splitmix64(seed);
    let a = ((u >> 32) & 0xFFFFFFFF) as i64 - 0x80000000;
    let b = (u & 0xFFFFFFFF) as i64 - 0x80000000;
    let c = a ^ b.rotate_left(6);
    (a as i32, b as i32, c as i32)
}

/// Generates a new [`TPoint3`] inside `bounds`. Mutates the seed.
pub fn next_point3(seed: &mut u64, bounds: &TAabb3) -> TPoint3 {
    let (a, b, c) = next_point3_raw(seed);
    let unit = TVector3::new(
        (a as f32 / i32::MAX as f32 + 1.0) * 0.5,
        (b as f32 / i32::MAX as f32 + 1.0) * 0.5,
        (c as f32 / i32::MAX as f32 + 1.0) * 0.5,
    );

    let size = bounds.size();
    bounds.min + TVector3::new(unit.x * size.x, unit.y * size.y, unit.z * size.z)
}

/// Returns an [`Aabb`] which defines the default testing space bounds.
pub fn default_bounds() -> TAabb3 {
    TAabb3::with_bounds(
        TPoint3::new(-100_000.0, -100_000.0, -100_000.0),
        TPoint3::new(100_000.0, 100_000.0, 100_000.0),
    )
}

/// Creates `n` deterministic random unit cubes, ids assigned in order.
/// Returns the [`Vec`] of surface [`Triangle`]'s.
pub fn create_n_cubes(n: usize, bounds: &TAabb3) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    let mut seed = 0;
    for _ in 0..n {
        push_cube(next_point3(&mut seed, bounds), 0.5, &mut triangles);
    }
    for (id, triangle) in triangles.iter_mut().enumerate() {
        triangle.id = id;
    }
    triangles
}
