//! Collision shapes: boxes and convex polyhedra.
//!
//! Shapes describe local-space geometry. Derived data (face normals, unique
//! edges, unique axes, bounding sphere radius) is computed once at
//! construction and cached; the local geometry is immutable afterwards.
//!
//! A [`ConvexPolyhedron`] must actually be convex and its faces must be wound
//! counter-clockwise as seen from outside the shape. Inconsistent winding is
//! reported through `log` and the shape kept in a best-effort state rather
//! than rejected, so one malformed shape degrades only the bodies using it.

use heapless::Vec;
use log::warn;
use nalgebra::{UnitQuaternion, Vector3};

use crate::aabb::Aabb;

// ComplexField provides sqrt() for f64 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Maximum number of vertices a convex polyhedron can hold.
pub const MAX_HULL_VERTICES: usize = 32;
/// Maximum number of faces a convex polyhedron can hold.
pub const MAX_HULL_FACES: usize = 32;
/// Maximum number of vertices in a single face loop.
pub const MAX_FACE_VERTICES: usize = 8;
/// Maximum number of unique edge directions kept per polyhedron.
pub const MAX_UNIQUE_EDGES: usize = 64;

/// Tolerance used when comparing edge/axis directions for uniqueness.
pub const DIRECTION_TOLERANCE: f64 = 1e-6;

/// A face described as an index loop into the vertex list.
pub type FaceIndices = Vec<u16, MAX_FACE_VERTICES>;

/// Errors rejected at shape construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("convex polyhedron needs at least 4 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("face {face} has {count} vertices, need at least 3")]
    DegenerateFace { face: usize, count: usize },
    #[error("face {face} references vertex {index} but only {len} vertices exist")]
    VertexIndexOutOfRange { face: usize, index: u16, len: usize },
    #[error("{0} capacity exceeded")]
    CapacityExceeded(&'static str),
}

/// Per-shape collision options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOptions {
    pub collision_filter_group: u32,
    pub collision_filter_mask: u32,
    /// Whether contacts with this shape produce forces. When `false`,
    /// contacts are still generated but their equations are disabled.
    pub collision_response: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            collision_filter_group: 1,
            collision_filter_mask: u32::MAX,
            collision_response: true,
        }
    }
}

/// Compute the outward normal of a face from three consecutive vertices of
/// its counter-clockwise loop.
///
/// A degenerate (zero-area) triangle yields the zero vector instead of
/// dividing by zero; callers are expected to report and skip it.
pub fn compute_face_normal(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    c: &Vector3<f64>,
) -> Vector3<f64> {
    (b - a)
        .cross(&(c - b))
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::zeros)
}

fn almost_equals(a: &Vector3<f64>, b: &Vector3<f64>, tolerance: f64) -> bool {
    (a.x - b.x).abs() < tolerance
        && (a.y - b.y).abs() < tolerance
        && (a.z - b.z).abs() < tolerance
}

/// A convex shape described by vertices and face index loops.
///
/// Faces must be wound counter-clockwise around their outward normal. No two
/// faces may be coplanar; coplanar polygons should be merged into one face
/// before construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolyhedron {
    vertices: Vec<Vector3<f64>, MAX_HULL_VERTICES>,
    faces: Vec<FaceIndices, MAX_HULL_FACES>,
    face_normals: Vec<Vector3<f64>, MAX_HULL_FACES>,
    unique_edges: Vec<Vector3<f64>, MAX_UNIQUE_EDGES>,
    unique_axes: Vec<Vector3<f64>, MAX_HULL_FACES>,
    bounding_sphere_radius: f64,
}

impl ConvexPolyhedron {
    /// Build a convex polyhedron from vertices and face index loops.
    ///
    /// Rejects geometry that cannot describe a volume: fewer than four
    /// vertices, faces with fewer than three indices, out-of-range indices,
    /// or geometry exceeding the fixed capacities.
    pub fn new(vertices: &[Vector3<f64>], faces: &[&[u16]]) -> Result<Self, ShapeError> {
        if vertices.len() < 4 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        for (fi, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(ShapeError::DegenerateFace {
                    face: fi,
                    count: face.len(),
                });
            }
            for &index in face.iter() {
                if index as usize >= vertices.len() {
                    return Err(ShapeError::VertexIndexOutOfRange {
                        face: fi,
                        index,
                        len: vertices.len(),
                    });
                }
            }
        }

        let mut hull = Self {
            vertices: Vec::from_slice(vertices)
                .map_err(|_| ShapeError::CapacityExceeded("hull vertex"))?,
            faces: Vec::new(),
            face_normals: Vec::new(),
            unique_edges: Vec::new(),
            unique_axes: Vec::new(),
            bounding_sphere_radius: 0.0,
        };
        for face in faces {
            let loop_indices = FaceIndices::from_slice(face)
                .map_err(|_| ShapeError::CapacityExceeded("face vertex"))?;
            hull.faces
                .push(loop_indices)
                .map_err(|_| ShapeError::CapacityExceeded("hull face"))?;
        }

        hull.compute_normals();
        hull.compute_edges();
        hull.compute_unique_axes();
        hull.update_bounding_sphere_radius();
        Ok(hull)
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[FaceIndices] {
        &self.faces
    }

    /// Outward normal per face, parallel to [`ConvexPolyhedron::faces`].
    /// A degenerate face stores the zero vector.
    pub fn face_normals(&self) -> &[Vector3<f64>] {
        &self.face_normals
    }

    /// Deduplicated edge directions (an edge and its negation count as one).
    pub fn unique_edges(&self) -> &[Vector3<f64>] {
        &self.unique_edges
    }

    /// Deduplicated face-normal directions used as SAT candidate axes.
    pub fn unique_axes(&self) -> &[Vector3<f64>] {
        &self.unique_axes
    }

    /// Radius of the local-space sphere centered at the origin that encloses
    /// all vertices.
    pub fn bounding_sphere_radius(&self) -> f64 {
        self.bounding_sphere_radius
    }

    /// Derive each face's outward normal from its first three vertices and
    /// validate the sign against a vertex of the face.
    ///
    /// For a convex hull enclosing its local origin, an outward normal
    /// satisfies `dot(normal, vertex) >= 0` for the face's own vertices.
    /// Inconsistent winding is reported, not rejected.
    fn compute_normals(&mut self) {
        self.face_normals.clear();
        for (fi, face) in self.faces.iter().enumerate() {
            let normal = compute_face_normal(
                &self.vertices[face[0] as usize],
                &self.vertices[face[1] as usize],
                &self.vertices[face[2] as usize],
            );
            if normal == Vector3::zeros() {
                warn!("face {} has zero area, normal left as zero", fi);
            } else if normal.dot(&self.vertices[face[0] as usize]) < 0.0 {
                warn!(
                    "face {} normal points into the shape; check that vertices wind CCW around the outward normal",
                    fi
                );
            }
            let _ = self.face_normals.push(normal);
        }
    }

    /// Compute the set of unique edge directions.
    ///
    /// For every adjacent vertex pair of every face loop the normalized edge
    /// direction is inserted unless an existing entry (or its negation)
    /// matches within [`DIRECTION_TOLERANCE`]. Idempotent: recomputing
    /// yields the same set.
    pub fn compute_edges(&mut self) {
        for face in self.faces.iter() {
            let count = face.len();
            for j in 0..count {
                let k = (j + 1) % count;
                let edge = self.vertices[face[k] as usize] - self.vertices[face[j] as usize];
                let edge = match edge.try_normalize(1e-12) {
                    Some(e) => e,
                    None => continue, // coincident vertices
                };
                let negated = -edge;
                let found = self.unique_edges.iter().any(|existing| {
                    almost_equals(existing, &edge, DIRECTION_TOLERANCE)
                        || almost_equals(existing, &negated, DIRECTION_TOLERANCE)
                });
                if !found && self.unique_edges.push(edge).is_err() {
                    warn!(
                        "unique edge capacity ({}) exceeded, some SAT axes will be skipped",
                        MAX_UNIQUE_EDGES
                    );
                    return;
                }
            }
        }
    }

    /// Deduplicate face normals into the unique axis set, with the same
    /// negation-aware tolerance as [`ConvexPolyhedron::compute_edges`].
    fn compute_unique_axes(&mut self) {
        self.unique_axes.clear();
        for normal in self.face_normals.iter() {
            if *normal == Vector3::zeros() {
                continue;
            }
            let negated = -*normal;
            let found = self.unique_axes.iter().any(|existing| {
                almost_equals(existing, normal, DIRECTION_TOLERANCE)
                    || almost_equals(existing, &negated, DIRECTION_TOLERANCE)
            });
            if !found {
                let _ = self.unique_axes.push(*normal);
            }
        }
    }

    fn update_bounding_sphere_radius(&mut self) {
        let mut max_sq: f64 = 0.0;
        for v in self.vertices.iter() {
            max_sq = max_sq.max(v.norm_squared());
        }
        self.bounding_sphere_radius = max_sq.sqrt();
    }

    /// Local-space bounding box of the vertices.
    pub fn local_aabb(&self) -> Aabb {
        // The constructor guarantees at least 4 vertices.
        Aabb::from_points(self.vertices.iter()).unwrap_or(Aabb {
            min: Vector3::zeros(),
            max: Vector3::zeros(),
        })
    }

    /// World-space bounding box: every vertex transformed, componentwise
    /// extrema.
    pub fn calculate_world_aabb(
        &self,
        position: &Vector3<f64>,
        orientation: &UnitQuaternion<f64>,
    ) -> Aabb {
        let mut iter = self.vertices.iter();
        let first = match iter.next() {
            Some(v) => position + orientation * v,
            None => *position,
        };
        let mut aabb = Aabb::new(first, first);
        for v in iter {
            aabb.extend(&(position + orientation * v));
        }
        aabb
    }
}

/// The shape kinds the narrowphase understands, dispatched by pattern
/// matching.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// A box given by its half-extents, with a cached convex-polyhedron
    /// representation used by the narrowphase.
    Box {
        half_extents: Vector3<f64>,
        hull: ConvexPolyhedron,
    },
    /// An arbitrary convex polyhedron.
    Convex(ConvexPolyhedron),
}

/// A collision shape: kind-specific geometry plus collision options.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub options: ShapeOptions,
    kind: ShapeKind,
}

impl Shape {
    /// Create a box shape from its half-extents.
    pub fn new_box(half_extents: Vector3<f64>) -> Self {
        Self {
            options: ShapeOptions::default(),
            kind: ShapeKind::Box {
                half_extents,
                hull: box_hull(&half_extents),
            },
        }
    }

    /// Create a convex polyhedron shape.
    pub fn new_convex(hull: ConvexPolyhedron) -> Self {
        Self {
            options: ShapeOptions::default(),
            kind: ShapeKind::Convex(hull),
        }
    }

    /// Builder: set the collision options.
    pub fn with_options(mut self, options: ShapeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// The convex-polyhedron view of this shape used by the narrowphase.
    pub fn hull(&self) -> &ConvexPolyhedron {
        match &self.kind {
            ShapeKind::Box { hull, .. } => hull,
            ShapeKind::Convex(hull) => hull,
        }
    }

    /// Radius of the local bounding sphere.
    pub fn bounding_sphere_radius(&self) -> f64 {
        match &self.kind {
            ShapeKind::Box { half_extents, .. } => half_extents.norm(),
            ShapeKind::Convex(hull) => hull.bounding_sphere_radius(),
        }
    }

    /// Shape volume.
    ///
    /// Boxes use the exact `8*hx*hy*hz`; convex polyhedra approximate with
    /// their bounding-sphere volume.
    pub fn volume(&self) -> f64 {
        match &self.kind {
            ShapeKind::Box { half_extents: e, .. } => 8.0 * e.x * e.y * e.z,
            ShapeKind::Convex(hull) => {
                let r = hull.bounding_sphere_radius();
                4.0 * core::f64::consts::PI * r * r * r / 3.0
            }
        }
    }

    /// Diagonal of the local inertia tensor for the given mass.
    ///
    /// Boxes use the closed form `1/12 * m * (e^2 + e^2)` per axis; convex
    /// polyhedra approximate via their local AABB treated as an equivalent
    /// box.
    pub fn calculate_local_inertia(&self, mass: f64) -> Vector3<f64> {
        match &self.kind {
            ShapeKind::Box { half_extents, .. } => box_inertia(half_extents, mass),
            ShapeKind::Convex(hull) => box_inertia(&hull.local_aabb().half_extents(), mass),
        }
    }

    /// World-space bounding box for a shape at the given pose.
    pub fn calculate_world_aabb(
        &self,
        position: &Vector3<f64>,
        orientation: &UnitQuaternion<f64>,
    ) -> Aabb {
        self.hull().calculate_world_aabb(position, orientation)
    }

    /// The six side directions of a box, scaled by its half-extents and
    /// rotated into world space. `None` for non-box shapes.
    pub fn side_normals(&self, orientation: &UnitQuaternion<f64>) -> Option<[Vector3<f64>; 6]> {
        match &self.kind {
            ShapeKind::Box { half_extents: e, .. } => {
                let mut sides = [
                    Vector3::new(e.x, 0.0, 0.0),
                    Vector3::new(0.0, e.y, 0.0),
                    Vector3::new(0.0, 0.0, e.z),
                    Vector3::new(-e.x, 0.0, 0.0),
                    Vector3::new(0.0, -e.y, 0.0),
                    Vector3::new(0.0, 0.0, -e.z),
                ];
                for side in &mut sides {
                    *side = orientation * *side;
                }
                Some(sides)
            }
            ShapeKind::Convex(_) => None,
        }
    }
}

fn box_inertia(half_extents: &Vector3<f64>, mass: f64) -> Vector3<f64> {
    let e = half_extents;
    Vector3::new(
        1.0 / 12.0 * mass * (2.0 * e.y * 2.0 * e.y + 2.0 * e.z * 2.0 * e.z),
        1.0 / 12.0 * mass * (2.0 * e.x * 2.0 * e.x + 2.0 * e.z * 2.0 * e.z),
        1.0 / 12.0 * mass * (2.0 * e.y * 2.0 * e.y + 2.0 * e.x * 2.0 * e.x),
    )
}

/// The canonical 8-corner, 6-face hull of a box, faces wound CCW as seen
/// from outside.
fn box_hull(half_extents: &Vector3<f64>) -> ConvexPolyhedron {
    let (sx, sy, sz) = (half_extents.x, half_extents.y, half_extents.z);
    let vertices = [
        Vector3::new(-sx, -sy, -sz),
        Vector3::new(sx, -sy, -sz),
        Vector3::new(sx, sy, -sz),
        Vector3::new(-sx, sy, -sz),
        Vector3::new(-sx, -sy, sz),
        Vector3::new(sx, -sy, sz),
        Vector3::new(sx, sy, sz),
        Vector3::new(-sx, sy, sz),
    ];
    let faces: [&[u16]; 6] = [
        &[3, 2, 1, 0], // -z
        &[4, 5, 6, 7], // +z
        &[5, 4, 0, 1], // -y
        &[2, 3, 7, 6], // +y
        &[0, 4, 7, 3], // -x
        &[1, 2, 6, 5], // +x
    ];
    match ConvexPolyhedron::new(&vertices, &faces) {
        Ok(hull) => hull,
        // The canonical box data is statically valid and within capacity.
        Err(_) => ConvexPolyhedron {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_normals: Vec::new(),
            unique_edges: Vec::new(),
            unique_axes: Vec::new(),
            bounding_sphere_radius: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_vec_eq(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn tetrahedron() -> ConvexPolyhedron {
        let vertices = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let faces: [&[u16]; 4] = [&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]];
        ConvexPolyhedron::new(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_box_volume() {
        let shape = Shape::new_box(Vector3::new(2.5, 2.5, 2.5));
        assert!(approx_eq(shape.volume(), 125.0));
    }

    #[test]
    fn test_box_local_inertia() {
        let shape = Shape::new_box(Vector3::new(0.5, 0.5, 0.5));
        let inertia = shape.calculate_local_inertia(10.0);
        assert!(approx_vec_eq(
            &inertia,
            &Vector3::new(1.6666666666666665, 1.6666666666666665, 1.6666666666666665)
        ));
    }

    #[test]
    fn test_box_bounding_sphere_radius() {
        let shape = Shape::new_box(Vector3::new(1.0, 2.0, 2.0));
        assert!(approx_eq(shape.bounding_sphere_radius(), 3.0));
    }

    #[test]
    fn test_box_world_aabb_identity_rotation() {
        let shape = Shape::new_box(Vector3::new(1.0, 2.0, 3.0));
        let pos = Vector3::new(10.0, -5.0, 0.5);
        let aabb = shape.calculate_world_aabb(&pos, &UnitQuaternion::identity());
        assert!(approx_vec_eq(&aabb.min, &Vector3::new(9.0, -7.0, -2.5)));
        assert!(approx_vec_eq(&aabb.max, &Vector3::new(11.0, -3.0, 3.5)));
    }

    #[test]
    fn test_box_world_aabb_quarter_turn() {
        // 90 degrees around z swaps the x and y extents
        let shape = Shape::new_box(Vector3::new(2.0, 1.0, 1.0));
        let quat = UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0)),
            core::f64::consts::FRAC_PI_2,
        );
        let aabb = shape.calculate_world_aabb(&Vector3::zeros(), &quat);
        assert!((aabb.max.x - 1.0).abs() < 1e-9);
        assert!((aabb.max.y - 2.0).abs() < 1e-9);
        assert!((aabb.max.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_hull_normals_point_outward() {
        let shape = Shape::new_box(Vector3::new(1.0, 1.0, 1.0));
        let hull = shape.hull();
        for (face, normal) in hull.faces().iter().zip(hull.face_normals()) {
            assert!(approx_eq(normal.norm(), 1.0));
            let vertex = hull.vertices()[face[0] as usize];
            assert!(normal.dot(&vertex) > 0.0);
        }
    }

    #[test]
    fn test_box_hull_unique_sets() {
        // A box has 3 unique edge directions and 3 unique axes
        let shape = Shape::new_box(Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(shape.hull().unique_edges().len(), 3);
        assert_eq!(shape.hull().unique_axes().len(), 3);
    }

    #[test]
    fn test_compute_edges_idempotent() {
        let shape = Shape::new_box(Vector3::new(1.0, 1.0, 1.0));
        let before = shape.hull().clone();
        let mut hull = shape.hull().clone();
        hull.compute_edges();
        assert_eq!(hull.unique_edges(), before.unique_edges());
        assert_eq!(hull, before);
    }

    #[test]
    fn test_side_normals() {
        let shape = Shape::new_box(Vector3::new(0.5, 1.0, 2.0));
        let sides = shape.side_normals(&UnitQuaternion::identity()).unwrap();
        assert!(approx_vec_eq(&sides[0], &Vector3::new(0.5, 0.0, 0.0)));
        assert!(approx_vec_eq(&sides[4], &Vector3::new(0.0, -1.0, 0.0)));
        assert!(approx_vec_eq(&sides[5], &Vector3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_side_normals_rotated() {
        let shape = Shape::new_box(Vector3::new(0.5, 0.5, 0.5));
        let quat = UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0)),
            core::f64::consts::FRAC_PI_2,
        );
        let sides = shape.side_normals(&quat).unwrap();
        // +x side rotates onto +y
        assert!(approx_vec_eq(&sides[0], &Vector3::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn test_convex_too_few_vertices() {
        let vertices = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let faces: [&[u16]; 1] = [&[0, 1, 2]];
        assert_eq!(
            ConvexPolyhedron::new(&vertices, &faces),
            Err(ShapeError::TooFewVertices(3))
        );
    }

    #[test]
    fn test_convex_degenerate_face() {
        let vertices = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let faces: [&[u16]; 1] = [&[0, 1]];
        assert_eq!(
            ConvexPolyhedron::new(&vertices, &faces),
            Err(ShapeError::DegenerateFace { face: 0, count: 2 })
        );
    }

    #[test]
    fn test_convex_index_out_of_range() {
        let vertices = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let faces: [&[u16]; 1] = [&[0, 1, 9]];
        assert_eq!(
            ConvexPolyhedron::new(&vertices, &faces),
            Err(ShapeError::VertexIndexOutOfRange {
                face: 0,
                index: 9,
                len: 4
            })
        );
    }

    #[test]
    fn test_tetrahedron_edges() {
        let hull = tetrahedron();
        // 6 edges, none parallel to another
        assert_eq!(hull.unique_edges().len(), 6);
        for edge in hull.unique_edges() {
            assert!(approx_eq(edge.norm(), 1.0));
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for v in [
            Vector3::new(3.0, -4.0, 12.0),
            Vector3::new(1e-3, 2e-3, -5e-4),
            Vector3::new(-7.0, 0.0, 0.1),
        ] {
            let once = v.normalize();
            let twice = once.normalize();
            assert!((twice - once).norm() < 1e-9);
        }
    }

    #[test]
    fn test_compute_face_normal_degenerate() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(2.0, 0.0, 0.0); // collinear
        assert_eq!(compute_face_normal(&a, &b, &c), Vector3::zeros());
    }

    #[test]
    fn test_convex_volume_is_bounding_sphere_approximation() {
        let hull = tetrahedron();
        let r = hull.bounding_sphere_radius();
        let shape = Shape::new_convex(hull);
        assert!(approx_eq(
            shape.volume(),
            4.0 * core::f64::consts::PI * r * r * r / 3.0
        ));
    }

    #[test]
    fn test_convex_inertia_uses_local_aabb() {
        let hull = tetrahedron();
        let expected = box_inertia(&hull.local_aabb().half_extents(), 6.0);
        let shape = Shape::new_convex(hull);
        assert!(approx_vec_eq(&shape.calculate_local_inertia(6.0), &expected));
    }
}
