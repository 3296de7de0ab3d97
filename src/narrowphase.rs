//! Narrowphase: separating-axis overlap test and contact manifold
//! generation for convex polyhedra.
//!
//! Candidate axes are the unique face-normal directions of both hulls plus
//! the cross products of their unique edge directions (classic polyhedral
//! SAT). On the winning axis the incident face is clipped against the
//! reference face's side planes (Sutherland-Hodgman in 3D) to build a
//! manifold of contact points with per-point penetration depth.

use heapless::Vec;
use log::{debug, warn};
use nalgebra::{UnitQuaternion, Vector3};

use crate::shapes::{ConvexPolyhedron, Shape, DIRECTION_TOLERANCE};

/// Maximum number of contact points in one manifold.
pub const MAX_MANIFOLD_POINTS: usize = 8;

/// Scratch capacity for the clip polygon; a face can gain a vertex per
/// clipping plane.
const MAX_CLIP_VERTICES: usize = 16;

/// Two overlap depths within this tolerance count as a tie; ties prefer a
/// face axis over an edge-cross axis for solver stability.
const AXIS_TIE_TOLERANCE: f64 = 1e-9;

/// A single point of a contact manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// World-space contact point (on the incident shape's surface).
    pub point: Vector3<f64>,
    /// Positive penetration depth along the manifold normal.
    pub depth: f64,
}

/// The contact set between two overlapping shapes: one or more points
/// sharing a separating normal.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    /// Unit contact normal pointing from shape A toward shape B.
    pub normal: Vector3<f64>,
    pub points: Vec<ContactPoint, MAX_MANIFOLD_POINTS>,
}

/// Test two shapes in world pose for overlap and build a contact manifold.
///
/// Returns `None` when the shapes do not overlap (some axis separates them)
/// or when clipping produces no penetrating points.
pub fn generate_contacts(
    shape_a: &Shape,
    pos_a: &Vector3<f64>,
    quat_a: &UnitQuaternion<f64>,
    shape_b: &Shape,
    pos_b: &Vector3<f64>,
    quat_b: &UnitQuaternion<f64>,
) -> Option<ContactManifold> {
    let hull_a = shape_a.hull();
    let hull_b = shape_b.hull();
    let normal = find_separating_axis(hull_a, pos_a, quat_a, hull_b, pos_b, quat_b)?;
    let points = clip_hulls(hull_a, pos_a, quat_a, hull_b, pos_b, quat_b, &normal);
    if points.is_empty() {
        None
    } else {
        Some(ContactManifold { normal, points })
    }
}

/// Find the axis of least positive overlap between two hulls.
///
/// Returns the winning axis oriented from A toward B, or `None` if any
/// candidate axis separates the hulls. Near-zero edge cross products are
/// skipped to avoid NaN axes.
pub fn find_separating_axis(
    hull_a: &ConvexPolyhedron,
    pos_a: &Vector3<f64>,
    quat_a: &UnitQuaternion<f64>,
    hull_b: &ConvexPolyhedron,
    pos_b: &Vector3<f64>,
    quat_b: &UnitQuaternion<f64>,
) -> Option<Vector3<f64>> {
    let mut dmin = f64::MAX;
    let mut best = Vector3::zeros();

    for axis in hull_a.unique_axes() {
        let world_axis = quat_a * axis;
        let depth = test_sep_axis(&world_axis, hull_a, pos_a, quat_a, hull_b, pos_b, quat_b)?;
        if depth < dmin {
            dmin = depth;
            best = world_axis;
        }
    }
    for axis in hull_b.unique_axes() {
        let world_axis = quat_b * axis;
        let depth = test_sep_axis(&world_axis, hull_a, pos_a, quat_a, hull_b, pos_b, quat_b)?;
        if depth < dmin {
            dmin = depth;
            best = world_axis;
        }
    }
    for edge_a in hull_a.unique_edges() {
        let world_a = quat_a * edge_a;
        for edge_b in hull_b.unique_edges() {
            let world_b = quat_b * edge_b;
            let axis = match world_a.cross(&world_b).try_normalize(DIRECTION_TOLERANCE) {
                Some(axis) => axis,
                None => continue, // near-parallel edges
            };
            let depth = test_sep_axis(&axis, hull_a, pos_a, quat_a, hull_b, pos_b, quat_b)?;
            // An edge axis only wins a strict improvement; ties keep the
            // face axis, which gives the solver a full face manifold.
            if depth < dmin - AXIS_TIE_TOLERANCE {
                dmin = depth;
                best = axis;
            }
        }
    }

    if dmin == f64::MAX {
        warn!("no candidate separating axes; degenerate hull skipped");
        return None;
    }
    // Orient from A toward B.
    if best.dot(&(pos_b - pos_a)) < 0.0 {
        best = -best;
    }
    Some(best)
}

/// Overlap depth of the two hulls projected onto `axis`, or `None` when the
/// projections do not strictly overlap.
pub fn test_sep_axis(
    axis: &Vector3<f64>,
    hull_a: &ConvexPolyhedron,
    pos_a: &Vector3<f64>,
    quat_a: &UnitQuaternion<f64>,
    hull_b: &ConvexPolyhedron,
    pos_b: &Vector3<f64>,
    quat_b: &UnitQuaternion<f64>,
) -> Option<f64> {
    let (max_a, min_a) = project(hull_a, axis, pos_a, quat_a);
    let (max_b, min_b) = project(hull_b, axis, pos_b, quat_b);
    if max_a <= min_b || max_b <= min_a {
        return None;
    }
    let d0 = max_a - min_b;
    let d1 = max_b - min_a;
    Some(d0.min(d1))
}

/// Project a hull onto a world-space axis; returns `(max, min)`.
fn project(
    hull: &ConvexPolyhedron,
    axis: &Vector3<f64>,
    pos: &Vector3<f64>,
    quat: &UnitQuaternion<f64>,
) -> (f64, f64) {
    // Rotate the axis into local space instead of transforming every vertex.
    let local_axis = quat.inverse_transform_vector(axis);
    let offset = pos.dot(axis);
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for v in hull.vertices() {
        let value = v.dot(&local_axis);
        min = min.min(value);
        max = max.max(value);
    }
    (max + offset, min + offset)
}

/// Clip the incident face of B against the side planes of the reference
/// face of A, keeping points that penetrate the reference plane.
fn clip_hulls(
    hull_a: &ConvexPolyhedron,
    pos_a: &Vector3<f64>,
    quat_a: &UnitQuaternion<f64>,
    hull_b: &ConvexPolyhedron,
    pos_b: &Vector3<f64>,
    quat_b: &UnitQuaternion<f64>,
    normal: &Vector3<f64>,
) -> Vec<ContactPoint, MAX_MANIFOLD_POINTS> {
    let mut contacts = Vec::new();

    // Incident face: the face of B most anti-parallel to the normal.
    let mut incident = usize::MAX;
    let mut dmin = f64::MAX;
    for (fi, face_normal) in hull_b.face_normals().iter().enumerate() {
        if *face_normal == Vector3::zeros() {
            continue;
        }
        let d = (quat_b * face_normal).dot(normal);
        if d < dmin {
            dmin = d;
            incident = fi;
        }
    }
    // Reference face: the face of A most parallel to the normal.
    let mut reference = usize::MAX;
    let mut dmax = f64::MIN;
    for (fi, face_normal) in hull_a.face_normals().iter().enumerate() {
        if *face_normal == Vector3::zeros() {
            continue;
        }
        let d = (quat_a * face_normal).dot(normal);
        if d > dmax {
            dmax = d;
            reference = fi;
        }
    }
    if incident == usize::MAX || reference == usize::MAX {
        debug!("no usable faces for clipping; empty manifold");
        return contacts;
    }

    // Incident face vertices in world space.
    let mut polygon: Vec<Vector3<f64>, MAX_CLIP_VERTICES> = Vec::new();
    for &index in hull_b.faces()[incident].iter() {
        let world = pos_b + quat_b * hull_b.vertices()[index as usize];
        let _ = polygon.push(world);
    }

    let ref_face = &hull_a.faces()[reference];
    let ref_normal = quat_a * hull_a.face_normals()[reference];

    // Clip against each side plane of the reference face. For a CCW face
    // with outward normal n, edge x n points out of the polygon.
    let count = ref_face.len();
    for i in 0..count {
        let a = pos_a + quat_a * hull_a.vertices()[ref_face[i] as usize];
        let b = pos_a + quat_a * hull_a.vertices()[ref_face[(i + 1) % count] as usize];
        let plane_normal = match (b - a).cross(&ref_normal).try_normalize(1e-12) {
            Some(n) => n,
            None => continue, // coincident vertices
        };
        let plane_constant = -a.dot(&plane_normal);
        polygon = clip_polygon_against_plane(&polygon, &plane_normal, plane_constant);
        if polygon.is_empty() {
            return contacts;
        }
    }

    // Keep points below the reference plane; their distance is the depth.
    let ref_point = pos_a + quat_a * hull_a.vertices()[ref_face[0] as usize];
    let ref_constant = -ref_point.dot(&ref_normal);
    for point in polygon.iter() {
        let separation = ref_normal.dot(point) + ref_constant;
        if separation <= 0.0 {
            let contact = ContactPoint {
                point: *point,
                depth: -separation,
            };
            if contacts.push(contact).is_err() {
                debug!(
                    "manifold capacity ({}) reached, extra contact points dropped",
                    MAX_MANIFOLD_POINTS
                );
                break;
            }
        }
    }
    contacts
}

/// Clip a polygon against the half-space `dot(n, p) + c <= 0`
/// (Sutherland-Hodgman, one plane).
fn clip_polygon_against_plane<const C: usize>(
    input: &Vec<Vector3<f64>, C>,
    plane_normal: &Vector3<f64>,
    plane_constant: f64,
) -> Vec<Vector3<f64>, C> {
    let mut output = Vec::new();
    if input.len() < 2 {
        return output;
    }
    let mut prev = input[input.len() - 1];
    let mut prev_dist = plane_normal.dot(&prev) + plane_constant;
    for &current in input.iter() {
        let current_dist = plane_normal.dot(&current) + plane_constant;
        if prev_dist <= 0.0 {
            if current_dist <= 0.0 {
                // both inside
                let _ = output.push(current);
            } else {
                // leaving the half-space
                let _ = output.push(intersect(&prev, &current, prev_dist, current_dist));
            }
        } else if current_dist <= 0.0 {
            // entering the half-space
            let _ = output.push(intersect(&prev, &current, prev_dist, current_dist));
            let _ = output.push(current);
        }
        prev = current;
        prev_dist = current_dist;
    }
    output
}

fn intersect(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
    from_dist: f64,
    to_dist: f64,
) -> Vector3<f64> {
    // Signs differ, so the denominator is nonzero.
    from + (to - from) * (from_dist / (from_dist - to_dist))
}
