//! Broadphase: AABB-based candidate pair generation.

use heapless::Vec;
use log::warn;

use crate::aabb::Aabb;
use crate::body::{BodyId, BodyType, RigidBody};

/// Naive O(n^2) broadphase over world-space AABBs.
///
/// Produces the unordered body pairs whose AABBs intersect, as ordered
/// `(i, j)` with `i < j`, ascending — identical input yields identical
/// output. Swapping in a spatial grid or BVH is an internal change; the
/// pair contract stays the same.
///
/// Pairs excluded by policy:
/// - pairs without at least one dynamic body (static and kinematic bodies
///   do not collide with each other),
/// - pairs where both bodies sleep,
/// - inactive or shapeless bodies,
/// - pairs failing the body- or shape-level group/mask filter.
#[derive(Debug, Default)]
pub struct NaiveBroadphase;

impl NaiveBroadphase {
    /// Collect candidate collision pairs. `aabbs` holds the precomputed
    /// world AABB per body slot (`None` for shapeless bodies).
    pub fn collision_pairs<const P: usize>(
        &self,
        bodies: &[RigidBody],
        aabbs: &[Option<Aabb>],
    ) -> Vec<(BodyId, BodyId), P> {
        let mut pairs = Vec::new();
        for i in 0..bodies.len() {
            let body_a = &bodies[i];
            let aabb_a = match aabbs[i] {
                Some(aabb) if body_a.active => aabb,
                _ => continue,
            };
            for j in (i + 1)..bodies.len() {
                let body_b = &bodies[j];
                let aabb_b = match aabbs[j] {
                    Some(aabb) if body_b.active => aabb,
                    _ => continue,
                };
                if !Self::should_pair(body_a, body_b) {
                    continue;
                }
                if !aabb_a.overlaps(&aabb_b) {
                    continue;
                }
                if pairs.push((BodyId(i), BodyId(j))).is_err() {
                    warn!("broadphase pair capacity ({}) exceeded, pairs dropped", P);
                    return pairs;
                }
            }
        }
        pairs
    }

    fn should_pair(a: &RigidBody, b: &RigidBody) -> bool {
        if a.body_type != BodyType::Dynamic && b.body_type != BodyType::Dynamic {
            return false;
        }
        if a.is_sleeping() && b.is_sleeping() {
            return false;
        }
        if a.collision_filter_group & b.collision_filter_mask == 0
            || b.collision_filter_group & a.collision_filter_mask == 0
        {
            return false;
        }
        match (&a.shape, &b.shape) {
            (Some(sa), Some(sb)) => {
                sa.options.collision_filter_group & sb.options.collision_filter_mask != 0
                    && sb.options.collision_filter_group & sa.options.collision_filter_mask != 0
            }
            _ => false,
        }
    }
}
