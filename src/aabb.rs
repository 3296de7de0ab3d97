//! World-space axis-aligned bounding boxes.

use nalgebra::Vector3;

/// An axis-aligned bounding box given by its minimum and maximum corners.
///
/// Used by the broadphase to find candidate collision pairs. Boxes that
/// merely touch are treated as overlapping; the narrowphase decides whether
/// an actual contact exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Aabb {
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Build the smallest box enclosing a set of points.
    ///
    /// Returns `None` for an empty set.
    pub fn from_points<'a, I>(mut points: I) -> Option<Self>
    where
        I: Iterator<Item = &'a Vector3<f64>>,
    {
        let first = *points.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in points {
            aabb.extend(p);
        }
        Some(aabb)
    }

    /// Grow the box to enclose `point`.
    pub fn extend(&mut self, point: &Vector3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Componentwise interval overlap test, inclusive at the boundary.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Half the diagonal extent along each axis.
    pub fn half_extents(&self) -> Vector3<f64> {
        (self.max - self.min) * 0.5
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.max + self.min) * 0.5
    }
}
