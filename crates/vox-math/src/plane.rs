use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use vox_core::Tolerance;

/// A cutting plane in patient space defined by a point and unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vector3,
}

impl Plane {
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
        }
    }

    /// Build a plane, rejecting non-finite origins and degenerate normals.
    pub fn try_new(origin: Point3, normal: Vector3, tol: Tolerance) -> Option<Self> {
        if !origin.is_finite() || !tol.is_direction(normal.length()) {
            return None;
        }
        Some(Self::new(origin, normal))
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.normal)
    }
}
