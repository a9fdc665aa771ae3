pub mod aabb;
pub mod patient;
pub mod plane;
pub mod transform;

pub use glam::{DMat3, DMat4, DVec3};
pub use aabb::Aabb3;
pub use patient::{PatientFrame, VoxelFrame};
pub use plane::Plane;
pub use transform::trs_matrix;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;

/// Build a point from a loosely typed coordinate list.
///
/// Returns `None` unless the slice has exactly three finite components.
pub fn point_from_slice(values: &[f64]) -> Option<Point3> {
    match values {
        [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
            Some(DVec3::new(*x, *y, *z))
        }
        _ => None,
    }
}
