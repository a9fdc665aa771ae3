use crate::{DMat4, Vector3};

/// Model matrix from translation, rotation (degrees per axis) and per-axis scale.
///
/// Rotations are applied about Z, then X, then Y; scale is applied first
/// and translation last.
pub fn trs_matrix(position: Vector3, rotation_deg: Vector3, scale: Vector3) -> DMat4 {
    let rotation = DMat4::from_rotation_y(rotation_deg.y.to_radians())
        * DMat4::from_rotation_x(rotation_deg.x.to_radians())
        * DMat4::from_rotation_z(rotation_deg.z.to_radians());
    DMat4::from_translation(position) * rotation * DMat4::from_scale(scale)
}
