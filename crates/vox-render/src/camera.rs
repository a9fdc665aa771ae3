use serde::{Deserialize, Serialize};
use vox_math::{Aabb3, Point3, Vector3};

/// Orthographic slice camera.
///
/// The view-plane normal is the direction of projection, from the camera
/// position toward the focal point. Moving along the negative normal moves
/// toward the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Point3,
    pub focal_point: Point3,
    pub view_up: Vector3,
    /// Half the height of the visible area in mm
    pub parallel_scale: f64,
}

impl Camera {
    pub fn new(position: Point3, focal_point: Point3, view_up: Vector3, parallel_scale: f64) -> Self {
        Self {
            position,
            focal_point,
            view_up,
            parallel_scale,
        }
    }

    /// Camera at `distance` behind `focal_point`, projecting along `normal`.
    pub fn looking_along(focal_point: Point3, normal: Vector3, view_up: Vector3, distance: f64) -> Self {
        Self {
            position: Self::position_for(focal_point, normal, distance),
            focal_point,
            view_up,
            parallel_scale: 100.0,
        }
    }

    /// Camera position for a focal point, projection direction and distance.
    pub fn position_for(focal_point: Point3, normal: Vector3, distance: f64) -> Point3 {
        focal_point - normal.normalize_or_zero() * distance
    }

    pub fn axial(focal_point: Point3) -> Self {
        Self::looking_along(focal_point, Vector3::Z, Vector3::NEG_Y, 500.0)
    }

    pub fn sagittal(focal_point: Point3) -> Self {
        Self::looking_along(focal_point, Vector3::X, Vector3::Z, 500.0)
    }

    pub fn coronal(focal_point: Point3) -> Self {
        Self::looking_along(focal_point, Vector3::Y, Vector3::Z, 500.0)
    }

    /// Unit direction of projection, or zero when position and focal point coincide.
    pub fn view_plane_normal(&self) -> Vector3 {
        (self.focal_point - self.position).normalize_or_zero()
    }

    pub fn distance(&self) -> f64 {
        (self.focal_point - self.position).length()
    }

    /// Right and up unit vectors spanning the view plane.
    pub fn in_plane_axes(&self) -> (Vector3, Vector3) {
        let normal = self.view_plane_normal();
        let right = self.view_up.cross(normal).normalize_or_zero();
        let up = normal.cross(right);
        (right, up)
    }

    /// Pan the camera and focal point together in the view plane.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (right, up) = self.in_plane_axes();
        let offset = right * dx + up * dy;
        self.position += offset;
        self.focal_point += offset;
    }

    /// Zoom by a factor; values above 1 magnify.
    pub fn zoom(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.parallel_scale /= factor;
        }
    }

    /// Move the slice along the view-plane normal by `delta` mm.
    pub fn scroll(&mut self, delta: f64) {
        let offset = self.view_plane_normal() * delta;
        self.position += offset;
        self.focal_point += offset;
    }

    /// Center on an AABB and scale so it fits the view.
    pub fn fit_to_aabb(&mut self, aabb: &Aabb3) {
        let normal = self.view_plane_normal();
        let distance = self.distance();
        let size = aabb.extents();
        self.focal_point = aabb.center();
        self.position = Self::position_for(self.focal_point, normal, distance);
        self.parallel_scale = size.x.max(size.y).max(size.z) * 0.5;
    }
}

impl Default for Camera {
    /// Axial camera centered at the origin.
    fn default() -> Self {
        Self::axial(Point3::ZERO)
    }
}
