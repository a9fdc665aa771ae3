//! Patient-space conventions: LPS/RAS frames and voxel-index mapping.

use crate::{DMat3, DMat4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Handedness convention of a patient coordinate frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientFrame {
    /// Left, Posterior, Superior (DICOM)
    #[default]
    Lps,
    /// Right, Anterior, Superior
    Ras,
}

impl PatientFrame {
    /// Express a point given in `self` in the `target` frame.
    pub fn convert_point(self, target: PatientFrame, p: Point3) -> Point3 {
        if self == target {
            p
        } else {
            Point3::new(-p.x, -p.y, p.z)
        }
    }

    /// Express direction columns given in `self` in the `target` frame.
    pub fn convert_axes(self, target: PatientFrame, axes: DMat3) -> DMat3 {
        DMat3::from_cols(
            self.convert_point(target, axes.x_axis),
            self.convert_point(target, axes.y_axis),
            self.convert_point(target, axes.z_axis),
        )
    }
}

/// Mapping between continuous voxel indices (i, j, k) and patient space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelFrame {
    pub origin: Point3,
    /// Columns are the row, column and slice direction unit vectors.
    pub axes: DMat3,
    pub spacing: Vector3,
}

impl VoxelFrame {
    pub fn new(origin: Point3, axes: DMat3, spacing: Vector3) -> Self {
        Self {
            origin,
            axes,
            spacing,
        }
    }

    /// Axis-aligned frame (identity direction cosines).
    pub fn axis_aligned(origin: Point3, spacing: Vector3) -> Self {
        Self::new(origin, DMat3::IDENTITY, spacing)
    }

    /// Build from six DICOM direction cosines (row direction, column direction).
    /// The slice direction is their cross product.
    pub fn from_cosines(origin: Point3, cosines: [f64; 6], spacing: Vector3) -> Self {
        let row = Vector3::new(cosines[0], cosines[1], cosines[2]);
        let column = Vector3::new(cosines[3], cosines[4], cosines[5]);
        let slice = row.cross(column);
        Self::new(origin, DMat3::from_cols(row, column, slice), spacing)
    }

    /// Row and column direction cosines, flattened.
    pub fn cosines(&self) -> [f64; 6] {
        let r = self.axes.x_axis;
        let c = self.axes.y_axis;
        [r.x, r.y, r.z, c.x, c.y, c.z]
    }

    pub fn index_to_patient(&self) -> DMat4 {
        let linear = self.axes * DMat3::from_diagonal(self.spacing);
        let mut m = DMat4::from_mat3(linear);
        m.w_axis = self.origin.extend(1.0);
        m
    }

    pub fn to_patient(&self, ijk: Vector3) -> Point3 {
        self.index_to_patient().transform_point3(ijk)
    }

    /// Continuous voxel index of a patient-space point, if the frame is invertible.
    pub fn to_index(&self, p: Point3) -> Option<Vector3> {
        let m = self.index_to_patient();
        if m.determinant().abs() < 1e-15 {
            return None;
        }
        Some(m.inverse().transform_point3(p))
    }
}
