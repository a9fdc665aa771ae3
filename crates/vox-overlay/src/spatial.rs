//! Resolve the patient-space geometry of the displayed image.
//!
//! Three sources are tried in order: the voxel grid of a loaded volume, the
//! per-slice positional metadata of a 2D stack, and finally the bounds of
//! whatever is currently rendered. The last one only yields an approximate
//! origin and is tagged so callers can tell it apart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vox_core::traits::Validate;
use vox_core::{Result, VoxError};
use vox_math::{Aabb3, DMat3, PatientFrame, Plane, Point3, Vector3, VoxelFrame};

/// Which data source produced a [`SpatialDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    VoxelGrid,
    SliceMetadata,
    /// Approximate: origin is the center of the rendered bounds.
    RenderedBounds,
}

/// Patient-space geometry of a volumetric image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialDescriptor {
    /// Position of the first voxel, mm
    pub origin: Point3,
    /// Row then column direction cosines
    pub orientation: Option<[f64; 6]>,
    /// mm per voxel along each axis
    pub spacing: Option<Vector3>,
    /// Voxel counts along each axis
    pub dimensions: Option<[u32; 3]>,
    pub provenance: Provenance,
}

impl SpatialDescriptor {
    /// `origin + spacing * dimensions / 2`, when spacing and dimensions are known.
    pub fn center(&self) -> Option<Point3> {
        let spacing = self.spacing?;
        let [i, j, k] = self.dimensions?;
        let dims = Vector3::new(f64::from(i), f64::from(j), f64::from(k));
        Some(self.origin + spacing * dims / 2.0)
    }

    pub fn is_approximate(&self) -> bool {
        self.provenance == Provenance::RenderedBounds
    }

    /// Voxel-index frame, when spacing is known. Axis-aligned if no orientation.
    pub fn voxel_frame(&self) -> Option<VoxelFrame> {
        let spacing = self.spacing?;
        Some(match self.orientation {
            Some(cosines) => VoxelFrame::from_cosines(self.origin, cosines, spacing),
            None => VoxelFrame::axis_aligned(self.origin, spacing),
        })
    }
}

impl Validate for SpatialDescriptor {
    fn validate(&self) -> Result<()> {
        if !self.origin.is_finite() {
            return Err(VoxError::Geometry("origin is not finite".into()));
        }
        if let Some(spacing) = self.spacing {
            if !spacing.is_finite() || spacing.min_element() <= 0.0 {
                return Err(VoxError::Geometry(format!(
                    "spacing must be positive, got {spacing}"
                )));
            }
        }
        if let Some(cosines) = self.orientation {
            if cosines.iter().any(|c| !c.is_finite()) {
                return Err(VoxError::Geometry("orientation is not finite".into()));
            }
        }
        Ok(())
    }
}

/// Voxel grid of a fully loaded volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGrid {
    pub origin: Point3,
    /// Columns are the row, column and slice directions.
    pub direction: DMat3,
    pub spacing: Vector3,
    pub dimensions: [u32; 3],
    /// Convention the host reports origin and directions in. Descriptors are
    /// always LPS.
    pub frame: PatientFrame,
}

/// Per-slice positional metadata, as found in DICOM image plane tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePlaneMetadata {
    pub image_position_patient: Option<[f64; 3]>,
    pub image_orientation_patient: Option<[f64; 6]>,
    /// Distance between adjacent rows, mm
    pub row_spacing: Option<f64>,
    /// Distance between adjacent columns, mm
    pub column_spacing: Option<f64>,
    pub slice_thickness: Option<f64>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
}

/// Lookup of positional metadata keyed by image identifier.
pub trait MetadataProvider {
    fn image_plane(&self, image_id: &str) -> Option<ImagePlaneMetadata>;
}

impl MetadataProvider for HashMap<String, ImagePlaneMetadata> {
    fn image_plane(&self, image_id: &str) -> Option<ImagePlaneMetadata> {
        self.get(image_id).cloned()
    }
}

/// Metadata provider with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
    fn image_plane(&self, _image_id: &str) -> Option<ImagePlaneMetadata> {
        None
    }
}

/// What the target view is displaying.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Volume(VolumeGrid),
    /// One 2D image of a series, with the number of slices loaded so far.
    Stack { image_id: String, loaded_slices: u32 },
}

/// Handle to the displayed image, as handed to the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageHandle {
    pub source: Option<ImageSource>,
    pub rendered_bounds: Option<Aabb3>,
}

impl ImageHandle {
    pub fn volume(grid: VolumeGrid) -> Self {
        Self {
            source: Some(ImageSource::Volume(grid)),
            rendered_bounds: None,
        }
    }

    pub fn stack(image_id: impl Into<String>, loaded_slices: u32) -> Self {
        Self {
            source: Some(ImageSource::Stack {
                image_id: image_id.into(),
                loaded_slices,
            }),
            rendered_bounds: None,
        }
    }

    pub fn with_rendered_bounds(mut self, bounds: Aabb3) -> Self {
        self.rendered_bounds = Some(bounds);
        self
    }
}

/// Resolve the spatial descriptor of `handle`.
///
/// Returns `None` when no source yields usable data; this means "skip
/// alignment", not failure.
pub fn resolve(handle: &ImageHandle, metadata: &dyn MetadataProvider) -> Option<SpatialDescriptor> {
    let from_source = match &handle.source {
        Some(ImageSource::Volume(grid)) => Some(from_volume(grid)),
        Some(ImageSource::Stack {
            image_id,
            loaded_slices,
        }) => from_slice_metadata(image_id, *loaded_slices, metadata),
        None => None,
    };

    let valid: Vec<SpatialDescriptor> = from_source
        .into_iter()
        .chain(handle.rendered_bounds.and_then(from_bounds))
        .filter(|descriptor| match descriptor.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provenance = ?descriptor.provenance, error = %e, "discarding spatial descriptor");
                false
            }
        })
        .collect();

    // A descriptor that cannot locate the image center loses to the bounds.
    let index = valid
        .iter()
        .position(|d| d.center().is_some())
        .or_else(|| valid.iter().position(SpatialDescriptor::is_approximate))
        .or((!valid.is_empty()).then_some(0))?;
    valid.into_iter().nth(index)
}

fn from_volume(grid: &VolumeGrid) -> SpatialDescriptor {
    let direction = grid.frame.convert_axes(PatientFrame::Lps, grid.direction);
    let row = direction.x_axis;
    let column = direction.y_axis;
    SpatialDescriptor {
        origin: grid.frame.convert_point(PatientFrame::Lps, grid.origin),
        orientation: Some([row.x, row.y, row.z, column.x, column.y, column.z]),
        spacing: Some(grid.spacing),
        dimensions: Some(grid.dimensions),
        provenance: Provenance::VoxelGrid,
    }
}

fn from_slice_metadata(
    image_id: &str,
    loaded_slices: u32,
    metadata: &dyn MetadataProvider,
) -> Option<SpatialDescriptor> {
    let Some(plane) = metadata.image_plane(image_id) else {
        tracing::debug!(image_id, "no image plane metadata");
        return None;
    };
    let origin = Point3::from_array(plane.image_position_patient?);

    let spacing = match (plane.column_spacing, plane.row_spacing, plane.slice_thickness) {
        (Some(x), Some(y), Some(z)) => Some(Vector3::new(x, y, z)),
        _ => None,
    };
    let dimensions = match (plane.columns, plane.rows) {
        (Some(columns), Some(rows)) if loaded_slices > 0 => Some([columns, rows, loaded_slices]),
        _ => None,
    };

    Some(SpatialDescriptor {
        origin,
        orientation: plane.image_orientation_patient,
        spacing,
        dimensions,
        provenance: Provenance::SliceMetadata,
    })
}

fn from_bounds(bounds: Aabb3) -> Option<SpatialDescriptor> {
    if !bounds.is_finite() {
        return None;
    }
    Some(SpatialDescriptor {
        origin: bounds.center(),
        orientation: None,
        spacing: None,
        dimensions: None,
        provenance: Provenance::RenderedBounds,
    })
}

/// Continuous voxel index along the frame axis closest to the plane normal.
pub fn slice_index(frame: &VoxelFrame, plane: &Plane) -> Option<f64> {
    let ijk = frame.to_index(plane.origin)?;
    let axes = [frame.axes.x_axis, frame.axes.y_axis, frame.axes.z_axis];
    let axis = (0..3).max_by(|&a, &b| {
        let da = axes[a].dot(plane.normal).abs();
        let db = axes[b].dot(plane.normal).abs();
        da.total_cmp(&db)
    })?;
    Some(ijk[axis])
}
