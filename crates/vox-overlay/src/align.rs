//! Translate a model so its local origin lands on the image center.
//!
//! Only translation is applied. The image orientation is recorded in the
//! model metadata but never used to rotate the mesh.

use vox_math::{Point3, Vector3};

use crate::model::{AlignmentMetadata, AlignmentToken, MeshModel};
use crate::spatial::SpatialDescriptor;

/// Result of a successful alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedTransform {
    pub center: Point3,
    pub original_position: Vector3,
    pub aligned_position: Vector3,
}

/// Align `model` to the center of `descriptor`.
///
/// Consumes `token`. When the descriptor has no center the model is left
/// untouched and the token is handed back.
pub fn align(
    token: AlignmentToken,
    model: &mut MeshModel,
    descriptor: &SpatialDescriptor,
) -> Result<AlignedTransform, AlignmentToken> {
    match descriptor.center() {
        Some(center) => Ok(align_to(token, model, center, descriptor)),
        None => Err(token),
    }
}

/// Align `model` to an explicit `center`, recording `descriptor` as its source.
pub fn align_to(
    token: AlignmentToken,
    model: &mut MeshModel,
    center: Point3,
    descriptor: &SpatialDescriptor,
) -> AlignedTransform {
    let original_position = model.transform().position;
    let aligned_position = original_position + center;

    let metadata = AlignmentMetadata {
        dicom_origin: Some(descriptor.origin),
        dicom_orientation: descriptor.orientation,
        original_position: Some(original_position),
        aligned_position: Some(aligned_position),
        provenance: Some(descriptor.provenance),
    };
    model.record_alignment(token, aligned_position, metadata);

    tracing::debug!(
        model = model.name(),
        center = %center,
        position = %aligned_position,
        provenance = ?descriptor.provenance,
        "aligned model to image center"
    );

    AlignedTransform {
        center,
        original_position,
        aligned_position,
    }
}
