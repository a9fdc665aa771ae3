//! Loaded mesh models and their per-model state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vox_core::{ActorId, CutterId, ModelId, ViewId};
use vox_math::{trs_matrix, DMat4, Point3, Vector3, VoxelFrame};
use vox_mesh::{MeshFormat, TriangleMesh};

use crate::spatial::Provenance;

/// Lifecycle position of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Loading,
    Aligned,
    Attached,
    CrossSectioned,
    Removed,
}

/// Placement of a mesh in patient space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    /// mm, patient space
    pub position: Vector3,
    /// Degrees per axis
    pub orientation_deg: Vector3,
    pub scale: Vector3,
}

impl ModelTransform {
    pub fn new(position: Vector3, orientation_deg: Vector3, scale: Vector3) -> Self {
        Self {
            position,
            orientation_deg,
            scale,
        }
    }

    pub fn matrix(&self) -> DMat4 {
        trs_matrix(self.position, self.orientation_deg, self.scale)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::ZERO, Vector3::ONE)
    }
}

/// Record of how the model was placed against the image. Written once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentMetadata {
    pub dicom_origin: Option<Point3>,
    pub dicom_orientation: Option<[f64; 6]>,
    pub original_position: Option<Point3>,
    pub aligned_position: Option<Point3>,
    pub provenance: Option<Provenance>,
}

/// One-time permission to align a model.
///
/// Created only together with its model and consumed by alignment, so a
/// model can never have the volume center added to its position twice.
#[derive(Debug)]
pub struct AlignmentToken {
    _private: (),
}

/// A surface mesh placed in the scene.
#[derive(Debug)]
pub struct MeshModel {
    id: ModelId,
    name: String,
    format: MeshFormat,
    geometry: Option<Arc<TriangleMesh>>,
    world_geometry: Option<Arc<TriangleMesh>>,
    transform: ModelTransform,
    metadata: AlignmentMetadata,
    voxel_frame: Option<VoxelFrame>,
    state: ModelState,
    pub(crate) visible: bool,
    pub(crate) color: [f32; 3],
    pub(crate) opacity: f32,
    pub(crate) surface: Option<(ViewId, ActorId)>,
    pub(crate) cutters: Vec<CutterId>,
    alignment_token: Option<AlignmentToken>,
}

impl MeshModel {
    pub(crate) fn new(
        id: ModelId,
        name: impl Into<String>,
        format: MeshFormat,
        geometry: TriangleMesh,
        transform: ModelTransform,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            format,
            geometry: Some(Arc::new(geometry)),
            world_geometry: None,
            transform,
            metadata: AlignmentMetadata::default(),
            voxel_frame: None,
            state: ModelState::Loading,
            visible: true,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            surface: None,
            cutters: Vec::new(),
            alignment_token: Some(AlignmentToken { _private: () }),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> MeshFormat {
        self.format
    }

    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    pub fn metadata(&self) -> &AlignmentMetadata {
        &self.metadata
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_aligned(&self) -> bool {
        self.metadata.aligned_position.is_some()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Mesh in its authored coordinates. `None` once released.
    pub fn geometry(&self) -> Option<&Arc<TriangleMesh>> {
        self.geometry.as_ref()
    }

    /// Mesh in patient space, available once attached.
    pub fn world_geometry(&self) -> Option<&Arc<TriangleMesh>> {
        self.world_geometry.as_ref()
    }

    pub fn voxel_frame(&self) -> Option<&VoxelFrame> {
        self.voxel_frame.as_ref()
    }

    pub fn cutter_ids(&self) -> &[CutterId] {
        &self.cutters
    }

    pub fn surface_actor(&self) -> Option<ActorId> {
        self.surface.as_ref().map(|(_, actor)| *actor)
    }

    /// Take the alignment permission; `None` after the first call.
    pub fn take_alignment_token(&mut self) -> Option<AlignmentToken> {
        self.alignment_token.take()
    }

    pub(crate) fn restore_alignment_token(&mut self, token: AlignmentToken) {
        self.alignment_token = Some(token);
    }

    pub(crate) fn record_alignment(
        &mut self,
        _token: AlignmentToken,
        position: Vector3,
        metadata: AlignmentMetadata,
    ) {
        self.transform.position = position;
        self.metadata = metadata;
        self.state = ModelState::Aligned;
    }

    pub(crate) fn set_voxel_frame(&mut self, frame: Option<VoxelFrame>) {
        self.voxel_frame = frame;
    }

    pub(crate) fn set_state(&mut self, state: ModelState) {
        self.state = state;
    }

    /// Compute the patient-space mesh from the final transform.
    pub(crate) fn bake_world_geometry(&mut self) -> Option<Arc<TriangleMesh>> {
        let local = self.geometry.as_ref()?;
        let world = Arc::new(local.transformed(&self.transform.matrix()));
        self.world_geometry = Some(Arc::clone(&world));
        Some(world)
    }

    pub(crate) fn release_geometry(&mut self) {
        self.world_geometry = None;
        self.geometry = None;
    }
}
