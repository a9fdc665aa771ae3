//! Notifications produced for the host application.

use serde::Serialize;
use vox_core::{ModelId, Result, VoxError};
use vox_mesh::MeshFormat;

use crate::model::{AlignmentMetadata, MeshModel, ModelState, ModelTransform};

/// Point-in-time view of a model, carried by [`ModelEvent`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub id: ModelId,
    pub name: String,
    pub format: MeshFormat,
    pub state: ModelState,
    pub transform: ModelTransform,
    pub metadata: AlignmentMetadata,
    pub visible: bool,
    pub color: [f32; 3],
    pub opacity: f32,
    pub cutter_count: usize,
}

impl ModelSnapshot {
    pub fn of(model: &MeshModel) -> Self {
        Self {
            id: model.id(),
            name: model.name().to_string(),
            format: model.format(),
            state: model.state(),
            transform: *model.transform(),
            metadata: model.metadata().clone(),
            visible: model.visible(),
            color: model.color(),
            opacity: model.opacity(),
            cutter_count: model.cutter_ids().len(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| VoxError::InvalidOperation(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModelEvent {
    Added { id: ModelId, snapshot: ModelSnapshot },
    Removed { id: ModelId, snapshot: ModelSnapshot },
    LoadFailed { name: String, reason: String },
}

impl ModelEvent {
    pub fn model_id(&self) -> Option<ModelId> {
        match self {
            ModelEvent::Added { id, .. } | ModelEvent::Removed { id, .. } => Some(*id),
            ModelEvent::LoadFailed { .. } => None,
        }
    }
}
