//! Interface of the host rendering engine as seen by the overlay.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vox_core::{ActorId, ListenerId, VoxError, ViewId};
use vox_math::{Aabb3, Vector3};

use crate::{Actor, Camera};

/// Projection style of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    /// 2D slice view through the volume
    Orthographic,
    /// Free 3D view
    Volume3D,
}

/// The three canonical slice orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewOrientation {
    Axial,
    Sagittal,
    Coronal,
}

impl ViewOrientation {
    pub fn name(self) -> &'static str {
        match self {
            ViewOrientation::Axial => "axial",
            ViewOrientation::Sagittal => "sagittal",
            ViewOrientation::Coronal => "coronal",
        }
    }

    /// Patient axis perpendicular to slices of this orientation.
    pub fn axis(self) -> Vector3 {
        match self {
            ViewOrientation::Axial => Vector3::Z,
            ViewOrientation::Sagittal => Vector3::X,
            ViewOrientation::Coronal => Vector3::Y,
        }
    }
}

impl FromStr for ViewOrientation {
    type Err = VoxError;

    fn from_str(s: &str) -> Result<Self, VoxError> {
        match s.to_ascii_lowercase().as_str() {
            "axial" => Ok(ViewOrientation::Axial),
            "sagittal" => Ok(ViewOrientation::Sagittal),
            "coronal" => Ok(ViewOrientation::Coronal),
            other => Err(VoxError::InvalidOperation(format!(
                "unknown view orientation '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ViewOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Delivered by the host when a view's camera changes, once per registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraChanged {
    pub view: ViewId,
    pub listener: ListenerId,
}

/// Actor container of a viewport's drawing surface.
pub trait Renderer {
    fn add_actor(&mut self, actor: Actor);
    fn remove_actor(&mut self, id: ActorId) -> Option<Actor>;
    fn actor(&self, id: ActorId) -> Option<&Actor>;
    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor>;
    fn actors(&self) -> Box<dyn Iterator<Item = &Actor> + '_>;

    fn actor_count(&self) -> usize {
        self.actors().count()
    }

    fn has_actor(&self, id: ActorId) -> bool {
        self.actor(id).is_some()
    }
}

pub trait Viewport {
    fn id(&self) -> &ViewId;
    fn kind(&self) -> ViewKind;
    fn camera(&self) -> Camera;

    /// Validated orientation given to the view when it was created.
    fn orientation_tag(&self) -> Option<ViewOrientation> {
        None
    }

    /// Orientation option attached to the view by its layout.
    fn orientation_option(&self) -> Option<ViewOrientation> {
        None
    }

    /// `None` when the view has no attachable drawing surface.
    fn renderer(&self) -> Option<&dyn Renderer>;
    fn renderer_mut(&mut self) -> Option<&mut dyn Renderer>;
    fn render(&mut self);

    /// Register a camera-changed listener on the view's drawing surface.
    fn add_camera_listener(&mut self) -> ListenerId;
    fn remove_camera_listener(&mut self, id: ListenerId) -> bool;
    fn camera_listener_count(&self) -> usize;

    /// Bounds of everything currently drawn in the view.
    fn bounds(&self) -> Option<Aabb3> {
        let renderer = self.renderer()?;
        renderer
            .actors()
            .filter_map(|a| a.bounds())
            .reduce(|a, b| a.merge(&b))
    }
}

/// Registry of viewports owned by the rendering engine.
pub trait RenderHost {
    fn view_ids(&self) -> Vec<ViewId>;
    fn view(&self, id: &ViewId) -> Option<&dyn Viewport>;
    fn view_mut(&mut self, id: &ViewId) -> Option<&mut dyn Viewport>;
}
