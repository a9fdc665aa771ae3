//! Surface mesh overlay for volumetric image viewers.
//!
//! Loaded meshes are translated to the center of the displayed image and
//! shown as a surface in the 3D view and as live contours in every slice view.

pub mod align;
pub mod config;
pub mod cross_section;
pub mod events;
pub mod manager;
pub mod model;
pub mod render_order;
pub mod spatial;
pub mod sync;

pub use align::{align, align_to, AlignedTransform};
pub use config::{OverlayConfig, RenderOrderConfig};
pub use cross_section::{
    classify_view, dominant_orientation, Classification, ClassificationBasis, ContourStyle,
    CrosshairSource, Cutter, NoCrosshair, PlaneSource, SharedCrosshair, SkipReason, UpdateContext,
    UpdateOutcome,
};
pub use events::{ModelEvent, ModelSnapshot};
pub use manager::{CutterInfo, LayoutMode, LoadRequest, OverlayManager, SpatialContext};
pub use model::{AlignmentMetadata, AlignmentToken, MeshModel, ModelState, ModelTransform};
pub use render_order::RenderOrder;
pub use spatial::{
    resolve, slice_index, ImageHandle, ImagePlaneMetadata, ImageSource, MetadataProvider,
    NoMetadata, Provenance, SpatialDescriptor, VolumeGrid,
};
pub use sync::CameraSync;
