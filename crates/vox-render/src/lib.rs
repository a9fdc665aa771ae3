pub mod actor;
pub mod camera;
pub mod scene;
pub mod viewport;

// Re-export main types
pub use actor::{Actor, ActorGeometry, CoincidentTopology};
pub use camera::Camera;
pub use scene::{Scene, SceneRenderer, SceneView};
pub use viewport::{CameraChanged, RenderHost, Renderer, ViewKind, ViewOrientation, Viewport};
