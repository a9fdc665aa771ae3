//! Routing of camera-changed notifications to cutters.

use std::collections::HashMap;

use vox_core::{CutterId, ListenerId};
use vox_render::Viewport;

/// One listener per attached cutter, keyed by the id its view handed out.
///
/// Does not deduplicate; the manager attaches each cutter once.
#[derive(Debug, Default)]
pub struct CameraSync {
    routes: HashMap<ListenerId, CutterId>,
}

impl CameraSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a camera listener on `view` that drives `cutter`.
    pub fn attach(&mut self, view: &mut dyn Viewport, cutter: CutterId) -> ListenerId {
        let listener = view.add_camera_listener();
        self.routes.insert(listener, cutter);
        tracing::trace!(view = %view.id(), listener = %listener, "camera listener attached");
        listener
    }

    /// Remove `listener` from `view` (if the view still exists) and forget its route.
    pub fn detach(&mut self, view: Option<&mut dyn Viewport>, listener: ListenerId) -> bool {
        let routed = self.routes.remove(&listener).is_some();
        let unregistered = match view {
            Some(view) => view.remove_camera_listener(listener),
            None => false,
        };
        routed || unregistered
    }

    pub fn route(&self, listener: ListenerId) -> Option<CutterId> {
        self.routes.get(&listener).copied()
    }

    pub fn listener_count(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
