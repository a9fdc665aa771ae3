//! Headless in-memory rendering host.
//!
//! Keeps cameras, actors and listener registrations for a set of views and
//! reports camera changes as [`CameraChanged`] events for the caller to
//! dispatch. Useful for tests and for driving the overlay without a GPU.

use vox_core::{ActorId, ListenerId, ViewId};
use vox_math::{Aabb3, Point3};

use crate::viewport::{CameraChanged, RenderHost, Renderer, ViewKind, ViewOrientation, Viewport};
use crate::{Actor, Camera};

/// Actor list of one view.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    actors: Vec<Actor>,
}

impl Renderer for SceneRenderer {
    fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(idx))
    }

    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    fn actors(&self) -> Box<dyn Iterator<Item = &Actor> + '_> {
        Box::new(self.actors.iter())
    }

    fn actor_count(&self) -> usize {
        self.actors.len()
    }
}

/// One viewport in the scene.
#[derive(Debug, Clone)]
pub struct SceneView {
    id: ViewId,
    kind: ViewKind,
    camera: Camera,
    orientation_tag: Option<ViewOrientation>,
    orientation_option: Option<ViewOrientation>,
    renderer: Option<SceneRenderer>,
    listeners: Vec<ListenerId>,
    render_count: usize,
}

impl SceneView {
    pub fn new(id: impl Into<ViewId>, kind: ViewKind, camera: Camera) -> Self {
        Self {
            id: id.into(),
            kind,
            camera,
            orientation_tag: None,
            orientation_option: None,
            renderer: Some(SceneRenderer::default()),
            listeners: Vec::new(),
            render_count: 0,
        }
    }

    /// Orthographic view tagged with `orientation` and its canonical camera.
    pub fn slice(id: impl Into<ViewId>, orientation: ViewOrientation, focal_point: Point3) -> Self {
        let camera = match orientation {
            ViewOrientation::Axial => Camera::axial(focal_point),
            ViewOrientation::Sagittal => Camera::sagittal(focal_point),
            ViewOrientation::Coronal => Camera::coronal(focal_point),
        };
        Self::new(id, ViewKind::Orthographic, camera).with_orientation_tag(orientation)
    }

    pub fn with_orientation_tag(mut self, orientation: ViewOrientation) -> Self {
        self.orientation_tag = Some(orientation);
        self
    }

    pub fn with_orientation_option(mut self, orientation: ViewOrientation) -> Self {
        self.orientation_option = Some(orientation);
        self
    }

    /// Drop the drawing surface, as for a view that is not yet mounted.
    pub fn without_renderer(mut self) -> Self {
        self.renderer = None;
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.add_actor(actor);
        }
        self
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }
}

impl Viewport for SceneView {
    fn id(&self) -> &ViewId {
        &self.id
    }

    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn camera(&self) -> Camera {
        self.camera.clone()
    }

    fn orientation_tag(&self) -> Option<ViewOrientation> {
        self.orientation_tag
    }

    fn orientation_option(&self) -> Option<ViewOrientation> {
        self.orientation_option
    }

    fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_ref().map(|r| r as &dyn Renderer)
    }

    fn renderer_mut(&mut self) -> Option<&mut dyn Renderer> {
        self.renderer.as_mut().map(|r| r as &mut dyn Renderer)
    }

    fn render(&mut self) {
        self.render_count += 1;
    }

    fn add_camera_listener(&mut self) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push(id);
        id
    }

    fn remove_camera_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|&l| l != id);
        self.listeners.len() != before
    }

    fn camera_listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// A set of viewports.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    views: Vec<SceneView>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self { views: Vec::new() }
    }

    /// Axial, sagittal and coronal slice views plus one 3D view, all
    /// centered on `focal_point`.
    pub fn mpr_with_3d(focal_point: Point3) -> Self {
        let mut scene = Self::new();
        scene.add_view(SceneView::slice("axial", ViewOrientation::Axial, focal_point));
        scene.add_view(SceneView::slice("sagittal", ViewOrientation::Sagittal, focal_point));
        scene.add_view(SceneView::slice("coronal", ViewOrientation::Coronal, focal_point));
        scene.add_view(SceneView::new(
            "volume3d",
            ViewKind::Volume3D,
            Camera::coronal(focal_point),
        ));
        scene
    }

    pub fn add_view(&mut self, view: SceneView) {
        self.views.push(view);
    }

    pub fn scene_view(&self, id: &ViewId) -> Option<&SceneView> {
        self.views.iter().find(|v| &v.id == id)
    }

    /// Replace a view's camera, returning one event per registered listener.
    pub fn set_camera(&mut self, id: &ViewId, camera: Camera) -> Vec<CameraChanged> {
        self.update_camera(id, |c| *c = camera)
    }

    /// Mutate a view's camera, returning one event per registered listener.
    pub fn update_camera(&mut self, id: &ViewId, f: impl FnOnce(&mut Camera)) -> Vec<CameraChanged> {
        let Some(view) = self.views.iter_mut().find(|v| &v.id == id) else {
            return Vec::new();
        };
        f(&mut view.camera);
        view.listeners
            .iter()
            .map(|&listener| CameraChanged {
                view: view.id.clone(),
                listener,
            })
            .collect()
    }

    /// Number of actors in one view, zero if it has no renderer.
    pub fn actor_count(&self, id: &ViewId) -> usize {
        self.scene_view(id)
            .and_then(|v| v.renderer.as_ref())
            .map_or(0, |r| r.actor_count())
    }

    /// Total actor count across all views.
    pub fn total_actors(&self) -> usize {
        self.views
            .iter()
            .filter_map(|v| v.renderer.as_ref())
            .map(|r| r.actor_count())
            .sum()
    }

    /// Total registered camera listeners across all views.
    pub fn total_listeners(&self) -> usize {
        self.views.iter().map(|v| v.listeners.len()).sum()
    }

    /// Bounds of everything drawn in any view.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.views
            .iter()
            .filter_map(|v| v.bounds())
            .reduce(|a, b| a.merge(&b))
    }
}

impl RenderHost for Scene {
    fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id.clone()).collect()
    }

    fn view(&self, id: &ViewId) -> Option<&dyn Viewport> {
        self.scene_view(id).map(|v| v as &dyn Viewport)
    }

    fn view_mut(&mut self, id: &ViewId) -> Option<&mut dyn Viewport> {
        self.views
            .iter_mut()
            .find(|v| &v.id == id)
            .map(|v| v as &mut dyn Viewport)
    }
}
