//! Model registry and lifecycle orchestration.
//!
//! The host drives everything through explicit calls: loading a file,
//! switching layouts, forwarding camera-changed events and crosshair moves,
//! and removing models. All work happens synchronously inside those calls.

use slotmap::SlotMap;
use vox_core::traits::Validate;
use vox_core::{CutterId, ModelId, Result, ViewId, VoxError};
use vox_math::{Plane, Vector3};
use vox_mesh::{MeshFormat, MeshLoader};
use vox_render::{Actor, CameraChanged, RenderHost, ViewKind, ViewOrientation};

use crate::align::{align, align_to, AlignedTransform};
use crate::config::OverlayConfig;
use crate::cross_section::{
    classify_view, ClassificationBasis, ContourStyle, CrosshairSource, Cutter, SkipReason,
    UpdateContext, UpdateOutcome,
};
use crate::events::{ModelEvent, ModelSnapshot};
use crate::model::{MeshModel, ModelState, ModelTransform};
use crate::render_order::RenderOrder;
use crate::spatial::{self, ImageHandle, MetadataProvider, SpatialDescriptor};
use crate::sync::CameraSync;

/// Active multi-view arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Single 3D view.
    #[default]
    Volume3D,
    /// Three slice views.
    Mpr,
    /// Three slice views plus a 3D view.
    Mpr3D,
}

impl LayoutMode {
    pub fn requires_cross_sections(self) -> bool {
        matches!(self, LayoutMode::Mpr | LayoutMode::Mpr3D)
    }
}

/// A mesh file to load.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// View that receives the surface actor. Defaults to the first 3D view.
    pub target_view: Option<ViewId>,
}

impl LoadRequest {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.clone(),
            file_name,
            bytes: bytes.into(),
            target_view: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_target_view(mut self, view: impl Into<ViewId>) -> Self {
        self.target_view = Some(view.into());
        self
    }
}

/// The image a model is aligned against.
#[derive(Clone, Copy)]
pub struct SpatialContext<'a> {
    pub image: &'a ImageHandle,
    pub metadata: &'a dyn MetadataProvider,
}

/// Summary of one cutter's current state.
#[derive(Debug, Clone, PartialEq)]
pub struct CutterInfo {
    pub model: ModelId,
    pub view: ViewId,
    pub orientation: ViewOrientation,
    pub basis: ClassificationBasis,
    pub plane: Option<Plane>,
    /// Continuous voxel slice index of the plane, when the model was aligned
    /// against a voxel frame.
    pub slice_index: Option<f64>,
    pub segment_count: usize,
    pub update_count: u64,
}

pub struct OverlayManager {
    config: OverlayConfig,
    render_order: RenderOrder,
    layout: LayoutMode,
    models: SlotMap<ModelId, MeshModel>,
    cutters: SlotMap<CutterId, Cutter>,
    sync: CameraSync,
    events: Vec<ModelEvent>,
}

impl OverlayManager {
    pub fn new(config: OverlayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            render_order: RenderOrder::new(config.render_order.clone()),
            config,
            layout: LayoutMode::default(),
            models: SlotMap::with_key(),
            cutters: SlotMap::with_key(),
            sync: CameraSync::new(),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Load, align and attach a mesh.
    ///
    /// Only format and parse errors fail the load. Missing spatial metadata or
    /// a missing view degrade to an unaligned or undisplayed model.
    pub fn load_model(
        &mut self,
        host: &mut dyn RenderHost,
        loader: &dyn MeshLoader,
        request: LoadRequest,
        image: Option<SpatialContext<'_>>,
        crosshair: &dyn CrosshairSource,
    ) -> Result<ModelId> {
        let LoadRequest {
            name,
            file_name,
            bytes,
            target_view,
        } = request;

        let parsed = MeshFormat::from_path(&file_name).and_then(|format| {
            let mesh = loader.load(format, &bytes)?;
            if mesh.is_empty() {
                return Err(VoxError::Load(format!("'{file_name}' contains no triangles")));
            }
            Ok((format, mesh))
        });
        let (format, mesh) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(model = %name, error = %e, "failed to load mesh");
                self.events.push(ModelEvent::LoadFailed {
                    name,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let transform = ModelTransform::new(
            Vector3::ZERO,
            self.config.default_orientation(),
            self.config.default_scale(),
        );
        let id = self
            .models
            .insert_with_key(|id| MeshModel::new(id, name, format, mesh, transform));
        let target = target_view.or_else(|| default_surface_view(&*host));

        let descriptor = image.and_then(|ctx| {
            let mut image = ctx.image.clone();
            if image.rendered_bounds.is_none() {
                image.rendered_bounds = target
                    .as_ref()
                    .and_then(|v| host.view(v))
                    .and_then(|v| v.bounds());
            }
            spatial::resolve(&image, ctx.metadata)
        });
        self.align_loaded(id, descriptor.as_ref());
        self.attach_surface(host, id, target.as_ref());

        if self.layout.requires_cross_sections() {
            self.create_cutters(host, id, crosshair);
        }

        if let Some(model) = self.models.get(id) {
            tracing::info!(
                model = model.name(),
                state = ?model.state(),
                cutters = model.cutter_ids().len(),
                "model loaded"
            );
            self.events.push(ModelEvent::Added {
                id,
                snapshot: ModelSnapshot::of(model),
            });
        }
        Ok(id)
    }

    fn align_loaded(&mut self, id: ModelId, descriptor: Option<&SpatialDescriptor>) -> Option<AlignedTransform> {
        let allow_bounds = self.config.allow_bounds_alignment;
        let model = self.models.get_mut(id)?;
        let Some(descriptor) = descriptor else {
            tracing::warn!(
                model = model.name(),
                "no spatial metadata for the displayed image, model kept at its local position"
            );
            return None;
        };
        model.set_voxel_frame(descriptor.voxel_frame());
        let token = model.take_alignment_token()?;

        match align(token, model, descriptor) {
            Ok(aligned) => Some(aligned),
            Err(token) if allow_bounds && descriptor.is_approximate() => {
                tracing::warn!(
                    model = model.name(),
                    "aligning to rendered bounds center, position is approximate"
                );
                Some(align_to(token, model, descriptor.origin, descriptor))
            }
            Err(token) => {
                model.restore_alignment_token(token);
                tracing::warn!(
                    model = model.name(),
                    provenance = ?descriptor.provenance,
                    "image center unknown, model kept at its local position"
                );
                None
            }
        }
    }

    fn attach_surface(&mut self, host: &mut dyn RenderHost, id: ModelId, target: Option<&ViewId>) {
        let color = self.config.model_color;
        let opacity = self.config.model_opacity;
        let Some(model) = self.models.get_mut(id) else {
            return;
        };
        model.color = color;
        model.opacity = opacity;
        model.set_state(ModelState::Attached);
        let Some(world) = model.bake_world_geometry() else {
            return;
        };

        let Some(view_id) = target else {
            tracing::warn!(model = model.name(), "no view to display the model in");
            return;
        };
        let Some(view) = host.view_mut(view_id) else {
            tracing::warn!(model = model.name(), view = %view_id, "target view not found");
            return;
        };
        let Some(renderer) = view.renderer_mut() else {
            tracing::warn!(model = model.name(), view = %view_id, "target view has no renderer");
            return;
        };

        let mut actor = Actor::surface(model.name(), world);
        actor.color = color;
        actor.opacity = opacity;
        actor.visible = model.visible;
        model.surface = Some((view_id.clone(), actor.id));
        renderer.add_actor(actor);
        view.render();
    }

    /// Create cutters for every classifiable slice view that lacks one.
    fn create_cutters(&mut self, host: &mut dyn RenderHost, id: ModelId, crosshair: &dyn CrosshairSource) -> usize {
        let Some(model) = self.models.get(id) else {
            return 0;
        };
        let Some(mesh) = model.world_geometry().cloned() else {
            return 0;
        };
        let style = ContourStyle {
            color: model.color,
            line_width: self.config.contour_line_width,
            visible: model.visible,
        };
        let taken: Vec<ViewId> = model
            .cutters
            .iter()
            .filter_map(|c| self.cutters.get(*c))
            .map(|c| c.view().clone())
            .collect();
        let ctx = UpdateContext {
            crosshair,
            render_order: &self.render_order,
            tolerance: self.config.tolerance,
        };

        let mut created = Vec::new();
        for view_id in host.view_ids() {
            if taken.contains(&view_id) {
                continue;
            }
            let Some(view) = host.view_mut(&view_id) else {
                continue;
            };
            if view.kind() != ViewKind::Orthographic {
                continue;
            }
            let Some(classification) = classify_view(view, ctx.tolerance) else {
                tracing::warn!(view = %view_id, "view orientation unknown, no cross-section");
                continue;
            };
            if view.renderer().is_none() {
                tracing::warn!(view = %view_id, "view has no renderer, no cross-section");
                continue;
            }
            match Cutter::create(id, mesh.clone(), view, classification, style, ctx) {
                Ok(cutter) => {
                    let cutter_id = self.cutters.insert(cutter);
                    let listener = self.sync.attach(view, cutter_id);
                    self.cutters[cutter_id].listener = Some(listener);
                    created.push(cutter_id);
                }
                Err(e) => tracing::warn!(view = %view_id, error = %e, "could not create cross-section"),
            }
        }

        let count = created.len();
        if let Some(model) = self.models.get_mut(id) {
            model.cutters.extend(created);
            if !model.cutters.is_empty() {
                model.set_state(ModelState::CrossSectioned);
            }
        }
        count
    }

    /// Switch layouts, creating or tearing down cross-sections to match.
    pub fn on_layout_changed(
        &mut self,
        host: &mut dyn RenderHost,
        crosshair: &dyn CrosshairSource,
        layout: LayoutMode,
    ) {
        tracing::debug!(from = ?self.layout, to = ?layout, "layout changed");
        self.layout = layout;
        let ids: Vec<ModelId> = self.models.keys().collect();
        if layout.requires_cross_sections() {
            for id in ids {
                self.create_cutters(host, id, crosshair);
            }
        } else {
            for id in ids {
                self.destroy_cutters(host, id);
                if let Some(model) = self.models.get_mut(id) {
                    model.set_state(ModelState::Attached);
                }
            }
        }
    }

    /// Dispatch one camera-changed notification to the cutter it belongs to.
    pub fn on_camera_changed(
        &mut self,
        host: &mut dyn RenderHost,
        crosshair: &dyn CrosshairSource,
        event: &CameraChanged,
    ) -> UpdateOutcome {
        match self.sync.route(event.listener) {
            Some(cutter) => self.update_cutter(host, crosshair, cutter),
            None => {
                tracing::trace!(listener = %event.listener, view = %event.view, "event for unknown listener");
                UpdateOutcome::Skipped(SkipReason::UnknownListener)
            }
        }
    }

    /// Dispatch a batch of notifications in order.
    pub fn on_camera_events(
        &mut self,
        host: &mut dyn RenderHost,
        crosshair: &dyn CrosshairSource,
        events: &[CameraChanged],
    ) -> Vec<UpdateOutcome> {
        events
            .iter()
            .map(|e| self.on_camera_changed(host, crosshair, e))
            .collect()
    }

    /// Recompute every cutter after the shared crosshair moved. Returns the
    /// number of cutters updated.
    pub fn on_crosshair_moved(&mut self, host: &mut dyn RenderHost, crosshair: &dyn CrosshairSource) -> usize {
        let ids: Vec<CutterId> = self.cutters.keys().collect();
        ids.into_iter()
            .filter(|&c| self.update_cutter(host, crosshair, c).is_updated())
            .count()
    }

    pub fn update_cutter(
        &mut self,
        host: &mut dyn RenderHost,
        crosshair: &dyn CrosshairSource,
        id: CutterId,
    ) -> UpdateOutcome {
        let Some(cutter) = self.cutters.get_mut(id) else {
            return UpdateOutcome::Skipped(SkipReason::UnknownListener);
        };
        let Some(view) = host.view_mut(cutter.view()) else {
            tracing::warn!(view = %cutter.view(), "cutter view no longer exists");
            return UpdateOutcome::Skipped(SkipReason::ViewMissing);
        };
        let ctx = UpdateContext {
            crosshair,
            render_order: &self.render_order,
            tolerance: self.config.tolerance,
        };
        cutter.update(view, ctx)
    }

    /// Detach and release one cutter.
    pub fn destroy_cutter(&mut self, host: &mut dyn RenderHost, id: CutterId) -> bool {
        let Some(cutter) = self.cutters.remove(id) else {
            return false;
        };
        if let Some(listener) = cutter.listener() {
            self.sync.detach(host.view_mut(cutter.view()), listener);
        }
        if let Some(model) = self.models.get_mut(cutter.model()) {
            model.cutters.retain(|&c| c != id);
            if model.cutters.is_empty() && model.state() == ModelState::CrossSectioned {
                model.set_state(ModelState::Attached);
            }
        }
        let view = cutter.view().clone();
        cutter.destroy(host.view_mut(&view))
    }

    fn destroy_cutters(&mut self, host: &mut dyn RenderHost, id: ModelId) {
        let Some(model) = self.models.get_mut(id) else {
            return;
        };
        let cutters = std::mem::take(&mut model.cutters);

        // Listeners go first so nothing fires into a released cutter.
        for &cutter_id in &cutters {
            if let Some(cutter) = self.cutters.get_mut(cutter_id) {
                if let Some(listener) = cutter.listener.take() {
                    self.sync.detach(host.view_mut(cutter.view()), listener);
                }
            }
        }
        for cutter_id in cutters {
            if let Some(cutter) = self.cutters.remove(cutter_id) {
                let view = cutter.view().clone();
                cutter.destroy(host.view_mut(&view));
            }
        }
    }

    /// Remove a model and everything it put into the host.
    pub fn remove_model(&mut self, host: &mut dyn RenderHost, id: ModelId) -> Result<()> {
        if !self.models.contains_key(id) {
            return Err(VoxError::NotFound(format!("model {id:?}")));
        }
        self.destroy_cutters(host, id);

        let Some(mut model) = self.models.remove(id) else {
            return Err(VoxError::NotFound(format!("model {id:?}")));
        };
        if let Some((_, actor)) = model.surface.take() {
            for view_id in host.view_ids() {
                let Some(view) = host.view_mut(&view_id) else {
                    continue;
                };
                let removed = view
                    .renderer_mut()
                    .and_then(|r| r.remove_actor(actor))
                    .is_some();
                if removed {
                    view.render();
                }
            }
        }
        model.release_geometry();
        model.set_state(ModelState::Removed);

        tracing::info!(model = model.name(), "model removed");
        self.events.push(ModelEvent::Removed {
            id,
            snapshot: ModelSnapshot::of(&model),
        });
        Ok(())
    }

    /// Remove every model. Returns how many were removed.
    pub fn clear(&mut self, host: &mut dyn RenderHost) -> usize {
        let ids: Vec<ModelId> = self.models.keys().collect();
        ids.into_iter()
            .filter(|&id| self.remove_model(host, id).is_ok())
            .count()
    }

    pub fn set_visibility(&mut self, host: &mut dyn RenderHost, id: ModelId, visible: bool) -> Result<()> {
        self.model_mut(id)?.visible = visible;
        self.restyle(host, id, |actor| actor.visible = visible);
        Ok(())
    }

    /// Set the color of the surface and its contours.
    pub fn set_color(&mut self, host: &mut dyn RenderHost, id: ModelId, color: [f32; 3]) -> Result<()> {
        if color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(VoxError::InvalidOperation(format!("color {color:?} out of range")));
        }
        self.model_mut(id)?.color = color;
        self.restyle(host, id, |actor| actor.color = color);
        Ok(())
    }

    /// Set the surface opacity. Contours keep their render-order opacity.
    pub fn set_opacity(&mut self, host: &mut dyn RenderHost, id: ModelId, opacity: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(VoxError::InvalidOperation(format!("opacity {opacity} out of range")));
        }
        let model = self.model_mut(id)?;
        model.opacity = opacity;
        if let Some((view_id, actor)) = model.surface.clone() {
            if let Some(view) = host.view_mut(&view_id) {
                if let Some(a) = view.renderer_mut().and_then(|r| r.actor_mut(actor)) {
                    a.opacity = opacity;
                }
                view.render();
            }
        }
        Ok(())
    }

    fn restyle(&self, host: &mut dyn RenderHost, id: ModelId, apply: impl Fn(&mut Actor)) {
        let Some(model) = self.models.get(id) else {
            return;
        };
        let contours = model
            .cutters
            .iter()
            .filter_map(|c| self.cutters.get(*c))
            .map(|c| (c.view().clone(), c.actor()));
        for (view_id, actor) in model.surface.clone().into_iter().chain(contours) {
            let Some(view) = host.view_mut(&view_id) else {
                continue;
            };
            if let Some(a) = view.renderer_mut().and_then(|r| r.actor_mut(actor)) {
                apply(a);
            }
            view.render();
        }
    }

    fn model_mut(&mut self, id: ModelId) -> Result<&mut MeshModel> {
        self.models
            .get_mut(id)
            .ok_or_else(|| VoxError::NotFound(format!("model {id:?}")))
    }

    pub fn model(&self, id: ModelId) -> Option<&MeshModel> {
        self.models.get(id)
    }

    pub fn models(&self) -> impl Iterator<Item = &MeshModel> {
        self.models.values()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn snapshot(&self, id: ModelId) -> Option<ModelSnapshot> {
        self.models.get(id).map(ModelSnapshot::of)
    }

    pub fn cutter(&self, id: CutterId) -> Option<&Cutter> {
        self.cutters.get(id)
    }

    pub fn cutters_for(&self, id: ModelId) -> Vec<&Cutter> {
        self.models
            .get(id)
            .map(|m| m.cutters.iter().filter_map(|c| self.cutters.get(*c)).collect())
            .unwrap_or_default()
    }

    pub fn cutter_count(&self) -> usize {
        self.cutters.len()
    }

    pub fn listener_count(&self) -> usize {
        self.sync.listener_count()
    }

    pub fn cutter_info(&self, id: CutterId) -> Option<CutterInfo> {
        let cutter = self.cutters.get(id)?;
        let plane = cutter.plane().copied();
        let slice_index = self
            .models
            .get(cutter.model())
            .and_then(|m| m.voxel_frame())
            .zip(plane)
            .and_then(|(frame, plane)| spatial::slice_index(frame, &plane));
        Some(CutterInfo {
            model: cutter.model(),
            view: cutter.view().clone(),
            orientation: cutter.orientation(),
            basis: cutter.classification().basis,
            plane,
            slice_index,
            segment_count: cutter.section().segment_count,
            update_count: cutter.update_count(),
        })
    }

    pub fn events(&self) -> &[ModelEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }
}

/// The first 3D view. Slice views never receive the surface actor.
fn default_surface_view(host: &dyn RenderHost) -> Option<ViewId> {
    host.view_ids()
        .into_iter()
        .find(|id| host.view(id).is_some_and(|v| v.kind() == ViewKind::Volume3D))
}
