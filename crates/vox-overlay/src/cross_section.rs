//! Live planar sections of a model in a slice view.
//!
//! Each [`Cutter`] owns one contour actor in one view and recomputes it
//! whenever that view's camera or the shared crosshair moves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vox_core::{ActorId, ListenerId, ModelId, Result, Tolerance, ViewId, VoxError};
use vox_math::{point_from_slice, Plane, Point3, Vector3};
use vox_mesh::{PlaneCutter, Section, TriangleMesh};
use vox_render::{Actor, ActorGeometry, Camera, ViewOrientation, Viewport};

use crate::render_order::RenderOrder;

/// How a view's orientation was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationBasis {
    /// Explicit tag set when the view was created.
    Tag,
    /// Orientation option attached to the view.
    ViewOption,
    /// Dominant axis of the camera's view-plane normal.
    CameraNormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub orientation: ViewOrientation,
    pub basis: ClassificationBasis,
}

/// Orientation whose axis carries the largest component of `normal`.
///
/// Ties resolve in x, y, z order.
pub fn dominant_orientation(normal: Vector3, tol: Tolerance) -> Option<ViewOrientation> {
    if !tol.is_direction(normal.length()) {
        return None;
    }
    let a = normal.abs();
    let orientation = if a.x >= a.y && a.x >= a.z {
        ViewOrientation::Sagittal
    } else if a.y >= a.z {
        ViewOrientation::Coronal
    } else {
        ViewOrientation::Axial
    };
    Some(orientation)
}

/// Classify `view` as axial, sagittal or coronal.
pub fn classify_view(view: &dyn Viewport, tol: Tolerance) -> Option<Classification> {
    if let Some(orientation) = view.orientation_tag() {
        return Some(Classification {
            orientation,
            basis: ClassificationBasis::Tag,
        });
    }
    if let Some(orientation) = view.orientation_option() {
        return Some(Classification {
            orientation,
            basis: ClassificationBasis::ViewOption,
        });
    }
    let orientation = dominant_orientation(view.camera().view_plane_normal(), tol)?;
    tracing::info!(
        view = %view.id(),
        %orientation,
        "view has no orientation tag, classified from camera normal"
    );
    Some(Classification {
        orientation,
        basis: ClassificationBasis::CameraNormal,
    })
}

/// Where a cutting plane's origin came from, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaneSource {
    Crosshair(Point3),
    CameraFocalPoint(Point3),
}

impl PlaneSource {
    /// Pick the crosshair center if it is a finite 3-component point, else the
    /// camera focal point if finite.
    pub fn resolve(crosshair: Option<&[f64]>, camera: &Camera) -> Option<Self> {
        if let Some(center) = crosshair.and_then(point_from_slice) {
            return Some(PlaneSource::Crosshair(center));
        }
        camera
            .focal_point
            .is_finite()
            .then_some(PlaneSource::CameraFocalPoint(camera.focal_point))
    }

    pub fn origin(&self) -> Point3 {
        match *self {
            PlaneSource::Crosshair(p) | PlaneSource::CameraFocalPoint(p) => p,
        }
    }
}

/// Shared crosshair state queried per view.
pub trait CrosshairSource {
    /// Raw center coordinates of the active crosshair for `view`, if any.
    fn center(&self, view: &ViewId) -> Option<Vec<f64>>;
}

/// No crosshair tool is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrosshair;

impl CrosshairSource for NoCrosshair {
    fn center(&self, _view: &ViewId) -> Option<Vec<f64>> {
        None
    }
}

/// One crosshair shared by a group of views.
#[derive(Debug, Clone, Default)]
pub struct SharedCrosshair {
    center: Option<Vec<f64>>,
    views: Option<Vec<ViewId>>,
}

impl SharedCrosshair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only answer for the listed views.
    pub fn restricted_to(views: impl IntoIterator<Item = ViewId>) -> Self {
        Self {
            center: None,
            views: Some(views.into_iter().collect()),
        }
    }

    pub fn set_center(&mut self, center: impl Into<Vec<f64>>) {
        self.center = Some(center.into());
    }

    pub fn clear(&mut self) {
        self.center = None;
    }
}

impl CrosshairSource for SharedCrosshair {
    fn center(&self, view: &ViewId) -> Option<Vec<f64>> {
        if let Some(views) = &self.views {
            if !views.contains(view) {
                return None;
            }
        }
        self.center.clone()
    }
}

/// Why an update left the previous contour in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoPlaneSource,
    InvalidNormal,
    ViewMissing,
    RendererMissing,
    ActorMissing,
    UnknownListener,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    Updated { source: PlaneSource },
    Skipped(SkipReason),
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Appearance of a new contour actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourStyle {
    pub color: [f32; 3],
    pub line_width: f32,
    pub visible: bool,
}

/// A live section of one model in one view.
#[derive(Debug)]
pub struct Cutter {
    model: ModelId,
    view: ViewId,
    classification: Classification,
    operator: PlaneCutter,
    actor: ActorId,
    pub(crate) listener: Option<ListenerId>,
    last_source: Option<PlaneSource>,
    update_count: u64,
}

/// Shared inputs of a cutter update.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub crosshair: &'a dyn CrosshairSource,
    pub render_order: &'a RenderOrder,
    pub tolerance: Tolerance,
}

impl Cutter {
    /// Add a contour actor for `mesh` to `view` and compute the first section.
    ///
    /// Fails if the view has no renderer to hold the actor.
    pub fn create(
        model: ModelId,
        mesh: Arc<TriangleMesh>,
        view: &mut dyn Viewport,
        classification: Classification,
        style: ContourStyle,
        ctx: UpdateContext<'_>,
    ) -> Result<Self> {
        let view_id = view.id().clone();
        let normal = view.camera().view_plane_normal();
        let Some(renderer) = view.renderer_mut() else {
            return Err(VoxError::NotFound(format!("renderer for view '{view_id}'")));
        };

        let reference = renderer.actors().find(|a| a.is_volume()).cloned();
        let mut actor = Actor::contour(format!("section:{}", classification.orientation));
        actor.color = style.color;
        actor.line_width = style.line_width;
        actor.visible = style.visible;
        ctx.render_order.configure(&mut actor, reference.as_ref(), normal);
        let actor_id = actor.id;
        renderer.add_actor(actor);

        let mut cutter = Self {
            model,
            view: view_id,
            classification,
            operator: PlaneCutter::new(mesh, ctx.tolerance),
            actor: actor_id,
            listener: None,
            last_source: None,
            update_count: 0,
        };
        cutter.update(view, ctx);
        Ok(cutter)
    }

    /// Recompute the plane from the current crosshair or camera and redraw.
    ///
    /// On any skip the previous plane and contour are kept.
    pub fn update(&mut self, view: &mut dyn Viewport, ctx: UpdateContext<'_>) -> UpdateOutcome {
        if view.renderer().is_none() {
            return UpdateOutcome::Skipped(SkipReason::RendererMissing);
        }
        let camera = view.camera();
        let center = ctx.crosshair.center(&self.view);
        let Some(source) = PlaneSource::resolve(center.as_deref(), &camera) else {
            tracing::debug!(view = %self.view, "no plane source, keeping previous section");
            return UpdateOutcome::Skipped(SkipReason::NoPlaneSource);
        };
        let Some(plane) =
            Plane::try_new(source.origin(), camera.view_plane_normal(), ctx.tolerance)
        else {
            tracing::debug!(view = %self.view, "degenerate view-plane normal, keeping previous section");
            return UpdateOutcome::Skipped(SkipReason::InvalidNormal);
        };

        let Some(actor) = view
            .renderer_mut()
            .and_then(|r| r.actor_mut(self.actor))
        else {
            return UpdateOutcome::Skipped(SkipReason::ActorMissing);
        };
        self.operator.set_plane(plane);
        actor.geometry = ActorGeometry::Contour(self.operator.update().clone());
        ctx.render_order.apply_offset(actor, plane.normal);
        view.render();

        self.last_source = Some(source);
        self.update_count += 1;
        tracing::debug!(
            view = %self.view,
            origin = %plane.origin,
            segments = self.operator.output().segment_count,
            "section updated"
        );
        UpdateOutcome::Updated { source }
    }

    /// Remove the contour actor. The listener must already be detached.
    pub fn destroy(self, view: Option<&mut dyn Viewport>) -> bool {
        view.and_then(|v| v.renderer_mut())
            .and_then(|r| r.remove_actor(self.actor))
            .is_some()
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn view(&self) -> &ViewId {
        &self.view
    }

    pub fn orientation(&self) -> ViewOrientation {
        self.classification.orientation
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn plane(&self) -> Option<&Plane> {
        self.operator.plane()
    }

    pub fn section(&self) -> &Section {
        self.operator.output()
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    pub fn last_source(&self) -> Option<PlaneSource> {
        self.last_source
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}
