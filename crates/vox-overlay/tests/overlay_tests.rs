// Integration tests for the overlay manager driving a headless scene

use std::collections::{BTreeSet, HashMap};

use approx::assert_relative_eq;
use vox_core::{Result, ViewId, VoxError};
use vox_math::{Aabb3, DMat3, PatientFrame, Point3, Vector3};
use vox_mesh::{MeshFormat, MeshLoader, TriangleMesh};
use vox_overlay::*;
use vox_render::{
    Actor, Camera, RenderHost, Renderer, Scene, SceneView, ViewKind, ViewOrientation, Viewport,
};

/// Minimal OBJ reader: `v x y z` and triangular `f a b c` lines.
struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load(&self, _format: MeshFormat, bytes: &[u8]) -> Result<TriangleMesh> {
        let text = std::str::from_utf8(bytes).map_err(|e| VoxError::Load(e.to_string()))?;
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let v: Vec<f64> = parts
                        .map(|p| p.parse().map_err(|_| VoxError::Load(line.to_string())))
                        .collect::<Result<_>>()?;
                    let p = vox_math::point_from_slice(&v)
                        .ok_or_else(|| VoxError::Load(line.to_string()))?;
                    positions.push(p);
                }
                Some("f") => {
                    for p in parts {
                        let i: u32 = p.parse().map_err(|_| VoxError::Load(line.to_string()))?;
                        indices.push(i - 1);
                    }
                }
                _ => {}
            }
        }
        Ok(TriangleMesh::new(positions, indices))
    }
}

fn cube_obj(half: f64) -> String {
    let h = half;
    let mut obj = String::new();
    for (x, y, z) in [
        (-h, -h, -h),
        (h, -h, -h),
        (h, h, -h),
        (-h, h, -h),
        (-h, -h, h),
        (h, -h, h),
        (h, h, h),
        (-h, h, h),
    ] {
        obj.push_str(&format!("v {x} {y} {z}\n"));
    }
    for [a, b, c] in [
        [1, 3, 2],
        [1, 4, 3],
        [5, 6, 7],
        [5, 7, 8],
        [1, 2, 6],
        [1, 6, 5],
        [3, 4, 8],
        [3, 8, 7],
        [2, 3, 7],
        [2, 7, 6],
        [4, 1, 5],
        [4, 5, 8],
    ] {
        obj.push_str(&format!("f {a} {b} {c}\n"));
    }
    obj
}

fn cube_request(name: &str) -> LoadRequest {
    LoadRequest::new(format!("{name}.obj"), cube_obj(10.0).into_bytes())
}

/// Identity orientation and unit scale so world coordinates are easy to read.
fn plain_config() -> OverlayConfig {
    OverlayConfig {
        default_orientation_deg: [0.0; 3],
        default_scale: [1.0; 3],
        ..OverlayConfig::default()
    }
}

fn ct_grid() -> VolumeGrid {
    VolumeGrid {
        origin: Point3::new(-125.5, -250.25, 100.0),
        direction: DMat3::IDENTITY,
        spacing: Vector3::new(1.0, 1.0, 2.0),
        dimensions: [256, 256, 120],
        frame: PatientFrame::Lps,
    }
}

fn ct_center() -> Point3 {
    Point3::new(2.5, -122.25, 220.0)
}

fn mpr_manager() -> OverlayManager {
    let mut manager = OverlayManager::new(plain_config()).unwrap();
    let mut empty = Scene::new();
    manager.on_layout_changed(&mut empty, &NoCrosshair, LayoutMode::Mpr3D);
    manager
}

fn load_aligned(manager: &mut OverlayManager, scene: &mut Scene, name: &str) -> vox_core::ModelId {
    let image = ImageHandle::volume(ct_grid());
    let context = SpatialContext {
        image: &image,
        metadata: &NoMetadata,
    };
    manager
        .load_model(scene, &ObjLoader, cube_request(name), Some(context), &NoCrosshair)
        .unwrap()
}

fn actor_counts(scene: &Scene) -> HashMap<ViewId, usize> {
    scene
        .view_ids()
        .into_iter()
        .map(|id| {
            let count = scene.actor_count(&id);
            (id, count)
        })
        .collect()
}

fn actor<'a>(scene: &'a Scene, view: &str, id: vox_core::ActorId) -> Option<&'a Actor> {
    scene
        .scene_view(&ViewId::from(view))?
        .renderer()?
        .actor(id)
}

#[test]
fn integration_volume_alignment_and_three_cutters() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");

    let model = manager.model(id).unwrap();
    assert_relative_eq!(model.transform().position.x, 2.5);
    assert_relative_eq!(model.transform().position.y, -122.25);
    assert_relative_eq!(model.transform().position.z, 220.0);
    assert_eq!(model.metadata().original_position, Some(Vector3::ZERO));
    assert_eq!(model.metadata().provenance, Some(Provenance::VoxelGrid));
    assert_eq!(model.state(), ModelState::CrossSectioned);

    let cutters = manager.cutters_for(id);
    assert_eq!(cutters.len(), 3);
    let orientations: BTreeSet<ViewOrientation> = cutters.iter().map(|c| c.orientation()).collect();
    assert_eq!(orientations.len(), 3);
    let views: BTreeSet<ViewId> = cutters.iter().map(|c| c.view().clone()).collect();
    assert_eq!(views.len(), 3);
    assert!(!views.contains(&ViewId::from("volume3d")));

    for cutter in &cutters {
        assert_eq!(cutter.section().contours.len(), 1);
        assert!(cutter.section().contours[0].closed);
        assert_eq!(cutter.plane().unwrap().origin, ct_center());
    }

    assert_eq!(scene.total_listeners(), 3);
    assert_eq!(manager.listener_count(), 3);
    assert_eq!(scene.actor_count(&ViewId::from("volume3d")), 1);
    let surface = model.surface_actor().unwrap();
    assert!(actor(&scene, "volume3d", surface).is_some());
}

#[test]
fn integration_slice_index_follows_plane() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");

    let axial = manager
        .cutters_for(id)
        .into_iter()
        .find(|c| c.orientation() == ViewOrientation::Axial)
        .map(|c| c.view().clone())
        .unwrap();
    let cutter_id = manager.model(id).unwrap().cutter_ids().iter().copied().find(|&c| {
        manager.cutter(c).map(|c| c.view()) == Some(&axial)
    });
    let info = manager.cutter_info(cutter_id.unwrap()).unwrap();
    assert_eq!(info.orientation, ViewOrientation::Axial);
    assert_eq!(info.basis, ClassificationBasis::Tag);
    assert_relative_eq!(info.slice_index.unwrap(), 60.0, epsilon = 1e-9);
    assert_eq!(info.segment_count, 8);
}

#[test]
fn integration_camera_events_keep_latest_plane() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");
    let axial = ViewId::from("axial");

    let c1 = ct_center() + Vector3::new(0.0, 0.0, 4.0);
    let c2 = ct_center() + Vector3::new(0.0, 0.0, -6.0);
    let first = scene.set_camera(&axial, Camera::axial(c1));
    let second = scene.set_camera(&axial, Camera::axial(c2));
    assert_eq!(first.len(), 1);

    let outcomes = manager.on_camera_events(&mut scene, &NoCrosshair, &first);
    assert!(outcomes.iter().all(UpdateOutcome::is_updated));
    let outcomes = manager.on_camera_events(&mut scene, &NoCrosshair, &second);
    assert!(outcomes.iter().all(UpdateOutcome::is_updated));

    let cutter = manager
        .cutters_for(id)
        .into_iter()
        .find(|c| c.view() == &axial)
        .unwrap();
    assert_eq!(cutter.plane().unwrap().origin, c2);
    assert_eq!(cutter.last_source(), Some(PlaneSource::CameraFocalPoint(c2)));
    assert_eq!(cutter.update_count(), 3);

    // Contour sits a tenth of a millimeter toward the axial camera.
    let contour = actor(&scene, "axial", cutter.actor()).unwrap();
    assert_relative_eq!(contour.offset.z, -0.1);
    assert_relative_eq!(contour.opacity, 0.99);
}

#[test]
fn integration_crosshair_overrides_focal_point() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");
    let mut crosshair = SharedCrosshair::new();

    let c1 = ct_center() + Vector3::new(1.0, 2.0, 3.0);
    let c2 = ct_center() + Vector3::new(-4.0, -5.0, -6.0);
    crosshair.set_center(c1.to_array().to_vec());
    assert_eq!(manager.on_crosshair_moved(&mut scene, &crosshair), 3);
    crosshair.set_center(c2.to_array().to_vec());
    assert_eq!(manager.on_crosshair_moved(&mut scene, &crosshair), 3);

    for cutter in manager.cutters_for(id) {
        let plane = cutter.plane().unwrap();
        assert_eq!(plane.origin, c2);
        assert_eq!(plane.normal, cutter.orientation().axis());
        assert_eq!(cutter.last_source(), Some(PlaneSource::Crosshair(c2)));
    }

    // A malformed crosshair falls back to each camera's focal point.
    crosshair.set_center(vec![1.0, 2.0]);
    manager.on_crosshair_moved(&mut scene, &crosshair);
    for cutter in manager.cutters_for(id) {
        assert_eq!(cutter.plane().unwrap().origin, ct_center());
    }
}

#[test]
fn integration_remove_restores_scene() {
    let mut scene = Scene::new();
    scene.add_view(
        SceneView::slice("axial", ViewOrientation::Axial, ct_center())
            .with_actor(Actor::volume("ct", Aabb3::new(Point3::splat(-200.0), Point3::splat(400.0)))),
    );
    scene.add_view(SceneView::slice("coronal", ViewOrientation::Coronal, ct_center()));
    scene.add_view(SceneView::new("volume3d", ViewKind::Volume3D, Camera::coronal(ct_center())));
    let baseline = actor_counts(&scene);

    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");
    assert_eq!(manager.cutters_for(id).len(), 2);
    assert_eq!(scene.actor_count(&ViewId::from("axial")), 2);
    manager.drain_events();

    manager.remove_model(&mut scene, id).unwrap();

    assert_eq!(actor_counts(&scene), baseline);
    assert_eq!(scene.total_listeners(), 0);
    assert_eq!(manager.listener_count(), 0);
    assert_eq!(manager.cutter_count(), 0);
    assert!(manager.model(id).is_none());

    let events = manager.drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ModelEvent::Removed { id: removed, snapshot } => {
            assert_eq!(*removed, id);
            assert_eq!(snapshot.state, ModelState::Removed);
            assert_eq!(snapshot.cutter_count, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(manager.remove_model(&mut scene, id), Err(VoxError::NotFound(_))));
}

#[test]
fn integration_missing_metadata_keeps_local_position() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = mpr_manager();
    let image = ImageHandle::stack("ct:unknown", 1);
    let context = SpatialContext {
        image: &image,
        metadata: &NoMetadata,
    };

    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("guide"), Some(context), &NoCrosshair)
        .unwrap();
    let model = manager.model(id).unwrap();
    assert_eq!(model.transform().position, Vector3::ZERO);
    assert!(model.metadata().dicom_origin.is_none());
    assert!(!model.is_aligned());
    assert_eq!(manager.cutters_for(id).len(), 3);

    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("plain"), None, &NoCrosshair)
        .unwrap();
    assert_eq!(manager.model(id).unwrap().transform().position, Vector3::ZERO);
}

#[test]
fn integration_slice_metadata_alignment() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = mpr_manager();
    let mut metadata = HashMap::new();
    metadata.insert(
        "ct:7".to_string(),
        ImagePlaneMetadata {
            image_position_patient: Some([-50.0, -50.0, 10.0]),
            image_orientation_patient: Some([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            row_spacing: Some(0.5),
            column_spacing: Some(0.5),
            slice_thickness: Some(2.0),
            rows: Some(200),
            columns: Some(200),
        },
    );
    let image = ImageHandle::stack("ct:7", 20);
    let context = SpatialContext {
        image: &image,
        metadata: &metadata,
    };

    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("rod"), Some(context), &NoCrosshair)
        .unwrap();
    let model = manager.model(id).unwrap();
    assert_eq!(model.transform().position, Vector3::new(0.0, 0.0, 30.0));
    assert_eq!(model.metadata().provenance, Some(Provenance::SliceMetadata));
}

#[test]
fn integration_bounds_alignment_is_opt_in() {
    let bounds = Aabb3::new(Point3::ZERO, Point3::new(10.0, 20.0, 30.0));
    let image = ImageHandle::default().with_rendered_bounds(bounds);
    let context = SpatialContext {
        image: &image,
        metadata: &NoMetadata,
    };

    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut strict = OverlayManager::new(plain_config()).unwrap();
    let id = strict
        .load_model(&mut scene, &ObjLoader, cube_request("a"), Some(context), &NoCrosshair)
        .unwrap();
    assert_eq!(strict.model(id).unwrap().transform().position, Vector3::ZERO);

    let mut lenient = OverlayManager::new(OverlayConfig {
        allow_bounds_alignment: true,
        ..plain_config()
    })
    .unwrap();
    let id = lenient
        .load_model(&mut scene, &ObjLoader, cube_request("b"), Some(context), &NoCrosshair)
        .unwrap();
    let model = lenient.model(id).unwrap();
    assert_eq!(model.transform().position, Vector3::new(5.0, 10.0, 15.0));
    assert_eq!(model.metadata().provenance, Some(Provenance::RenderedBounds));
}

#[test]
fn integration_rendered_bounds_taken_from_target_view() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    scene.add_view(
        SceneView::new("ct3d", ViewKind::Volume3D, Camera::coronal(Point3::ZERO))
            .with_actor(Actor::volume("ct", Aabb3::new(Point3::splat(-10.0), Point3::splat(30.0)))),
    );
    let mut manager = OverlayManager::new(OverlayConfig {
        allow_bounds_alignment: true,
        ..plain_config()
    })
    .unwrap();
    let image = ImageHandle::default();
    let context = SpatialContext {
        image: &image,
        metadata: &NoMetadata,
    };

    let id = manager
        .load_model(
            &mut scene,
            &ObjLoader,
            cube_request("c").with_target_view("ct3d"),
            Some(context),
            &NoCrosshair,
        )
        .unwrap();
    assert_eq!(manager.model(id).unwrap().transform().position, Vector3::splat(10.0));
    assert_eq!(scene.actor_count(&ViewId::from("ct3d")), 2);
}

#[test]
fn integration_load_failures_never_register() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = mpr_manager();

    let stl = LoadRequest::new("implant.stl", b"solid implant".to_vec());
    let result = manager.load_model(&mut scene, &ObjLoader, stl, None, &NoCrosshair);
    assert!(matches!(result, Err(VoxError::UnsupportedFormat(_))));

    let broken = LoadRequest::new("broken.obj", b"v 0 0 zero\n".to_vec());
    let result = manager.load_model(&mut scene, &ObjLoader, broken, None, &NoCrosshair);
    assert!(matches!(result, Err(VoxError::Load(_))));

    let empty = LoadRequest::new("empty.obj", b"# nothing\n".to_vec());
    let result = manager.load_model(&mut scene, &ObjLoader, empty, None, &NoCrosshair);
    assert!(matches!(result, Err(VoxError::Load(_))));

    assert_eq!(manager.model_count(), 0);
    assert_eq!(scene.total_actors(), 0);
    assert_eq!(scene.total_listeners(), 0);
    let events = manager.drain_events();
    assert_eq!(events.len(), 3);
    assert!(events
        .iter()
        .all(|e| matches!(e, ModelEvent::LoadFailed { .. })));
    assert!(matches!(&events[0], ModelEvent::LoadFailed { name, .. } if name == "implant.stl"));
}

#[test]
fn integration_unmounted_view_is_skipped() {
    let mut scene = Scene::new();
    scene.add_view(SceneView::slice("axial", ViewOrientation::Axial, Point3::ZERO).without_renderer());
    scene.add_view(SceneView::slice("sagittal", ViewOrientation::Sagittal, Point3::ZERO));
    scene.add_view(
        SceneView::new("untagged", ViewKind::Orthographic, Camera::coronal(Point3::ZERO)),
    );
    scene.add_view(SceneView::new("volume3d", ViewKind::Volume3D, Camera::coronal(Point3::ZERO)));
    let mut manager = mpr_manager();

    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("screw"), None, &NoCrosshair)
        .unwrap();
    let cutters = manager.cutters_for(id);
    assert_eq!(cutters.len(), 2);
    let untagged = cutters
        .iter()
        .find(|c| c.view() == &ViewId::from("untagged"))
        .unwrap();
    assert_eq!(untagged.orientation(), ViewOrientation::Coronal);
    assert_eq!(untagged.classification().basis, ClassificationBasis::CameraNormal);
    assert_eq!(scene.total_listeners(), 2);
}

#[test]
fn integration_layout_switch_creates_and_drops_cutters() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = OverlayManager::new(plain_config()).unwrap();
    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("plate"), None, &NoCrosshair)
        .unwrap();
    assert_eq!(manager.model(id).unwrap().state(), ModelState::Attached);
    assert_eq!(manager.cutter_count(), 0);
    assert_eq!(scene.total_actors(), 1);

    manager.on_layout_changed(&mut scene, &NoCrosshair, LayoutMode::Mpr);
    assert_eq!(manager.cutters_for(id).len(), 3);
    assert_eq!(manager.model(id).unwrap().state(), ModelState::CrossSectioned);
    assert_eq!(scene.total_actors(), 4);

    // Re-announcing the same layout must not duplicate cutters.
    manager.on_layout_changed(&mut scene, &NoCrosshair, LayoutMode::Mpr3D);
    assert_eq!(manager.cutters_for(id).len(), 3);
    assert_eq!(scene.total_listeners(), 3);

    manager.on_layout_changed(&mut scene, &NoCrosshair, LayoutMode::Volume3D);
    assert_eq!(manager.cutter_count(), 0);
    assert_eq!(scene.total_listeners(), 0);
    assert_eq!(scene.total_actors(), 1);
    assert_eq!(manager.model(id).unwrap().state(), ModelState::Attached);
}

#[test]
fn integration_appearance_reaches_all_actors() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = mpr_manager();
    let id = manager
        .load_model(&mut scene, &ObjLoader, cube_request("screw"), None, &NoCrosshair)
        .unwrap();

    manager.set_color(&mut scene, id, [0.0, 1.0, 0.0]).unwrap();
    manager.set_visibility(&mut scene, id, false).unwrap();
    manager.set_opacity(&mut scene, id, 0.5).unwrap();

    let model = manager.model(id).unwrap();
    let surface = actor(&scene, "volume3d", model.surface_actor().unwrap()).unwrap();
    assert_eq!(surface.color, [0.0, 1.0, 0.0]);
    assert!(!surface.visible);
    assert_eq!(surface.opacity, 0.5);

    for cutter in manager.cutters_for(id) {
        let contour = actor(&scene, cutter.view().as_str(), cutter.actor()).unwrap();
        assert_eq!(contour.color, [0.0, 1.0, 0.0]);
        assert!(!contour.visible);
        assert_eq!(contour.opacity, 0.99);
    }

    assert!(manager.set_opacity(&mut scene, id, 1.5).is_err());
    assert!(manager.set_color(&mut scene, id, [2.0, 0.0, 0.0]).is_err());
    let snapshot = manager.snapshot(id).unwrap();
    assert_eq!(snapshot.opacity, 0.5);
    assert!(!snapshot.visible);
}

#[test]
fn integration_events_fire_once_per_model() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let a = load_aligned(&mut manager, &mut scene, "a");
    let b = load_aligned(&mut manager, &mut scene, "b");

    let added: Vec<_> = manager.drain_events();
    assert_eq!(added.len(), 2);
    assert_eq!(added[0].model_id(), Some(a));
    assert_eq!(added[1].model_id(), Some(b));
    match &added[0] {
        ModelEvent::Added { snapshot, .. } => {
            assert_eq!(snapshot.cutter_count, 3);
            assert_eq!(snapshot.metadata.aligned_position, Some(ct_center()));
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert_eq!(manager.clear(&mut scene), 2);
    let removed = manager.drain_events();
    assert_eq!(removed.len(), 2);
    assert!(removed.iter().all(|e| matches!(e, ModelEvent::Removed { .. })));
    assert_eq!(scene.total_actors(), 0);
    assert_eq!(scene.total_listeners(), 0);
}

#[test]
fn integration_stale_listener_is_ignored() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");
    let axial = ViewId::from("axial");

    let pending = scene.set_camera(&axial, Camera::axial(ct_center() + Vector3::Z));
    manager.remove_model(&mut scene, id).unwrap();

    let outcomes = manager.on_camera_events(&mut scene, &NoCrosshair, &pending);
    assert_eq!(outcomes, vec![UpdateOutcome::Skipped(SkipReason::UnknownListener)]);
}

#[test]
fn integration_default_config_rotates_and_scales() {
    let mut scene = Scene::mpr_with_3d(Point3::ZERO);
    let mut manager = OverlayManager::new(OverlayConfig::default()).unwrap();
    let request = LoadRequest::new("pin.obj", b"v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n".to_vec());
    let id = manager
        .load_model(&mut scene, &ObjLoader, request, None, &NoCrosshair)
        .unwrap();

    let world = manager.model(id).unwrap().world_geometry().unwrap();
    assert_relative_eq!(world.positions[1].y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(world.positions[1].z, -10.0, epsilon = 1e-9);
    assert_relative_eq!(world.positions[2].x, 10.0, epsilon = 1e-9);
}

#[test]
fn integration_slice_only_layout_has_no_surface_actor() {
    let mut scene = Scene::new();
    scene.add_view(SceneView::slice("axial", ViewOrientation::Axial, ct_center()));
    scene.add_view(SceneView::slice("coronal", ViewOrientation::Coronal, ct_center()));
    let mut manager = mpr_manager();

    let id = load_aligned(&mut manager, &mut scene, "implant");
    let model = manager.model(id).unwrap();
    assert!(model.surface_actor().is_none());
    assert!(model.world_geometry().is_some());
    assert_eq!(manager.cutters_for(id).len(), 2);
    assert_eq!(scene.actor_count(&ViewId::from("axial")), 1);
    assert_eq!(scene.actor_count(&ViewId::from("coronal")), 1);
    assert_relative_eq!(model.transform().position.x, 2.5);
}

#[test]
fn integration_last_cutter_destroyed_returns_to_attached() {
    let mut scene = Scene::mpr_with_3d(ct_center());
    let mut manager = mpr_manager();
    let id = load_aligned(&mut manager, &mut scene, "implant");
    let cutters = manager.model(id).unwrap().cutter_ids().to_vec();
    assert_eq!(cutters.len(), 3);

    let (last, rest) = cutters.split_last().unwrap();
    for &cutter in rest {
        assert!(manager.destroy_cutter(&mut scene, cutter));
    }
    assert_eq!(manager.model(id).unwrap().state(), ModelState::CrossSectioned);

    assert!(manager.destroy_cutter(&mut scene, *last));
    assert_eq!(manager.model(id).unwrap().state(), ModelState::Attached);
    assert_eq!(scene.total_listeners(), 0);
    assert!(!manager.destroy_cutter(&mut scene, *last));
}
