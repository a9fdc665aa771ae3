use std::sync::Arc;

use vox_core::ActorId;
use vox_math::{Aabb3, Point3, Vector3};
use vox_mesh::{Section, TriangleMesh};

/// What an actor draws.
#[derive(Debug, Clone)]
pub enum ActorGeometry {
    /// Background image slice or volume occupying `bounds`.
    Volume { bounds: Aabb3 },
    /// Shaded surface in patient space.
    Surface(Arc<TriangleMesh>),
    /// Polyline contours in patient space.
    Contour(Section),
}

/// How coplanar geometry is resolved against other actors in the depth test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoincidentTopology {
    Off,
    /// Depth bias; more negative values draw closer to the viewer.
    PolygonOffset { factor: f64, units: f64 },
}

/// A drawable item held by a renderer.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub geometry: ActorGeometry,
    pub color: [f32; 3],
    pub opacity: f32,
    pub visible: bool,
    pub line_width: f32,
    /// World-space translation applied on top of the geometry.
    pub offset: Vector3,
    pub coincident_topology: CoincidentTopology,
}

impl Actor {
    pub fn new(name: impl Into<String>, geometry: ActorGeometry) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            geometry,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            visible: true,
            line_width: 1.0,
            offset: Vector3::ZERO,
            coincident_topology: CoincidentTopology::Off,
        }
    }

    pub fn volume(name: impl Into<String>, bounds: Aabb3) -> Self {
        Self::new(name, ActorGeometry::Volume { bounds })
    }

    pub fn surface(name: impl Into<String>, mesh: Arc<TriangleMesh>) -> Self {
        Self::new(name, ActorGeometry::Surface(mesh))
    }

    pub fn contour(name: impl Into<String>) -> Self {
        Self::new(name, ActorGeometry::Contour(Section::default()))
    }

    pub fn is_volume(&self) -> bool {
        matches!(self.geometry, ActorGeometry::Volume { .. })
    }

    /// Drawn bounds including the world offset.
    pub fn bounds(&self) -> Option<Aabb3> {
        let raw = match &self.geometry {
            ActorGeometry::Volume { bounds } => Some(*bounds),
            ActorGeometry::Surface(mesh) => mesh.bounding_box(),
            ActorGeometry::Contour(section) => {
                let points: Vec<Point3> = section
                    .contours
                    .iter()
                    .flat_map(|c| c.points.iter().copied())
                    .collect();
                Aabb3::from_points(&points)
            }
        }?;
        Some(Aabb3::new(raw.min + self.offset, raw.max + self.offset))
    }
}
