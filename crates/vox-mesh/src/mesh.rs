use vox_math::{Aabb3, DMat4, Point3};

/// Indexed triangle surface produced by a mesh loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Point3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.len() < 3
    }

    /// Vertex indices of triangle `t`, skipping triangles that reference
    /// out-of-range vertices.
    pub fn triangle(&self, t: usize) -> Option<[u32; 3]> {
        let tri = self.indices.get(t * 3..t * 3 + 3)?;
        let n = self.positions.len() as u32;
        if tri.iter().any(|&i| i >= n) {
            return None;
        }
        Some([tri[0], tri[1], tri[2]])
    }

    /// Axis-aligned bounds of all positions, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.positions)
    }

    /// Copy of this mesh with every vertex mapped through `m`.
    pub fn transformed(&self, m: &DMat4) -> TriangleMesh {
        TriangleMesh {
            positions: self.positions.iter().map(|&p| m.transform_point3(p)).collect(),
            indices: self.indices.clone(),
        }
    }
}
