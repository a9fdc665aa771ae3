pub mod loader;
pub mod mesh;
pub mod section;

pub use loader::{MeshFormat, MeshLoader};
pub use mesh::TriangleMesh;
pub use section::{section_mesh, Contour, PlaneCutter, Section};
