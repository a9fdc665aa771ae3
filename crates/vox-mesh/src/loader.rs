//! Boundary to the external mesh file parser.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vox_core::{Result, VoxError};

use crate::TriangleMesh;

/// Mesh file formats accepted for overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshFormat {
    Obj,
}

impl MeshFormat {
    pub fn tag(self) -> &'static str {
        match self {
            MeshFormat::Obj => "obj",
        }
    }

    /// Format from a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| VoxError::UnsupportedFormat(path.display().to_string()))?
            .parse()
    }
}

impl FromStr for MeshFormat {
    type Err = VoxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(MeshFormat::Obj),
            other => Err(VoxError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parses raw file content into surface geometry.
///
/// Implementations must be deterministic and free of side effects, and
/// return an error on malformed input.
pub trait MeshLoader {
    fn load(&self, format: MeshFormat, bytes: &[u8]) -> Result<TriangleMesh>;
}
