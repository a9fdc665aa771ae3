//! Overlay settings.

use serde::{Deserialize, Serialize};
use vox_core::traits::Validate;
use vox_core::{Result, Tolerance, VoxError};
use vox_math::Vector3;

/// Settings for keeping contours in front of the background image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOrderConfig {
    /// Distance the contour is moved toward the viewer, in mm.
    pub contour_offset_mm: f64,
    /// Contour opacity, kept just below 1.0 so it composites after opaque geometry.
    pub contour_opacity: f32,
    /// Polygon offset factor added to the reference actor's bias.
    pub polygon_offset_factor: f64,
    /// Polygon offset units added to the reference actor's bias.
    pub polygon_offset_units: f64,
}

impl Default for RenderOrderConfig {
    fn default() -> Self {
        Self {
            contour_offset_mm: 0.1,
            contour_opacity: 0.99,
            polygon_offset_factor: -1.0,
            polygon_offset_units: -2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Rotation applied to every loaded mesh, degrees per axis.
    pub default_orientation_deg: [f64; 3],
    /// Scale applied to every loaded mesh.
    pub default_scale: [f64; 3],
    pub model_color: [f32; 3],
    pub model_opacity: f32,
    pub contour_line_width: f32,
    pub render_order: RenderOrderConfig,
    /// Align to the rendered-bounds center when no voxel geometry is known.
    pub allow_bounds_alignment: bool,
    pub tolerance: Tolerance,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            default_orientation_deg: [-90.0, 0.0, 0.0],
            default_scale: [10.0, 10.0, 10.0],
            model_color: [1.0, 0.8, 0.2],
            model_opacity: 1.0,
            contour_line_width: 2.0,
            render_order: RenderOrderConfig::default(),
            allow_bounds_alignment: false,
            tolerance: Tolerance::default(),
        }
    }
}

impl OverlayConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VoxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_orientation(&self) -> Vector3 {
        Vector3::from_array(self.default_orientation_deg)
    }

    pub fn default_scale(&self) -> Vector3 {
        Vector3::from_array(self.default_scale)
    }
}

fn check_unit_interval(name: &str, v: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(VoxError::Config(format!("{name} must be within [0, 1], got {v}")));
    }
    Ok(())
}

impl Validate for OverlayConfig {
    fn validate(&self) -> Result<()> {
        if !self.default_orientation().is_finite() {
            return Err(VoxError::Config("default_orientation_deg must be finite".into()));
        }
        let scale = self.default_scale();
        if !scale.is_finite() || scale.abs().min_element() == 0.0 {
            return Err(VoxError::Config(
                "default_scale must be finite and non-zero on every axis".into(),
            ));
        }
        check_unit_interval("model_opacity", self.model_opacity)?;
        check_unit_interval("render_order.contour_opacity", self.render_order.contour_opacity)?;
        for c in self.model_color {
            check_unit_interval("model_color", c)?;
        }
        let offset = self.render_order.contour_offset_mm;
        if !offset.is_finite() || offset < 0.0 {
            return Err(VoxError::Config(format!(
                "render_order.contour_offset_mm must be a non-negative distance, got {offset}"
            )));
        }
        if !(self.tolerance.linear > 0.0 && self.tolerance.direction > 0.0) {
            return Err(VoxError::Config("tolerances must be positive".into()));
        }
        Ok(())
    }
}
