//! Keep contour actors drawn in front of the background image.
//!
//! A contour lies exactly in the displayed slice, so it shares depth with the
//! image. Three biases are combined: polygon offset, opacity just below 1.0
//! and a small translation toward the camera.

use vox_math::Vector3;
use vox_render::{Actor, CoincidentTopology};

use crate::config::RenderOrderConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOrder {
    config: RenderOrderConfig,
}

impl RenderOrder {
    pub fn new(config: RenderOrderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderOrderConfig {
        &self.config
    }

    /// Configure `contour` to draw over `reference` for a view looking along `normal`.
    pub fn configure(&self, contour: &mut Actor, reference: Option<&Actor>, normal: Vector3) {
        let (base_factor, base_units) = match reference.map(|a| a.coincident_topology) {
            Some(CoincidentTopology::PolygonOffset { factor, units }) => (factor, units),
            _ => (0.0, 0.0),
        };
        contour.coincident_topology = CoincidentTopology::PolygonOffset {
            factor: base_factor + self.config.polygon_offset_factor,
            units: base_units + self.config.polygon_offset_units,
        };
        contour.opacity = self.config.contour_opacity;
        self.apply_offset(contour, normal);
    }

    /// Place `contour` at the configured distance toward the camera.
    ///
    /// Overwrites any previous offset, so repeated calls never drift.
    pub fn apply_offset(&self, contour: &mut Actor, normal: Vector3) {
        contour.offset = self.offset_for(normal);
    }

    pub fn offset_for(&self, normal: Vector3) -> Vector3 {
        -normal.normalize_or_zero() * self.config.contour_offset_mm
    }
}

impl Default for RenderOrder {
    fn default() -> Self {
        Self::new(RenderOrderConfig::default())
    }
}
