/// Tolerances for patient-space geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in millimeters)
    pub linear: f64,
    /// Minimum length a direction vector must have to be normalized
    pub direction: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-6;
    pub const DEFAULT_DIRECTION: f64 = 1e-9;

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            direction: Self::DEFAULT_DIRECTION,
        }
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if a vector length is long enough to define a direction
    pub fn is_direction(self, length: f64) -> bool {
        length.is_finite() && length > self.direction
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
