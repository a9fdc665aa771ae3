use crate::error::Result;

/// Validate structural integrity of a descriptor or settings block.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
