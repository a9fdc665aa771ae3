pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{Result, VoxError};
pub use id::{ActorId, CutterId, ListenerId, ModelId, ViewId};
pub use tolerance::Tolerance;
