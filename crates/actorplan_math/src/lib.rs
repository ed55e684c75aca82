// Re-export glam for convenience
pub use glam::*;

// Actorplan math types
mod quad;
mod transform;
pub use quad::Quad;
pub use transform::{BakeMask, Transform};
