//! Actor descriptor model, parsing and loading.
//!
//! Actor bundles follow a fixed layout under one root directory:
//!
//! - `actors/` - top-level and prop actors (`<actor>` documents)
//! - `variants/` - inheritance parents (`<variant>` documents)
//! - `meshes/` - geometry handed to the mesh importer
//! - `textures/skins/` - images referenced by texture lists

mod parser;
mod store;
mod types;

pub use parser::*;
pub use store::*;
pub use types::*;
