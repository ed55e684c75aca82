//! Actorplan Core - Actor descriptor resolution and scene assembly.
//!
//! This crate provides:
//!
//! - **Descriptors**: actor/variant XML parsing and a run-scoped store
//! - **Variants**: bounded-retry selection and inheritance merging
//! - **Assembly**: mesh and decal import, prop anchor classification,
//!   attachment binding
//! - **Materials**: texture-driven material specs built once per name
//! - **Import**: recursive prop instantiation producing an [`ImportReport`]
//!
//! The authoring host is reached only through the traits in [`host`];
//! [`memory::MemoryHost`] is an in-memory implementation.
//!
//! # Example
//!
//! ```ignore
//! use actorplan_core::{ActorImporter, ImportOptions};
//! use actorplan_core::memory::MemoryHost;
//!
//! let mut host = MemoryHost::permissive();
//! let report = ActorImporter::new(&mut host, ImportOptions::default())
//!     .import("art/actors/units/horse.xml".as_ref())?;
//! println!("Resolved {} actors", report.actor_count());
//! ```

pub mod assembler;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod instantiator;
pub mod material;
pub mod memory;
pub mod options;
pub mod report;
pub mod scene;
pub mod texture;
pub mod variant;

// Re-export commonly used types
pub use assembler::{Assembly, Binding, SceneAssembler};
pub use descriptor::{
    bundle_root, parse_actor_str, parse_variant_str, ActorDescriptor, DescriptorStore, MeshSpec,
    PropRef, TextureRef, Variant, VariantGroup,
};
pub use error::{Diagnostic, ResolveError, ResolveResult};
pub use host::{ConstraintBinder, Host, HostError, MaterialBuilder, MeshImporter};
pub use instantiator::ActorImporter;
pub use material::{MaterialResolver, MaterialSpec, ResolvedMaterial};
pub use options::ImportOptions;
pub use report::{ActorInstance, ImportReport};
pub use scene::{Anchor, AttachmentContext, NodeRole, SceneNode};
pub use texture::ImageCache;
pub use variant::{merge_keyed, select_variant, MergedVariant, VariantResolver};
