//! Host collaborator interfaces.
//!
//! The resolver never touches geometry, shader graphs or constraints itself.
//! It drives an authoring host through three narrow traits:
//!
//! - [`MeshImporter`]: imports mesh files and edits the nodes it created
//! - [`MaterialBuilder`]: builds and assigns materials from a [`MaterialSpec`]
//! - [`ConstraintBinder`]: makes a node follow another node or a bone
//!
//! Anything implementing all three is a [`Host`].

use std::path::{Path, PathBuf};

use actorplan_math::{BakeMask, Quad, Transform};
use serde::Serialize;
use thiserror::Error;

use crate::material::MaterialSpec;
use crate::scene::Anchor;

/// Opaque handle of a host scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeHandle(pub u64);

/// Opaque handle of a host material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MaterialHandle(pub u64);

/// Errors reported by a host.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to import {}: {message}", path.display())]
    Import { path: PathBuf, message: String },

    #[error("unknown node {0:?}")]
    UnknownNode(NodeHandle),

    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),

    #[error("{0}")]
    Other(String),
}

/// Host-side type of an imported node.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportedKind {
    Mesh,
    Armature { bones: Vec<String> },
    Empty,
}

/// A node created by the importer.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedNode {
    pub handle: NodeHandle,

    /// Object name
    pub name: String,

    /// Name of the underlying mesh data, if any
    pub data_name: Option<String>,

    pub kind: ImportedKind,

    /// Number of UV channels on the mesh data
    pub uv_channels: usize,
}

/// Imports geometry and edits freshly imported nodes.
pub trait MeshImporter {
    /// Import a mesh file. Returns only the nodes this call created.
    fn import_mesh(&mut self, path: &Path) -> Result<Vec<ImportedNode>, HostError>;

    /// Create a flat quad mesh node with a reset UV layout.
    fn create_quad(
        &mut self,
        name: &str,
        quad: &Quad,
        transform: Transform,
    ) -> Result<ImportedNode, HostError>;

    /// Rename a node and, when given, its mesh data.
    ///
    /// Returns the name the host actually assigned, which may carry a
    /// uniquifying suffix when `name` is already taken.
    fn rename_node(
        &mut self,
        node: NodeHandle,
        name: &str,
        data_name: Option<&str>,
    ) -> Result<String, HostError>;

    /// Rename one bone of an armature node.
    fn rename_bone(&mut self, armature: NodeHandle, from: &str, to: &str) -> Result<(), HostError>;

    /// Rename the leading UV channels of a node, in order.
    fn rename_uv_channels(&mut self, node: NodeHandle, names: &[&str]) -> Result<(), HostError>;

    /// Move the selected transform components into the node's geometry.
    fn bake_transform(&mut self, node: NodeHandle, mask: BakeMask) -> Result<(), HostError>;

    /// Drop every material slot of a node.
    fn clear_material_slots(&mut self, node: NodeHandle) -> Result<(), HostError>;
}

/// Builds and assigns materials.
pub trait MaterialBuilder {
    /// Names of all materials currently in the host.
    fn material_names(&self) -> Vec<String>;

    /// Delete a material by name.
    fn remove_material(&mut self, name: &str) -> Result<(), HostError>;

    /// Build a material. Callers build each name at most once per run.
    fn build_material(&mut self, spec: &MaterialSpec) -> Result<MaterialHandle, HostError>;

    /// Put a material into the first slot of a node.
    fn assign_material(&mut self, node: NodeHandle, material: MaterialHandle) -> Result<(), HostError>;
}

/// Establishes follow constraints.
pub trait ConstraintBinder {
    /// Make `node` follow the position and rotation of `target`. Bone
    /// targets name their owning armature.
    fn bind(&mut self, node: NodeHandle, target: &Anchor) -> Result<(), HostError>;
}

/// A complete authoring host.
pub trait Host: MeshImporter + MaterialBuilder + ConstraintBinder {}

impl<T: MeshImporter + MaterialBuilder + ConstraintBinder> Host for T {}
