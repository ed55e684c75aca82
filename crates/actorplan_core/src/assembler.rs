//! Scene assembly for one merged variant.
//!
//! Turns a mesh or decal element into classified [`SceneNode`]s:
//!
//! 1. import the mesh (or synthesize the decal quad)
//! 2. normalize UV channel names and `prop.`/`prop-` node and bone names
//! 3. classify nodes and bake transforms: full T/R/S into regular nodes,
//!    scale only into prop anchors so they keep their placement
//! 4. drop material slots and materials the import created as a side effect
//! 5. bind non-anchor nodes to the parent's root object or matching anchor

use std::collections::HashSet;

use actorplan_math::{BakeMask, Quad, Transform, Vec3};
use serde::Serialize;

use crate::descriptor::{DecalSpec, DescriptorStore, MeshSpec};
use crate::error::{Diagnostic, ResolveResult};
use crate::host::{Host, ImportedKind, ImportedNode};
use crate::material::MaterialResolver;
use crate::scene::{
    is_prop_name, normalize_prop_name, Anchor, AttachmentContext, NodeRole, SceneNode,
};

/// Height of decal quads above the ground plane.
pub const DECAL_LIFT: f32 = 0.01;
/// Name given to decal nodes.
pub const DECAL_NAME: &str = "Decal";
/// Canonical names of the leading UV channels.
pub const UV_CHANNEL_NAMES: [&str; 2] = ["UVMap", "AOMap"];

/// A follow constraint set up during assembly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Binding {
    pub node: String,
    pub target: Anchor,
}

/// Nodes and bindings produced for one variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Assembly {
    pub nodes: Vec<SceneNode>,
    pub bindings: Vec<Binding>,
}

/// Classify a freshly imported node from its normalized name.
pub fn classify(node: &ImportedNode, decal: bool) -> NodeRole {
    if is_prop_name(&node.name) {
        return NodeRole::PropAnchor;
    }

    match &node.kind {
        ImportedKind::Armature { bones } => NodeRole::Armature {
            bones: bones.clone(),
        },
        ImportedKind::Empty => NodeRole::Empty,
        ImportedKind::Mesh if decal => NodeRole::Decal,
        ImportedKind::Mesh => NodeRole::Primary,
    }
}

/// Object-level placement of a decal quad.
pub fn decal_transform(decal: &DecalSpec) -> Transform {
    Transform::from_translation_yaw_degrees(
        Vec3::new(decal.offset_x, decal.offset_z, DECAL_LIFT),
        decal.angle,
    )
}

/// Assembles variants against a host.
pub struct SceneAssembler<'a, H: Host + ?Sized> {
    host: &'a mut H,
    store: &'a DescriptorStore,
    materials: &'a MaterialResolver,
}

impl<'a, H: Host + ?Sized> SceneAssembler<'a, H> {
    pub fn new(host: &'a mut H, store: &'a DescriptorStore, materials: &'a MaterialResolver) -> Self {
        Self {
            host,
            store,
            materials,
        }
    }

    /// Create, classify and bind the nodes of one mesh or decal element.
    ///
    /// A failed mesh import is recorded in `diagnostics` and yields an
    /// empty assembly.
    pub fn assemble(
        &mut self,
        mesh: &MeshSpec,
        ctx: &AttachmentContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ResolveResult<Assembly> {
        let prior_materials: HashSet<String> = self.host.material_names().into_iter().collect();

        let (imported, decal) = match mesh {
            MeshSpec::Mesh { path } => {
                let path = self.store.mesh_path(path);
                log::info!("Importing mesh {}", path.display());
                match self.host.import_mesh(&path) {
                    Ok(nodes) => (nodes, false),
                    Err(err) => {
                        log::warn!("Could not load {}: {}", path.display(), err);
                        diagnostics.push(Diagnostic::MeshImportFailed {
                            path,
                            reason: err.to_string(),
                        });
                        return Ok(Assembly::default());
                    }
                }
            }
            MeshSpec::Decal(spec) => {
                let quad = Quad::new(spec.width, spec.depth);
                let node = self.host.create_quad(DECAL_NAME, &quad, decal_transform(spec))?;
                (vec![node], true)
            }
        };

        let mut nodes = Vec::with_capacity(imported.len());
        for node in imported {
            nodes.push(self.ingest(node, decal)?);
        }

        for node in &nodes {
            let mask = if node.is_anchor() { BakeMask::SCALE } else { BakeMask::ALL };
            self.host.bake_transform(node.handle, mask)?;
            self.host.clear_material_slots(node.handle)?;
        }

        self.discard_stale_materials(&prior_materials)?;

        let bindings = self.bind(&nodes, ctx, diagnostics)?;
        Ok(Assembly { nodes, bindings })
    }

    /// Normalize names and classify one imported node.
    fn ingest(&mut self, mut node: ImportedNode, decal: bool) -> ResolveResult<SceneNode> {
        let channels = node.uv_channels.min(UV_CHANNEL_NAMES.len());
        if channels > 0 {
            self.host
                .rename_uv_channels(node.handle, &UV_CHANNEL_NAMES[..channels])?;
        }

        let name = normalize_prop_name(&node.name).into_owned();
        let data_name = node
            .data_name
            .as_deref()
            .map(|data| normalize_prop_name(data).into_owned())
            .filter(|data| Some(data.as_str()) != node.data_name.as_deref());
        if name != node.name || data_name.is_some() {
            node.name = self.host.rename_node(node.handle, &name, data_name.as_deref())?;
        }

        if let ImportedKind::Armature { bones } = &mut node.kind {
            for bone in bones.iter_mut() {
                let normalized = normalize_prop_name(bone).into_owned();
                if normalized != *bone {
                    self.host.rename_bone(node.handle, bone, &normalized)?;
                    *bone = normalized;
                }
            }
        }

        let role = classify(&node, decal);
        log::debug!("Imported {} as {:?}", node.name, role);

        Ok(SceneNode {
            handle: node.handle,
            name: node.name,
            role,
        })
    }

    /// Remove materials that appeared during import and are not ours.
    fn discard_stale_materials(&mut self, prior: &HashSet<String>) -> ResolveResult<()> {
        let stale: Vec<String> = self
            .host
            .material_names()
            .into_iter()
            .filter(|name| !prior.contains(name) && !self.materials.manages(name))
            .collect();

        for name in stale {
            log::debug!("Removing imported material {}", name);
            self.host.remove_material(&name)?;
        }
        Ok(())
    }

    fn bind(
        &mut self,
        nodes: &[SceneNode],
        ctx: &AttachmentContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ResolveResult<Vec<Binding>> {
        // A top-level actor has nothing to follow.
        if ctx.depth == 0 && ctx.is_detached() {
            return Ok(Vec::new());
        }

        let target = ctx.target();
        let mut bindings = Vec::new();

        for node in nodes.iter().filter(|n| !n.is_anchor()) {
            match target {
                Some(target) => {
                    log::info!("{} -> {}", node.name, target.name());
                    self.host.bind(node.handle, target)?;
                    bindings.push(Binding {
                        node: node.name.clone(),
                        target: target.clone(),
                    });
                }
                None => {
                    let root = ctx.root.as_ref().map(|r| r.name().to_string());
                    log::warn!(
                        "{} has no parent prop point named prop_{}. Root object: {}",
                        node.name,
                        ctx.attachpoint,
                        root.as_deref().unwrap_or("undefined")
                    );
                    diagnostics.push(Diagnostic::UnresolvedAttachment {
                        node: node.name.clone(),
                        attachpoint: ctx.attachpoint.clone(),
                        root,
                    });
                }
            }
        }

        Ok(bindings)
    }
}
