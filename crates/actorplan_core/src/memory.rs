//! In-memory host.
//!
//! [`MemoryHost`] implements every host trait over plain collections and
//! records what was asked of it. Tests register mesh fixtures by path
//! suffix; the permissive mode turns any unknown mesh into a single node
//! named after the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use actorplan_math::{BakeMask, Mat4, Quad, Transform, Vec3};

use crate::host::{
    ConstraintBinder, HostError, ImportedKind, ImportedNode, MaterialBuilder, MaterialHandle,
    MeshImporter, NodeHandle,
};
use crate::material::MaterialSpec;
use crate::scene::Anchor;

/// Blueprint of a node created when a registered mesh is imported.
#[derive(Clone, Debug)]
pub struct NodeTemplate {
    pub name: String,
    pub data_name: Option<String>,
    pub kind: ImportedKind,
    pub uv_channels: Vec<String>,
    pub transform: Transform,
    /// Material slot created by the import itself
    pub material: Option<String>,
}

impl NodeTemplate {
    fn new(name: &str, kind: ImportedKind, data_name: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            data_name,
            kind,
            uv_channels: Vec::new(),
            transform: Transform::IDENTITY,
            material: None,
        }
    }

    /// A mesh node whose data shares its name.
    pub fn mesh(name: &str) -> Self {
        Self::new(name, ImportedKind::Mesh, Some(name.to_string()))
    }

    pub fn armature(name: &str, bones: &[&str]) -> Self {
        let bones = bones.iter().map(|b| b.to_string()).collect();
        Self::new(name, ImportedKind::Armature { bones }, Some(name.to_string()))
    }

    pub fn empty(name: &str) -> Self {
        Self::new(name, ImportedKind::Empty, None)
    }

    pub fn with_data_name(mut self, data_name: &str) -> Self {
        self.data_name = Some(data_name.to_string());
        self
    }

    pub fn with_uv_channels(mut self, channels: &[&str]) -> Self {
        self.uv_channels = channels.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: &str) -> Self {
        self.material = Some(material.to_string());
        self
    }
}

/// A node living in the memory host.
#[derive(Clone, Debug)]
pub struct MemoryNode {
    pub handle: NodeHandle,
    pub name: String,
    pub data_name: Option<String>,
    pub kind: ImportedKind,
    pub uv_channels: Vec<String>,
    /// Object-level transform
    pub transform: Transform,
    /// Transform baked into the geometry
    pub geometry: Mat4,
    pub material_slots: Vec<MaterialHandle>,
    /// Follow constraints, in creation order
    pub constraints: Vec<Anchor>,
    /// Set for synthesized quads
    pub quad: Option<Quad>,
    /// Local vertex positions, before the geometry transform
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indexing `vertices`
    pub triangles: Vec<u32>,
}

impl MemoryNode {
    /// Bone names of an armature node.
    pub fn bones(&self) -> Vec<&str> {
        match &self.kind {
            ImportedKind::Armature { bones } => bones.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// A material living in the memory host.
#[derive(Clone, Debug)]
pub struct MemoryMaterial {
    pub handle: MaterialHandle,
    pub name: String,
    /// `None` for materials not built through [`MaterialBuilder`]
    pub spec: Option<MaterialSpec>,
}

/// Host that keeps its scene in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    next_id: u64,
    permissive: bool,
    meshes: Vec<(PathBuf, Vec<NodeTemplate>)>,
    import_materials: Vec<(PathBuf, Vec<String>)>,
    nodes: BTreeMap<NodeHandle, MemoryNode>,
    materials: Vec<MemoryMaterial>,
    imports: Vec<PathBuf>,
    builds: Vec<String>,
    removed: Vec<String>,
}

impl MemoryHost {
    /// A host that only knows registered meshes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that imports unregistered meshes as one node named after
    /// the file stem.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Register the nodes created when a mesh path ending in `suffix` is
    /// imported.
    pub fn register_mesh(&mut self, suffix: impl Into<PathBuf>, nodes: Vec<NodeTemplate>) {
        self.meshes.push((suffix.into(), nodes));
    }

    /// Register materials an import of `suffix` creates as a side effect.
    pub fn register_import_materials(&mut self, suffix: impl Into<PathBuf>, names: &[&str]) {
        let names = names.iter().map(|n| n.to_string()).collect();
        self.import_materials.push((suffix.into(), names));
    }

    /// Add a pre-existing material.
    pub fn add_material(&mut self, name: &str) -> MaterialHandle {
        self.insert_material(name, None)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(&handle)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&MemoryNode> {
        self.nodes.values().find(|n| n.name == name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MemoryNode> {
        self.nodes.values()
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MemoryMaterial> {
        self.materials.iter().find(|m| m.handle == handle)
    }

    pub fn material_by_name(&self, name: &str) -> Option<&MemoryMaterial> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Paths passed to [`MeshImporter::import_mesh`], in call order.
    pub fn imports(&self) -> &[PathBuf] {
        &self.imports
    }

    /// Names passed to [`MaterialBuilder::build_material`], in call order.
    pub fn built_materials(&self) -> Vec<String> {
        self.builds.clone()
    }

    /// Names passed to [`MaterialBuilder::remove_material`], in call order.
    pub fn removed_materials(&self) -> Vec<String> {
        self.removed.clone()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_material(&mut self, name: &str, spec: Option<MaterialSpec>) -> MaterialHandle {
        let handle = MaterialHandle(self.next_handle());
        self.materials.push(MemoryMaterial {
            handle,
            name: name.to_string(),
            spec,
        });
        handle
    }

    /// Unique node names: `name`, `name.001`, `name.002`, ...
    fn unique_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.nodes.values().any(|n| n.name == candidate);
        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|i| format!("{name}.{i:03}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    fn spawn(&mut self, template: &NodeTemplate, quad: Option<Quad>) -> ImportedNode {
        let handle = NodeHandle(self.next_handle());
        let name = self.unique_name(&template.name);

        let mut material_slots = Vec::new();
        if let Some(material) = &template.material {
            let existing = self.material_by_name(material).map(|m| m.handle);
            let handle = existing.unwrap_or_else(|| self.insert_material(material, None));
            material_slots.push(handle);
        }

        let node = MemoryNode {
            handle,
            name: name.clone(),
            data_name: template.data_name.clone(),
            kind: template.kind.clone(),
            uv_channels: template.uv_channels.clone(),
            transform: template.transform,
            geometry: Mat4::IDENTITY,
            material_slots,
            constraints: Vec::new(),
            quad,
            vertices: quad.map(|q| q.positions().to_vec()).unwrap_or_default(),
            uvs: quad.map(|q| q.uvs().to_vec()).unwrap_or_default(),
            triangles: quad.map(|q| q.triangles().to_vec()).unwrap_or_default(),
        };
        self.nodes.insert(handle, node);

        ImportedNode {
            handle,
            name,
            data_name: template.data_name.clone(),
            kind: template.kind.clone(),
            uv_channels: template.uv_channels.len(),
        }
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(&handle).ok_or(HostError::UnknownNode(handle))
    }
}

impl MeshImporter for MemoryHost {
    fn import_mesh(&mut self, path: &Path) -> Result<Vec<ImportedNode>, HostError> {
        self.imports.push(path.to_path_buf());

        let registered = self
            .meshes
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix))
            .map(|(_, templates)| templates.clone());

        let templates = match registered {
            Some(templates) => templates,
            None if self.permissive => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "mesh".to_string());
                vec![NodeTemplate::mesh(&stem).with_uv_channels(&["map1"])]
            }
            None => {
                return Err(HostError::Import {
                    path: path.to_path_buf(),
                    message: "no such mesh".to_string(),
                })
            }
        };

        let side_effects: Vec<String> = self
            .import_materials
            .iter()
            .filter(|(suffix, _)| path.ends_with(suffix))
            .flat_map(|(_, names)| names.clone())
            .collect();
        for name in side_effects {
            self.insert_material(&name, None);
        }

        Ok(templates.iter().map(|t| self.spawn(t, None)).collect())
    }

    fn create_quad(
        &mut self,
        name: &str,
        quad: &Quad,
        transform: Transform,
    ) -> Result<ImportedNode, HostError> {
        let template = NodeTemplate::mesh(name)
            .with_uv_channels(&["UVMap"])
            .with_transform(transform);
        Ok(self.spawn(&template, Some(*quad)))
    }

    fn rename_node(
        &mut self,
        node: NodeHandle,
        name: &str,
        data_name: Option<&str>,
    ) -> Result<String, HostError> {
        let current = self.node_mut(node)?.name.clone();
        let unique = if current == name {
            current
        } else {
            self.unique_name(name)
        };
        let node = self.node_mut(node)?;
        node.name = unique;
        if let Some(data_name) = data_name {
            node.data_name = Some(data_name.to_string());
        }
        Ok(node.name.clone())
    }

    fn rename_bone(&mut self, armature: NodeHandle, from: &str, to: &str) -> Result<(), HostError> {
        let node = self.node_mut(armature)?;
        match &mut node.kind {
            ImportedKind::Armature { bones } => {
                for bone in bones.iter_mut().filter(|b| b.as_str() == from) {
                    *bone = to.to_string();
                }
                Ok(())
            }
            _ => Err(HostError::Other(format!("{} is not an armature", node.name))),
        }
    }

    fn rename_uv_channels(&mut self, node: NodeHandle, names: &[&str]) -> Result<(), HostError> {
        let node = self.node_mut(node)?;
        for (channel, name) in node.uv_channels.iter_mut().zip(names) {
            *channel = name.to_string();
        }
        Ok(())
    }

    fn bake_transform(&mut self, node: NodeHandle, mask: BakeMask) -> Result<(), HostError> {
        let node = self.node_mut(node)?;
        let (geometry, residual) = node.transform.bake(mask);
        node.geometry = geometry * node.geometry;
        node.transform = residual;
        Ok(())
    }

    fn clear_material_slots(&mut self, node: NodeHandle) -> Result<(), HostError> {
        self.node_mut(node)?.material_slots.clear();
        Ok(())
    }
}

impl MaterialBuilder for MemoryHost {
    fn material_names(&self) -> Vec<String> {
        self.materials.iter().map(|m| m.name.clone()).collect()
    }

    fn remove_material(&mut self, name: &str) -> Result<(), HostError> {
        let before = self.materials.len();
        self.materials.retain(|m| m.name != name);
        if self.materials.len() == before {
            return Err(HostError::Other(format!("no material named {name}")));
        }
        self.removed.push(name.to_string());
        Ok(())
    }

    fn build_material(&mut self, spec: &MaterialSpec) -> Result<MaterialHandle, HostError> {
        self.builds.push(spec.name.clone());
        if let Some(existing) = self.material_by_name(&spec.name) {
            return Ok(existing.handle);
        }
        Ok(self.insert_material(&spec.name, Some(spec.clone())))
    }

    fn assign_material(&mut self, node: NodeHandle, material: MaterialHandle) -> Result<(), HostError> {
        if self.material(material).is_none() {
            return Err(HostError::UnknownMaterial(material));
        }
        let node = self.node_mut(node)?;
        match node.material_slots.first_mut() {
            Some(slot) => *slot = material,
            None => node.material_slots.push(material),
        }
        Ok(())
    }
}

impl ConstraintBinder for MemoryHost {
    fn bind(&mut self, node: NodeHandle, target: &Anchor) -> Result<(), HostError> {
        self.node_mut(node)?.constraints.push(target.clone());
        Ok(())
    }
}
