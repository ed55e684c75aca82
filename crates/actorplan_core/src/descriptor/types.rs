//! Actor descriptor types.
//!
//! These types are the parsed, immutable form of actor and variant
//! documents. Resolution never mutates them; merging produces new values.

use serde::Serialize;

/// Material kind used when an actor does not declare one.
pub const DEFAULT_MATERIAL: &str = "default.xml";

/// Root of a parsed actor document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorDescriptor {
    /// Variant groups in document order
    pub groups: Vec<VariantGroup>,

    /// Material kind (file name of the material definition)
    pub material: Option<String>,
}

impl ActorDescriptor {
    /// The declared material kind, or [`DEFAULT_MATERIAL`].
    pub fn material_kind(&self) -> &str {
        self.material.as_deref().unwrap_or(DEFAULT_MATERIAL)
    }
}

/// A set of mutually exclusive variant alternatives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantGroup {
    pub variants: Vec<Variant>,
}

impl VariantGroup {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// One variant alternative.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variant {
    /// Display name (diagnostics only)
    pub name: Option<String>,

    /// Inheritance parent, relative to the bundle's `variants/` directory
    pub file: Option<String>,

    /// Raw `frequency` attribute. Kept as text: only an absent value or the
    /// literal `"0"` counts as unweighted.
    pub frequency: Option<String>,

    /// Mesh or decal element
    pub mesh: Option<MeshSpec>,

    /// Texture list
    pub textures: Option<Vec<TextureRef>>,

    /// Prop list
    pub props: Option<Vec<PropRef>>,
}

impl Variant {
    /// True when selection should try to re-roll away from this variant.
    pub fn is_unweighted(&self) -> bool {
        match self.frequency.as_deref() {
            None => true,
            Some(value) => value == "0",
        }
    }

    /// Label used in log lines.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Geometry source of a variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshSpec {
    /// Mesh file, relative to the bundle's `meshes/` directory
    Mesh { path: String },

    /// Flat ground decal
    Decal(DecalSpec),
}

/// Placement of a ground decal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DecalSpec {
    pub offset_x: f32,
    pub offset_z: f32,
    pub width: f32,
    pub depth: f32,
    /// Rotation about the vertical axis, in degrees
    pub angle: f32,
}

/// Shading role of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Base,
    Normal,
    Specular,
    Other,
}

impl SlotKind {
    /// Classify a texture by its `name` attribute.
    pub fn from_texture_name(name: &str) -> Self {
        match name {
            "baseTex" => SlotKind::Base,
            "normTex" => SlotKind::Normal,
            "specTex" => SlotKind::Specular,
            _ => SlotKind::Other,
        }
    }
}

/// A texture reference. `name` is the merge key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextureRef {
    pub name: String,
    pub slot: SlotKind,
    /// Path relative to the bundle's `textures/skins/` directory
    pub file: String,
}

impl TextureRef {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slot: SlotKind::from_texture_name(&name),
            name,
            file: file.into(),
        }
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        file_name(&self.file)
    }
}

/// A prop attachment. `attachpoint` is the merge key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropRef {
    pub attachpoint: String,
    /// Actor path relative to the bundle's `actors/` directory; may be empty
    pub actor: String,
}

impl PropRef {
    pub fn new(attachpoint: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            attachpoint: attachpoint.into(),
            actor: actor.into(),
        }
    }
}

/// Entries merged by a unique key during inheritance.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for TextureRef {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Keyed for PropRef {
    fn key(&self) -> &str {
        &self.attachpoint
    }
}

/// Strip directories from a `/` or `\` separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
