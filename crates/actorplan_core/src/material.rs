//! Material resolution.
//!
//! A texture list becomes a [`MaterialSpec`] named after its base texture and
//! is built at most once per import run. The material kind string selects
//! extra wiring:
//!
//! - `player_trans`: base colour tinted by the player colour where the base
//!   alpha is low
//! - `basic_trans`: base alpha drives an alpha-clip cutout
//!
//! Normal maps are read as non-colour data with the green channel inverted
//! (the textures use the left-handed tangent-space convention).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::descriptor::{SlotKind, TextureRef};
use crate::host::{HostError, MaterialBuilder, MaterialHandle};
use crate::texture::ImageCache;

/// Marker of player-colour tinted materials.
pub const PLAYER_TINT_MARKER: &str = "player_trans";
/// Marker of alpha-tested materials.
pub const TRANSLUCENT_MARKER: &str = "basic_trans";
/// Material kind decals fall back to.
pub const DECAL_MATERIAL: &str = "basic_trans.xml";
/// Tint applied to player-coloured regions.
pub const PLAYER_COLOR: [f32; 3] = [1.0, 0.213477, 0.0543914];

/// Name a material after the file of its base texture, falling back to the
/// first texture. `None` for an empty list.
pub fn material_name(textures: &[TextureRef]) -> Option<&str> {
    textures
        .iter()
        .find(|t| t.slot == SlotKind::Base)
        .or_else(|| textures.first())
        .map(TextureRef::file_name)
}

/// How image data is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    Srgb,
    NonColor,
}

/// Surface blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Cut out where the base alpha is low
    AlphaClip,
}

/// An image wired into a material input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageInput {
    /// Loaded image name (file name)
    pub image: String,
    pub path: PathBuf,
    pub color_space: ColorSpace,
    /// Flip the green channel before use
    pub invert_green: bool,
}

/// Everything a host needs to build one material.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MaterialSpec {
    pub name: String,
    pub base_color: Option<ImageInput>,
    pub normal: Option<ImageInput>,
    pub specular: Option<ImageInput>,
    /// Player colour mixed over the base colour by inverted base alpha
    pub player_tint: Option<[f32; 3]>,
    pub blend: BlendMode,
}

impl MaterialSpec {
    /// Describe a material for `kind` from the loaded subset of `textures`.
    ///
    /// Textures whose image is not in `images` are skipped. The first
    /// texture of each slot kind wins. Tinting and blending only apply when
    /// a base image is present.
    pub fn from_textures(name: &str, kind: &str, textures: &[TextureRef], images: &ImageCache) -> Self {
        let mut spec = MaterialSpec {
            name: name.to_string(),
            ..Default::default()
        };

        for texture in textures {
            let Some(image) = images.get(texture.file_name()) else {
                log::debug!("Image {} not loaded, skipping", texture.file_name());
                continue;
            };

            let input = |color_space, invert_green| ImageInput {
                image: image.name.clone(),
                path: image.path.clone(),
                color_space,
                invert_green,
            };

            match texture.slot {
                SlotKind::Base if spec.base_color.is_none() => {
                    spec.base_color = Some(input(ColorSpace::Srgb, false));
                    if kind.contains(PLAYER_TINT_MARKER) {
                        spec.player_tint = Some(PLAYER_COLOR);
                    } else if kind.contains(TRANSLUCENT_MARKER) {
                        spec.blend = BlendMode::AlphaClip;
                    }
                }
                SlotKind::Normal if spec.normal.is_none() => {
                    spec.normal = Some(input(ColorSpace::NonColor, true));
                }
                SlotKind::Specular if spec.specular.is_none() => {
                    spec.specular = Some(input(ColorSpace::NonColor, false));
                }
                _ => {}
            }
        }

        spec
    }
}

/// A material available in the current run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedMaterial {
    pub name: String,
    pub handle: MaterialHandle,
}

/// Builds materials at most once per name.
#[derive(Debug, Default)]
pub struct MaterialResolver {
    /// Materials built in this run, by name
    registry: HashMap<String, MaterialHandle>,

    /// Build order, for reporting
    built: Vec<String>,
}

impl MaterialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the material for a texture list, building it on first use.
    ///
    /// Returns `Ok(None)` for an empty texture list.
    pub fn resolve<B: MaterialBuilder + ?Sized>(
        &mut self,
        builder: &mut B,
        images: &ImageCache,
        kind: &str,
        textures: &[TextureRef],
    ) -> Result<Option<ResolvedMaterial>, HostError> {
        let Some(name) = material_name(textures) else {
            return Ok(None);
        };

        if let Some(&handle) = self.registry.get(name) {
            log::debug!("Reusing material {}", name);
            return Ok(Some(ResolvedMaterial {
                name: name.to_string(),
                handle,
            }));
        }

        let spec = MaterialSpec::from_textures(name, kind, textures, images);
        let handle = builder.build_material(&spec)?;
        log::info!("Built material {} ({})", name, kind);

        self.registry.insert(name.to_string(), handle);
        self.built.push(name.to_string());

        Ok(Some(ResolvedMaterial {
            name: name.to_string(),
            handle,
        }))
    }

    /// True if this run manages a material of that name.
    pub fn manages(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Names of materials built in this run, in build order.
    pub fn built(&self) -> &[String] {
        &self.built
    }
}
