//! Descriptor loading and caching.
//!
//! All descriptor paths resolve against a single bundle root: the directory
//! that contains the `actors/`, `variants/`, `meshes/` and `textures/`
//! folders. Parsed documents are immutable, so a cached copy is observably
//! identical to a fresh read for the lifetime of one import run.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{ResolveError, ResolveResult};

use super::parser::{parse_actor_str, parse_variant_str};
use super::types::{ActorDescriptor, Variant};

/// Directory of top-level and prop actors.
pub const ACTORS_DIR: &str = "actors";
/// Directory of inheritance-parent variants.
pub const VARIANTS_DIR: &str = "variants";
/// Directory of mesh files.
pub const MESHES_DIR: &str = "meshes";
/// Directory of skin textures, relative to the root.
pub const SKINS_DIR: &str = "textures/skins";

/// Derive the bundle root from the path of an actor file.
///
/// The root is everything before the first `actors` component. Paths with
/// no such component fall back to the file's own directory.
pub fn bundle_root(path: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in path.components() {
        if component.as_os_str() == ACTORS_DIR {
            return root;
        }
        root.push(component);
    }

    log::warn!(
        "{} is not inside an '{}' directory, resolving relative to its parent",
        path.display(),
        ACTORS_DIR
    );
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Lexically remove `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Loads and caches actor and variant documents for one import run.
#[derive(Debug)]
pub struct DescriptorStore {
    /// Bundle root directory
    root: PathBuf,

    /// Parsed actors by normalized path
    actors: HashMap<PathBuf, Arc<ActorDescriptor>>,

    /// Parsed inheritance parents by normalized path
    variants: HashMap<PathBuf, Arc<Variant>>,
}

impl DescriptorStore {
    /// Create an empty store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            actors: HashMap::new(),
            variants: HashMap::new(),
        }
    }

    /// The bundle root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn actor_path(&self, relative: &str) -> PathBuf {
        normalize_path(&self.root.join(ACTORS_DIR).join(relative))
    }

    pub fn variant_path(&self, relative: &str) -> PathBuf {
        normalize_path(&self.root.join(VARIANTS_DIR).join(relative))
    }

    pub fn mesh_path(&self, relative: &str) -> PathBuf {
        normalize_path(&self.root.join(MESHES_DIR).join(relative))
    }

    pub fn texture_path(&self, relative: &str) -> PathBuf {
        normalize_path(&self.root.join(SKINS_DIR).join(relative))
    }

    /// Load an actor relative to the `actors/` directory.
    pub fn load_actor(&mut self, relative: &str) -> ResolveResult<Arc<ActorDescriptor>> {
        let path = self.actor_path(relative);
        self.load_actor_file(&path)
    }

    /// Load an actor by full path.
    pub fn load_actor_file(&mut self, path: &Path) -> ResolveResult<Arc<ActorDescriptor>> {
        let key = normalize_path(path);
        if let Some(actor) = self.actors.get(&key) {
            return Ok(actor.clone());
        }

        let content = read(&key)?;
        let actor = parse_actor_str(&content).map_err(|source| ResolveError::Malformed {
            path: key.clone(),
            source,
        })?;

        log::debug!("Parsed actor {} ({} groups)", key.display(), actor.groups.len());

        let actor = Arc::new(actor);
        self.actors.insert(key, actor.clone());
        Ok(actor)
    }

    /// Load an inheritance parent relative to the `variants/` directory.
    pub fn load_variant(&mut self, relative: &str) -> ResolveResult<Arc<Variant>> {
        let path = self.variant_path(relative);
        self.load_variant_file(&path)
    }

    /// Load an inheritance parent by full path (see [`Self::variant_path`]).
    pub fn load_variant_file(&mut self, path: &Path) -> ResolveResult<Arc<Variant>> {
        let key = normalize_path(path);
        if let Some(variant) = self.variants.get(&key) {
            return Ok(variant.clone());
        }

        let content = read(&key)?;
        let variant = parse_variant_str(&content).map_err(|source| ResolveError::Malformed {
            path: key.clone(),
            source,
        })?;

        let variant = Arc::new(variant);
        self.variants.insert(key, variant.clone());
        Ok(variant)
    }

    /// Number of cached documents (actors and variants).
    pub fn cached_len(&self) -> usize {
        self.actors.len() + self.variants.len()
    }
}

fn read(path: &Path) -> ResolveResult<String> {
    std::fs::read_to_string(path).map_err(|source| ResolveError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}
