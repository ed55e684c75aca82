//! Variant selection and inheritance merging.
//!
//! Each non-empty variant group contributes one selected variant. A selected
//! variant that names a parent `file` is merged with its inheritance chain:
//!
//! - mesh: the first mesh or decal found walking child -> parent -> ...
//! - textures / props: child entries first, then ancestor entries whose key
//!   is not already present, in ancestor order. Child entries always win.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::descriptor::{DescriptorStore, Keyed, MeshSpec, PropRef, TextureRef, Variant, VariantGroup};
use crate::error::{ResolveError, ResolveResult};

/// Pick one variant from a group.
///
/// Starts at index 0 and, while the current pick is unweighted (no
/// `frequency` or the literal `"0"`), re-rolls uniformly at most `k` times.
/// When every re-roll lands on an unweighted variant, the last pick is used
/// anyway. Returns `None` for an empty group.
pub fn select_variant<'a, R: Rng>(
    group: &'a VariantGroup,
    rng: &mut R,
) -> Option<&'a Variant> {
    let k = group.len();
    let mut selected = group.variants.first()?;
    if k == 1 {
        return Some(selected);
    }

    let mut retries = 0;
    while selected.is_unweighted() && retries < k {
        selected = &group.variants[rng.gen_range(0..k)];
        retries += 1;
    }

    Some(selected)
}

/// Merge a child's keyed list with its resolved parent list.
///
/// A missing child list adopts the parent's wholesale. Otherwise the child's
/// entries are kept verbatim and parent entries with unseen keys are
/// appended in parent order.
pub fn merge_keyed<T: Keyed + Clone>(child: Option<&[T]>, parent: Option<Vec<T>>) -> Option<Vec<T>> {
    match (child, parent) {
        (None, parent) => parent,
        (Some(child), None) => Some(child.to_vec()),
        (Some(child), Some(parent)) => {
            let keys: HashSet<&str> = child.iter().map(Keyed::key).collect();
            let mut merged = child.to_vec();
            merged.extend(parent.into_iter().filter(|entry| !keys.contains(entry.key())));
            Some(merged)
        }
    }
}

/// A selected variant with its inheritance chain folded in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MergedVariant {
    pub name: Option<String>,
    pub mesh: Option<MeshSpec>,
    pub textures: Option<Vec<TextureRef>>,
    pub props: Option<Vec<PropRef>>,
}

impl MergedVariant {
    /// A variant with no inheritance reference, taken as is.
    pub fn from_variant(variant: &Variant) -> Self {
        Self {
            name: variant.name.clone(),
            mesh: variant.mesh.clone(),
            textures: variant.textures.clone(),
            props: variant.props.clone(),
        }
    }

    pub fn textures(&self) -> &[TextureRef] {
        self.textures.as_deref().unwrap_or_default()
    }

    pub fn props(&self) -> &[PropRef] {
        self.props.as_deref().unwrap_or_default()
    }
}

/// Resolves inheritance chains through a [`DescriptorStore`].
pub struct VariantResolver<'s> {
    store: &'s mut DescriptorStore,
}

impl<'s> VariantResolver<'s> {
    pub fn new(store: &'s mut DescriptorStore) -> Self {
        Self { store }
    }

    /// Merge `variant` with its inheritance chain.
    pub fn resolve(&mut self, variant: &Variant) -> ResolveResult<MergedVariant> {
        if variant.file.is_none() {
            return Ok(MergedVariant::from_variant(variant));
        }

        let ancestors = self.ancestors(variant)?;
        log::debug!(
            "Variant {} inherits from {} ancestor(s)",
            variant.label(),
            ancestors.len()
        );

        let mesh = std::iter::once(variant)
            .chain(ancestors.iter().map(|a| a.as_ref()))
            .find_map(|v| v.mesh.clone());

        // Fold from the farthest ancestor towards the child.
        let mut textures = None;
        let mut props = None;
        for ancestor in ancestors.iter().rev() {
            textures = merge_keyed(ancestor.textures.as_deref(), textures);
            props = merge_keyed(ancestor.props.as_deref(), props);
        }

        Ok(MergedVariant {
            name: variant.name.clone(),
            mesh,
            textures: merge_keyed(variant.textures.as_deref(), textures),
            props: merge_keyed(variant.props.as_deref(), props),
        })
    }

    /// Load the parent chain, nearest first.
    fn ancestors(&mut self, variant: &Variant) -> ResolveResult<Vec<Arc<Variant>>> {
        let mut chain: Vec<PathBuf> = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut ancestors = Vec::new();

        let mut next = variant.file.clone();
        while let Some(file) = next {
            let path = self.store.variant_path(&file);
            if !visited.insert(path.clone()) {
                chain.push(path.clone());
                return Err(ResolveError::CyclicInheritance { path, chain });
            }
            chain.push(path.clone());

            let parent = self.store.load_variant_file(&path)?;
            next = parent.file.clone();
            ancestors.push(parent);
        }

        Ok(ancestors)
    }
}
