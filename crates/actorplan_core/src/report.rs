//! Import reports.
//!
//! The plan produced by one import run, as a serializable tree.

use std::path::PathBuf;

use serde::Serialize;

use crate::assembler::Binding;
use crate::error::Diagnostic;
use crate::scene::{Anchor, SceneNode};
use crate::variant::MergedVariant;

/// What resolving one actor descriptor produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorInstance {
    /// Descriptor file
    pub actor: PathBuf,

    /// Attachpoint requested by the parent (`root` at the top level)
    pub attachpoint: String,

    pub depth: i32,

    /// Selected and merged variant of each non-empty group
    pub variants: Vec<MergedVariant>,

    /// Nodes created for this actor, in creation order
    pub nodes: Vec<SceneNode>,

    pub bindings: Vec<Binding>,

    /// Material assigned to the actor's geometry
    pub material: Option<String>,

    /// Anchors this actor offers to its props
    pub anchors: Vec<Anchor>,

    /// Root object this actor resolved for its props
    pub root: Option<Anchor>,

    pub children: Vec<ActorInstance>,
}

impl ActorInstance {
    /// This instance and all descendants, depth first.
    pub fn iter(&self) -> impl Iterator<Item = &ActorInstance> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Deepest prop level below this instance, 0 without props.
    pub fn prop_levels(&self) -> i32 {
        self.iter().map(|i| i.depth - self.depth).max().unwrap_or(0)
    }
}

/// Result of one top-level import run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportReport {
    /// Directory all descriptor paths resolved against
    pub bundle_root: PathBuf,

    pub root: ActorInstance,

    /// Materials built in this run, in build order
    pub materials: Vec<String>,

    /// Non-fatal conditions, in the order they occurred
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Total number of resolved actors, props included.
    pub fn actor_count(&self) -> usize {
        self.root.iter().count()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
