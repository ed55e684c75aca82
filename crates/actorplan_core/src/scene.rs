//! Scene node model.
//!
//! Imported nodes are classified exactly once, when they are created. Role
//! information encoded in node names (`prop.`, `prop-`, `prop_`) is
//! normalized at that point and never re-parsed downstream.

use std::borrow::Cow;

use serde::Serialize;

use crate::host::NodeHandle;

/// Canonical marker of prop attachment points.
pub const PROP_MARKER: &str = "prop_";

/// Legacy spellings normalized to [`PROP_MARKER`].
const LEGACY_MARKERS: [&str; 2] = ["prop.", "prop-"];

/// Rewrite legacy `prop.` / `prop-` markers to `prop_`.
pub fn normalize_prop_name(name: &str) -> Cow<'_, str> {
    if !LEGACY_MARKERS.iter().any(|m| name.contains(m)) {
        return Cow::Borrowed(name);
    }

    let mut normalized = name.to_string();
    for marker in LEGACY_MARKERS {
        normalized = normalized.replace(marker, PROP_MARKER);
    }
    Cow::Owned(normalized)
}

/// True if a (normalized) name marks a prop attachment point.
pub fn is_prop_name(name: &str) -> bool {
    name.contains(PROP_MARKER)
}

/// What a newly created node is, decided at creation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum NodeRole {
    /// Regular geometry; receives the actor's material
    Primary,

    /// Synthesized ground decal; receives the actor's material
    Decal,

    /// Prop attachment point
    PropAnchor,

    /// Skeleton; bones are listed with normalized names
    Armature { bones: Vec<String> },

    /// Empty transform placeholder
    Empty,
}

/// A node created during resolution.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneNode {
    pub handle: NodeHandle,
    pub name: String,
    #[serde(flatten)]
    pub role: NodeRole,
}

impl SceneNode {
    pub fn is_anchor(&self) -> bool {
        matches!(self.role, NodeRole::PropAnchor)
    }

    /// Nodes that get the variant material assigned.
    pub fn receives_material(&self) -> bool {
        matches!(self.role, NodeRole::Primary | NodeRole::Decal)
    }

    /// Nodes that can become the root object of descendant props.
    pub fn is_root_candidate(&self) -> bool {
        self.receives_material()
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            handle: self.handle,
            name: self.name.clone(),
        }
    }

    /// Attachment anchors this node provides: itself for prop anchors, its
    /// `prop_` bones for armatures.
    pub fn anchors(&self) -> Vec<Anchor> {
        match &self.role {
            NodeRole::PropAnchor => vec![Anchor::Node(self.node_ref())],
            NodeRole::Armature { bones } => bones
                .iter()
                .filter(|bone| is_prop_name(bone))
                .map(|bone| Anchor::Bone {
                    armature: self.node_ref(),
                    bone: bone.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A reference to a scene node by handle, with its name for matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    pub handle: NodeHandle,
    pub name: String,
}

/// A scene node or armature bone that other nodes can be bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anchor {
    Node(NodeRef),
    Bone { armature: NodeRef, bone: String },
}

impl Anchor {
    /// Name used for attachpoint matching.
    pub fn name(&self) -> &str {
        match self {
            Anchor::Node(node) => &node.name,
            Anchor::Bone { bone, .. } => bone,
        }
    }

    pub fn is_bone(&self) -> bool {
        matches!(self, Anchor::Bone { .. })
    }
}

/// Attachment state handed from a parent actor to one of its props.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttachmentContext {
    /// Attachpoint requested by the parent's prop entry
    pub attachpoint: String,

    /// Anchors offered by the parent, in priority order
    pub candidates: Vec<Anchor>,

    /// Root object of the parent
    pub root: Option<Anchor>,

    /// Prop nesting depth, 0 for the top-level actor
    pub depth: i32,
}

impl AttachmentContext {
    /// Attachpoint name that binds to the parent's root object.
    pub const ROOT: &'static str = "root";

    /// Context of a top-level actor: nothing to attach to.
    pub fn top_level() -> Self {
        Self {
            attachpoint: Self::ROOT.to_string(),
            ..Default::default()
        }
    }

    /// True when there is nothing a node could be bound to.
    pub fn is_detached(&self) -> bool {
        self.root.is_none() && self.candidates.is_empty()
    }

    /// The anchor new nodes should follow.
    ///
    /// `root` binds to the root object when one exists. Otherwise the first
    /// candidate whose name contains the attachpoint wins.
    pub fn target(&self) -> Option<&Anchor> {
        if self.attachpoint == Self::ROOT {
            if let Some(root) = &self.root {
                return Some(root);
            }
        }

        self.candidates
            .iter()
            .find(|anchor| anchor.name().contains(self.attachpoint.as_str()))
    }
}
