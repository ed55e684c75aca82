//! Resolution errors and non-fatal diagnostics.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::descriptor::ParseError;
use crate::host::HostError;

/// Errors that abort the resolution of a descriptor branch.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("descriptor not found: {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed descriptor {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("cyclic inheritance at {}: {}", path.display(), format_chain(chain))]
    CyclicInheritance { path: PathBuf, chain: Vec<PathBuf> },

    #[error("cyclic prop reference at {}: {}", path.display(), format_chain(chain))]
    CyclicProp { path: PathBuf, chain: Vec<PathBuf> },

    #[error("host error: {0}")]
    Host(#[from] HostError),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Non-fatal conditions recorded during an import.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A node found no root object and no anchor matching its attachpoint.
    UnresolvedAttachment {
        node: String,
        attachpoint: String,
        root: Option<String>,
    },

    /// A prop subtree failed to resolve and was skipped.
    PropSkipped {
        actor: String,
        attachpoint: String,
        reason: String,
    },

    /// The mesh importer failed; the variant contributed no nodes.
    MeshImportFailed { path: PathBuf, reason: String },

    /// A texture image could not be loaded and was left out of its material.
    TextureSkipped { path: PathBuf, reason: String },
}
