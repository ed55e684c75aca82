//! Import options.

use serde::{Deserialize, Serialize};

/// Depth limit meaning "no limit".
pub const UNLIMITED_DEPTH: i32 = -1;

/// Options for one import run.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration:
///
/// ```
/// use actorplan_core::ImportOptions;
///
/// let options = ImportOptions::from_json_str(r#"{ "import_depth": 2 }"#).unwrap();
/// assert!(options.import_props);
/// assert!(options.allows_depth(1));
/// assert!(!options.allows_depth(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Resolve props at all
    pub import_props: bool,

    /// Gather textures and build materials
    pub import_textures: bool,

    /// Prop nesting limit: `-1` unlimited, `0` no props, `N` stop at depth N
    pub import_depth: i32,

    /// Seed for variant selection; entropy when unset
    pub seed: Option<u64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_props: true,
            import_textures: true,
            import_depth: UNLIMITED_DEPTH,
            seed: None,
        }
    }
}

impl ImportOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// True if the props of an actor at `depth` should be resolved.
    pub fn allows_depth(&self, depth: i32) -> bool {
        self.import_props
            && (self.import_depth == UNLIMITED_DEPTH
                || (self.import_depth > 0 && depth < self.import_depth))
    }
}
