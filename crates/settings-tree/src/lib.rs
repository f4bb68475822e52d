//! Hierarchical application settings.
//!
//! Provides the nested configuration tree, dotted-path access with list
//! coercion, environment override resolution, the default settings tree,
//! and integration readiness checks. This crate performs no I/O.

pub mod defaults;
pub mod overrides;
pub mod path;
pub mod status;
mod tree;

#[cfg(test)]
mod tests;

pub use overrides::{OVERRIDE_GROUPS, OverrideGroup, OverrideResolution, OverrideResolver};
pub use path::{LIST_SEGMENTS, coerce_for_path, is_list_path, split_list};
pub use status::FeatureStatus;
pub use tree::{ConfigTree, OverrideTree};

/// Errors raised while addressing or mutating a settings tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("settings path is empty")]
    EmptyPath,

    #[error("settings path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("'{segment}' in '{path}' is not an object")]
    NotAnObject { path: String, segment: String },

    #[error("settings root must be a JSON object")]
    NotATree,
}

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
