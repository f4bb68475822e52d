//! Environment override resolution.
//!
//! A plain setting is pinned when its own path is set in the
//! [`OverrideTree`]. An integration toggle is pinned only when every member
//! of its [`OverrideGroup`] is set; partial presence pins the individual
//! members but leaves the toggle editable.

use serde::Serialize;
use serde_json::Value;

use crate::{ConfigTree, OverrideTree};

/// A toggle whose environment pinning depends on a set of sibling paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideGroup {
    pub toggle: &'static str,
    pub members: &'static [&'static str],
}

/// Composite override rules, one per integration toggle.
pub const OVERRIDE_GROUPS: &[OverrideGroup] = &[
    OverrideGroup {
        toggle: "plex.enabled",
        members: &["plex.url", "plex.token", "plex.movie_libraries"],
    },
    OverrideGroup {
        toggle: "jellyfin.enabled",
        members: &["jellyfin.url", "jellyfin.api_key", "jellyfin.user_id"],
    },
    OverrideGroup {
        toggle: "clients.apple_tv.enabled",
        members: &["clients.apple_tv.id"],
    },
    OverrideGroup {
        toggle: "clients.lg_tv.enabled",
        members: &["clients.lg_tv.ip", "clients.lg_tv.mac"],
    },
    OverrideGroup {
        toggle: "overseerr.enabled",
        members: &["overseerr.url", "overseerr.api_key"],
    },
    OverrideGroup {
        toggle: "trakt.enabled",
        members: &[
            "trakt.client_id",
            "trakt.client_secret",
            "trakt.access_token",
            "trakt.refresh_token",
        ],
    },
];

impl OverrideGroup {
    /// Look up the composite rule governing `toggle`, if any.
    pub fn for_toggle(toggle: &str) -> Option<&'static OverrideGroup> {
        OVERRIDE_GROUPS.iter().find(|group| group.toggle == toggle)
    }

    /// Whether every member path is pinned.
    pub fn is_satisfied(&self, overrides: &OverrideTree) -> bool {
        self.members.iter().all(|member| overrides.is_set(member))
    }
}

/// Outcome of resolving one path against the override tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideResolution {
    /// The setting is fixed by the environment and must render read-only.
    pub overridden: bool,
    /// For toggles: the composite rule fired, so the toggle renders on.
    pub env_enabled: bool,
}

/// Read-only view pairing a configuration tree with its overrides.
#[derive(Debug, Clone, Copy)]
pub struct OverrideResolver<'a> {
    config: &'a ConfigTree,
    overrides: &'a OverrideTree,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(config: &'a ConfigTree, overrides: &'a OverrideTree) -> Self {
        Self { config, overrides }
    }

    /// Decide whether `path` is environment-pinned.
    pub fn resolve(&self, path: &str) -> OverrideResolution {
        match OverrideGroup::for_toggle(path) {
            Some(group) => {
                let env_enabled = group.is_satisfied(self.overrides);
                OverrideResolution {
                    overridden: env_enabled || self.overrides.is_set(path),
                    env_enabled,
                }
            }
            None => OverrideResolution {
                overridden: self.overrides.is_set(path),
                env_enabled: false,
            },
        }
    }

    /// The value a form should display for `path`.
    ///
    /// A toggle whose composite rule fired reads as `true` regardless of the
    /// stored value.
    pub fn effective(&self, path: &str) -> Option<Value> {
        if self.resolve(path).env_enabled {
            return Some(Value::Bool(true));
        }
        self.config.get(path)
    }
}
