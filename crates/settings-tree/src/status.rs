//! Integration readiness checks.

use serde::Serialize;
use serde_json::Value;

use crate::{ConfigTree, OverrideResolver, OverrideTree};

/// Fields an enabled integration needs before it can be used.
struct Requirement {
    toggle: &'static str,
    required: &'static [&'static str],
}

const REQUIREMENTS: &[Requirement] = &[
    Requirement {
        toggle: "plex.enabled",
        required: &["plex.url", "plex.token"],
    },
    Requirement {
        toggle: "jellyfin.enabled",
        required: &["jellyfin.url", "jellyfin.api_key", "jellyfin.user_id"],
    },
    Requirement {
        toggle: "overseerr.enabled",
        required: &["overseerr.url", "overseerr.api_key"],
    },
    Requirement {
        toggle: "trakt.enabled",
        required: &[
            "trakt.client_id",
            "trakt.client_secret",
            "trakt.access_token",
            "trakt.refresh_token",
        ],
    },
    Requirement {
        toggle: "clients.apple_tv.enabled",
        required: &["clients.apple_tv.id"],
    },
    Requirement {
        toggle: "clients.lg_tv.enabled",
        required: &["clients.lg_tv.ip", "clients.lg_tv.mac"],
    },
];

/// Readiness report for the configured integrations. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub missing_settings: Vec<String>,
    pub warnings: Vec<String>,
}

impl FeatureStatus {
    /// Check which enabled integrations are missing required fields.
    pub fn check(config: &ConfigTree, overrides: &OverrideTree) -> Self {
        let resolver = OverrideResolver::new(config, overrides);
        let mut status = Self::default();

        for requirement in REQUIREMENTS {
            if !is_on(resolver.effective(requirement.toggle)) {
                continue;
            }
            for path in requirement.required {
                // Pinned values come from the environment, not the tree.
                if overrides.is_set(path) {
                    continue;
                }
                if is_blank(config.get(path)) {
                    status.missing_settings.push((*path).to_string());
                }
            }
        }

        if !is_on(resolver.effective("plex.enabled"))
            && !is_on(resolver.effective("jellyfin.enabled"))
        {
            status.warnings.push("No media server is enabled".into());
        }
        if is_on(config.get("tmdb.enabled")) && is_blank(config.get("tmdb.api_key")) {
            status
                .warnings
                .push("TMDB is enabled without an API key; the built-in key is used".into());
        }

        status
    }

    pub fn is_ready(&self) -> bool {
        self.missing_settings.is_empty()
    }
}

fn is_on(value: Option<Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn is_blank(value: Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_enabled_integration_reports_missing_fields() {
        let config = ConfigTree::from_value(json!({
            "plex": {"enabled": true, "url": "http://plex:32400", "token": ""},
            "jellyfin": {"enabled": false}
        }))
        .unwrap();
        let status = FeatureStatus::check(&config, &OverrideTree::new());
        assert_eq!(status.missing_settings, vec!["plex.token".to_string()]);
        assert!(status.warnings.is_empty());
        assert!(!status.is_ready());
    }

    #[test]
    fn test_pinned_fields_are_not_missing() {
        let config = ConfigTree::from_value(json!({"trakt": {"enabled": false}})).unwrap();
        let overrides = OverrideTree::from_value(json!({
            "trakt": {
                "client_id": true,
                "client_secret": true,
                "access_token": true,
                "refresh_token": true
            }
        }))
        .unwrap();
        let status = FeatureStatus::check(&config, &overrides);
        assert!(status.is_ready());
        assert_eq!(status.warnings, vec!["No media server is enabled".to_string()]);
    }
}
