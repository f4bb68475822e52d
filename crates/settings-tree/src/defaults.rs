//! Default values for every known setting.

use std::sync::LazyLock;

use serde_json::json;

use crate::ConfigTree;

/// The complete default settings tree. Loaded snapshots are merged over it
/// so every known key resolves.
pub static DEFAULT_SETTINGS: LazyLock<ConfigTree> = LazyLock::new(|| {
    let value = json!({
        "plex": {
            "enabled": false,
            "url": "",
            "token": "",
            "movie_libraries": []
        },
        "jellyfin": {
            "enabled": false,
            "url": "",
            "api_key": "",
            "user_id": ""
        },
        "clients": {
            "apple_tv": {
                "enabled": false,
                "id": ""
            },
            "lg_tv": {
                "enabled": false,
                "ip": "",
                "mac": ""
            }
        },
        "features": {
            "use_links": true,
            "use_filter": true,
            "use_watch_button": true,
            "use_next_button": true,
            "homepage_mode": false,
            "timezone": "UTC",
            "default_poster_text": "",
            "poster_users": {
                "plex": [],
                "jellyfin": []
            }
        },
        "overseerr": {
            "enabled": false,
            "url": "",
            "api_key": ""
        },
        "tmdb": {
            "enabled": false,
            "api_key": ""
        },
        "trakt": {
            "enabled": false,
            "client_id": "",
            "client_secret": "",
            "access_token": "",
            "refresh_token": ""
        }
    });
    ConfigTree::from_value(value).unwrap_or_default()
});

/// Get the default for `path`, or `None` if the key is unknown.
pub fn get_default(path: &str) -> Option<serde_json::Value> {
    DEFAULT_SETTINGS.get(path)
}
