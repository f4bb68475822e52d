//! Cross-module properties of path access and override resolution.

use serde_json::{Value, json};

use crate::defaults::DEFAULT_SETTINGS;
use crate::{ConfigTree, OverrideResolver, OverrideTree};

#[test]
fn scalar_paths_read_back_what_was_written() {
    let cases = [
        ("plex.enabled", json!(true)),
        ("plex.url", json!("http://plex.local:32400")),
        ("clients.lg_tv.mac", json!("00:11:22:AA:BB:CC")),
        ("features.timezone", json!("Europe/Berlin")),
        ("brand.new.nested.key", json!("value")),
    ];
    for (path, value) in cases {
        let mut tree = DEFAULT_SETTINGS.clone();
        tree.set(path, value.clone()).unwrap();
        assert_eq!(tree.get(path), Some(value), "{path}");
    }
}

#[test]
fn list_paths_trim_and_drop_blanks_but_keep_duplicates() {
    for path in ["features.poster_users.plex", "features.poster_users.jellyfin"] {
        let mut tree = ConfigTree::new();
        tree.set(path, json!("a, b ,b,")).unwrap();
        assert_eq!(tree.get(path), Some(json!("a,b,b")));
        assert_eq!(
            tree.as_map()["features"]["poster_users"][path.rsplit('.').next().unwrap()],
            json!(["a", "b", "b"])
        );
    }
}

#[test]
fn list_round_trip_is_stable() {
    let mut tree = ConfigTree::new();
    tree.set("plex.movie_libraries", json!(" Movies ,,4K Movies")).unwrap();
    let rendered = tree.get("plex.movie_libraries").unwrap();
    assert_eq!(rendered, json!("Movies,4K Movies"));

    let mut again = ConfigTree::new();
    again.set("plex.movie_libraries", rendered.clone()).unwrap();
    assert_eq!(again.get("plex.movie_libraries"), Some(rendered));
}

#[test]
fn trakt_credentials_pin_the_toggle() {
    let overrides = OverrideTree::from_value(json!({
        "trakt": {
            "client_id": "x",
            "client_secret": "y",
            "access_token": "z",
            "refresh_token": "w"
        }
    }))
    .unwrap();
    let config = DEFAULT_SETTINGS.clone();
    let resolver = OverrideResolver::new(&config, &overrides);
    let resolution = resolver.resolve("trakt.enabled");
    assert!(resolution.env_enabled);
    assert!(resolution.overridden);
    assert_eq!(resolver.effective("trakt.enabled"), Some(Value::Bool(true)));
}
