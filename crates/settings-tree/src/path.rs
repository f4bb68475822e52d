//! Dotted-path access over a settings tree.
//!
//! Paths address nested object keys, e.g. `plex.movie_libraries`. List
//! leaves are exposed at the edit boundary as one comma-delimited string and
//! stored internally as an ordered sequence of strings. The conversion is
//! driven by [`LIST_SEGMENTS`]; a path is list-valued when any of its
//! segments is declared there.

use serde_json::{Map, Value};

use crate::{Result, TreeError};

/// Path segments whose leaves hold ordered lists of strings.
pub const LIST_SEGMENTS: &[&str] = &["poster_users", "movie_libraries"];

/// Separator used when a list leaf is rendered as text.
pub const LIST_DELIMITER: char = ',';

/// Split a dotted path, rejecting empty paths and empty segments.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(TreeError::EmptyPath);
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(TreeError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

/// Whether the leaf at `path` is declared list-valued.
pub fn is_list_path(path: &str) -> bool {
    path.split('.').any(|segment| LIST_SEGMENTS.contains(&segment))
}

/// Split delimited text into trimmed, non-empty entries. Order and
/// duplicates are preserved.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Render a list leaf as delimited text.
pub fn join_list(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(&LIST_DELIMITER.to_string())
}

/// Convert a textual value into the stored list form when `path` is
/// list-valued. Every other value passes through untouched.
pub fn coerce_for_path(path: &str, value: Value) -> Value {
    match value {
        Value::String(raw) if is_list_path(path) => {
            Value::Array(split_list(&raw).into_iter().map(Value::String).collect())
        }
        other => other,
    }
}

/// Borrow the raw node at `path`. Absent or null nodes yield `None`.
pub(crate) fn lookup<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut node = root.get(parts.next()?)?;
    for part in parts {
        node = node.as_object()?.get(part)?;
    }
    if node.is_null() { None } else { Some(node) }
}

/// Read the value at `path`, joining list leaves into delimited text.
pub fn get(root: &Map<String, Value>, path: &str) -> Option<Value> {
    lookup(root, path).map(|node| match node {
        Value::Array(items) => Value::String(join_list(items)),
        other => other.clone(),
    })
}

/// Check that `path` can be written: every existing intermediate along it
/// must be an object or null.
pub fn check_writable(root: &Map<String, Value>, path: &str) -> Result<()> {
    let parts = segments(path)?;
    let (_, parents) = parts.split_last().ok_or(TreeError::EmptyPath)?;

    let mut node = Some(root);
    for part in parents {
        match node.and_then(|n| n.get(*part)) {
            None | Some(Value::Null) => node = None,
            Some(Value::Object(child)) => node = Some(child),
            Some(_) => {
                return Err(TreeError::NotAnObject {
                    path: path.to_string(),
                    segment: (*part).to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Null intermediates are replaced by objects; any other non-object
/// intermediate is an error and leaves the tree untouched.
pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    check_writable(root, path)?;
    let parts = segments(path)?;
    let (leaf, parents) = parts.split_last().ok_or(TreeError::EmptyPath)?;

    let value = coerce_for_path(path, value);
    let mut node = root;
    for part in parents {
        let entry = node
            .entry((*part).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        node = entry.as_object_mut().ok_or_else(|| TreeError::NotAnObject {
            path: path.to_string(),
            segment: (*part).to_string(),
        })?;
    }
    node.insert((*leaf).to_string(), value);
    Ok(())
}

/// Build the minimal nested object holding `value` under `segments`.
///
/// `nest(&["a", "b"], v)` yields `{"a": {"b": v}}`.
pub fn nest(segments: &[&str], value: Value) -> Value {
    segments.iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert((*segment).to_string(), inner);
        Value::Object(map)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_get_missing_intermediate_is_none() {
        let root = tree(json!({"plex": null}));
        assert_eq!(get(&root, "plex.url"), None);
        assert_eq!(get(&root, "jellyfin.url"), None);
    }

    #[test]
    fn test_get_joins_lists() {
        let root = tree(json!({"plex": {"movie_libraries": ["Movies", "4K"]}}));
        assert_eq!(get(&root, "plex.movie_libraries"), Some(json!("Movies,4K")));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut root = Map::new();
        set(&mut root, "clients.lg_tv.ip", json!("10.0.0.2")).unwrap();
        assert_eq!(Value::Object(root), json!({"clients": {"lg_tv": {"ip": "10.0.0.2"}}}));
    }

    #[test]
    fn test_set_through_scalar_fails_without_mutation() {
        let mut root = tree(json!({"plex": "oops"}));
        let before = root.clone();
        let err = set(&mut root, "plex.url", json!("x")).unwrap_err();
        assert!(matches!(err, TreeError::NotAnObject { .. }));
        assert_eq!(root, before);
    }

    #[test]
    fn test_check_writable_through_null_and_missing() {
        let root = tree(json!({"plex": null, "jellyfin": {"url": "x"}}));
        assert!(check_writable(&root, "plex.url").is_ok());
        assert!(check_writable(&root, "clients.lg_tv.ip").is_ok());
        assert!(check_writable(&root, "jellyfin.url.host").is_err());
    }

    #[test]
    fn test_rejects_empty_segments() {
        let mut root = Map::new();
        assert_eq!(set(&mut root, "", json!(1)), Err(TreeError::EmptyPath));
        assert!(matches!(
            set(&mut root, "plex..url", json!(1)),
            Err(TreeError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_list_coercion_only_on_declared_paths() {
        assert_eq!(
            coerce_for_path("features.poster_users.plex", json!(" a, ,b ")),
            json!(["a", "b"])
        );
        assert_eq!(coerce_for_path("plex.url", json!("a,b")), json!("a,b"));
        assert_eq!(
            coerce_for_path("features.poster_users.plex", json!(["x"])),
            json!(["x"])
        );
    }

    #[test]
    fn test_nest_builds_minimal_object() {
        assert_eq!(nest(&["apple_tv", "id"], json!("abc")), json!({"apple_tv": {"id": "abc"}}));
        assert_eq!(nest(&[], json!(true)), json!(true));
    }
}
