use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path;
use crate::{Result, TreeError};

/// Nested application configuration addressed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(Map<String, Value>);

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; the root must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TreeError::NotATree),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Read the value at `path`; list leaves come back as delimited text.
    pub fn get(&self, path: &str) -> Option<Value> {
        path::get(&self.0, path)
    }

    /// Whether a write at `path` would succeed, without writing.
    pub fn check_writable(&self, path: &str) -> Result<()> {
        path::check_writable(&self.0, path)
    }

    /// Write `value` at `path`, applying list coercion for declared paths.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        path::set(&mut self.0, path, value)
    }

    /// Fill keys missing from this tree with values from `defaults`.
    ///
    /// Existing values always win; nested objects are merged key by key.
    pub fn merge_defaults(&mut self, defaults: &ConfigTree) {
        merge_missing(&mut self.0, &defaults.0);
    }
}

fn merge_missing(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        if matches!(target.get(key), None | Some(Value::Null)) {
            target.insert(key.clone(), default.clone());
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(default_map)) =
            (target.get_mut(key), default)
        {
            merge_missing(existing, default_map);
        }
    }
}

/// Tree parallel to [`ConfigTree`] whose truthy leaves mark settings pinned
/// by the deployment environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTree(Map<String, Value>);

impl OverrideTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TreeError::NotATree),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether `path` is present and truthy.
    pub fn is_set(&self, path: &str) -> bool {
        path::lookup(&self.0, path).is_some_and(is_truthy)
    }
}

/// JSON truthiness: `false`, `0`, `""` and `null` are falsy, everything else
/// (including empty objects and arrays) is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
