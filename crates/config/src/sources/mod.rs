//! Configuration sources that feed layers into a [`ConfigurationTree`].
//!
//! Responsibilities:
//! - Read environment variables, JSON/YAML files, and Cloud Foundry `VCAP_*` metadata.
//! - Flatten structured documents into `:`-delimited keys.
//!
//! Does NOT handle:
//! - Layer ordering (see `loader`).
//! - Placeholder substitution (see `placeholder.rs`).
//!
//! Invariants:
//! - Arrays flatten by index (`a:0:b`); `null` flattens to an empty string.
//!
//! [`ConfigurationTree`]: crate::tree::ConfigurationTree

pub mod cloud_foundry;
pub mod env;
pub mod file;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::tree::join_key;

/// Flatten a JSON document into `prefix`-rooted keys.
pub fn flatten_json(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_json(&join_key(prefix, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_json(&join_key(prefix, &index.to_string()), child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        Value::Bool(_) | Value::Number(_) => {
            out.insert(prefix.to_string(), value.to_string());
        }
    }
}
