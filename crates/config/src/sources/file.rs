//! JSON and YAML file sources.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::flatten_json;
use crate::error::ConfigError;

/// Supported structured file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

/// Load and flatten a configuration file.
///
/// Returns `Ok(None)` when `optional` is set and the file does not exist.
pub fn load_file(
    path: &Path,
    format: FileFormat,
    optional: bool,
) -> Result<Option<BTreeMap<String, String>>, ConfigError> {
    if optional && !path.exists() {
        debug!(path = %path.display(), "Optional config file not found, skipping");
        return Ok(None);
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let document = parse_document(&text, format).map_err(|message| ConfigError::FileParse {
        path: path.to_path_buf(),
        message,
    })?;

    let mut entries = BTreeMap::new();
    flatten_json("", &document, &mut entries);
    debug!(path = %path.display(), keys = entries.len(), "Loaded config file");
    Ok(Some(entries))
}

fn parse_document(text: &str, format: FileFormat) -> Result<Value, String> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    match format {
        FileFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        FileFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    }
}
