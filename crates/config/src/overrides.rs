//! Override file loading
//!
//! The override file is a two-level document: top-level keys are groups,
//! each mapping sub-keys to values.
//!
//! ```yaml
//! mysql:
//!   root_user: root
//!   root_pass: secret
//! ```
//!
//! Every pair is exposed as a setting named `{group}_{subkey}`, so the
//! example above yields `mysql_root_user` and `mysql_root_pass`. A group may
//! also be written as a list of single-entry mappings (`- root_user: root`).

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use velcro_core::{Error, Result};

/// Parsed override document: group name to sub-key/value pairs
pub type OverrideDocument = IndexMap<String, IndexMap<String, JsonValue>>;

/// Format of an override file, chosen from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideFormat {
    /// `.yml` / `.yaml` (and anything without a known extension)
    Yaml,
    /// `.toml`
    Toml,
}

impl OverrideFormat {
    /// Pick the format for a path
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Load an override document from disk
///
/// A missing file is not an error and yields an empty document. A file
/// that exists but cannot be read or parsed is an [`Error::OverrideLoad`].
pub fn load(path: &Path) -> Result<OverrideDocument> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No override file at {}", path.display());
            return Ok(OverrideDocument::new());
        }
        Err(e) => {
            return Err(Error::OverrideLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let document = parse(&content, OverrideFormat::from_path(path)).map_err(|message| {
        Error::OverrideLoad {
            path: path.to_path_buf(),
            message,
        }
    })?;

    tracing::debug!(
        groups = document.len(),
        "Loaded overrides from {}",
        path.display()
    );
    Ok(document)
}

/// Parse override document text
///
/// Errors are returned as plain messages; [`load`] attaches the path.
pub fn parse(content: &str, format: OverrideFormat) -> std::result::Result<OverrideDocument, String> {
    let root: JsonValue = match format {
        OverrideFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        OverrideFormat::Toml => {
            let value: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
            serde_json::to_value(value).map_err(|e| e.to_string())?
        }
    };

    let groups = match root {
        // An empty YAML file parses as null
        JsonValue::Null => return Ok(OverrideDocument::new()),
        JsonValue::Object(groups) => groups,
        other => {
            return Err(format!(
                "top level must be a mapping of groups, found {}",
                velcro_core::value::kind(&other)
            ));
        }
    };

    let mut document = OverrideDocument::new();
    for (group, body) in groups {
        let entries = group_entries(&group, body)?;
        document.insert(group, entries);
    }
    Ok(document)
}

fn group_entries(
    group: &str,
    body: JsonValue,
) -> std::result::Result<IndexMap<String, JsonValue>, String> {
    match body {
        JsonValue::Null => Ok(IndexMap::new()),
        JsonValue::Object(map) => Ok(map.into_iter().collect()),
        JsonValue::Array(items) => {
            let mut entries = IndexMap::new();
            for item in items {
                match item {
                    JsonValue::Object(map) => entries.extend(map),
                    other => {
                        return Err(format!(
                            "group '{group}' lists a {} where a mapping was expected",
                            velcro_core::value::kind(&other)
                        ));
                    }
                }
            }
            Ok(entries)
        }
        other => Err(format!(
            "group '{group}' must be a mapping, found {}",
            velcro_core::value::kind(&other)
        )),
    }
}

/// Flatten a document into `{group}_{subkey}` setting names
pub fn flatten(document: &OverrideDocument) -> IndexMap<String, JsonValue> {
    document
        .iter()
        .flat_map(|(group, entries)| {
            entries
                .iter()
                .map(move |(key, value)| (format!("{group}_{key}"), value.clone()))
        })
        .collect()
}
