//! Manifest parser.
//!
//! Reads a YAML manifest into a [`ManifestDocument`] and runs the uniqueness
//! checks on every list in it, including nested `tools` and `sub_agents`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::entry::{ManifestDocument, ManifestEntry, ManifestKind};
use crate::utilities::errors::ConfigurationError;

/// What to do when the manifest file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingManifest {
    /// Treat a missing file as "nothing configured".
    Empty,
    /// A missing file is a configuration error.
    Fatal,
}

impl ManifestKind {
    /// Policy used when a registry does not choose one explicitly.
    pub fn default_missing_policy(self) -> MissingManifest {
        match self {
            ManifestKind::Agents => MissingManifest::Fatal,
            ManifestKind::Tools => MissingManifest::Empty,
        }
    }
}

/// Parser bound to one manifest path.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    path: PathBuf,
    kind: ManifestKind,
    missing: MissingManifest,
}

impl ManifestParser {
    /// Create a parser using the kind's default missing-file policy.
    pub fn new(path: impl Into<PathBuf>, kind: ManifestKind) -> Self {
        Self {
            path: path.into(),
            kind,
            missing: kind.default_missing_policy(),
        }
    }

    /// Builder method to override the missing-file policy.
    pub fn with_missing_policy(mut self, missing: MissingManifest) -> Self {
        self.missing = missing;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn missing_policy(&self) -> MissingManifest {
        self.missing
    }

    /// Read and validate the manifest.
    ///
    /// The file's existence is checked on every call so a reload sees files
    /// created after the parser was built.
    pub fn parse(&self) -> Result<ManifestDocument, ConfigurationError> {
        if !self.path.exists() {
            return match self.missing {
                MissingManifest::Empty => {
                    log::warn!(
                        "Configuration file not found: {}. {} registration will be skipped.",
                        self.path.display(),
                        self.kind
                    );
                    Ok(ManifestDocument::empty(self.kind))
                }
                MissingManifest::Fatal => Err(ConfigurationError::MissingFile {
                    path: self.path.clone(),
                }),
            };
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|source| ConfigurationError::Read {
                path: self.path.clone(),
                source,
            })?;
        let document = Self::parse_str(self.kind, &content)?;
        log::debug!(
            "Parsed {} with {} {} entries",
            self.path.display(),
            document.entries.len(),
            self.kind
        );
        Ok(document)
    }

    /// Parse and validate manifest text.
    pub fn parse_str(
        kind: ManifestKind,
        content: &str,
    ) -> Result<ManifestDocument, ConfigurationError> {
        if content.trim().is_empty() {
            return Err(ConfigurationError::Empty);
        }

        let root: Value = serde_yaml::from_str(content)?;
        let map = match root {
            Value::Null => return Err(ConfigurationError::Empty),
            Value::Mapping(map) => map,
            _ => return Err(ConfigurationError::NotAMapping),
        };
        if map.is_empty() {
            return Err(ConfigurationError::Empty);
        }

        let key = kind.key();
        let items = match map.get(key) {
            None => return Err(ConfigurationError::MissingKey { key }),
            Some(Value::Sequence(items)) => items.clone(),
            Some(_) => return Err(ConfigurationError::NotAList { key }),
        };

        let version = match map.get("version") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(ConfigurationError::InvalidSetting {
                    key: "version".to_string(),
                    message: format!("expected a string, got {:?}", other),
                })
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let entry: ManifestEntry =
                serde_yaml::from_value(item).map_err(|source| ConfigurationError::InvalidEntry {
                    list: key.to_string(),
                    index,
                    source,
                })?;
            entries.push(entry);
        }

        validate_list(key, &entries)?;

        Ok(ManifestDocument {
            version,
            kind,
            entries,
        })
    }
}

/// Run the uniqueness checks on one list, then recurse into nested lists.
pub(crate) fn validate_list(
    list: &str,
    entries: &[ManifestEntry],
) -> Result<(), ConfigurationError> {
    validate_duplicate_name_locator(list, entries)?;
    validate_duplicate_order(list, entries)?;

    for (index, entry) in entries.iter().enumerate() {
        if !entry.tools.is_empty() {
            validate_list(&format!("{}[{}].tools", list, index), &entry.tools)?;
        }
        if !entry.sub_agents.is_empty() {
            validate_list(&format!("{}[{}].sub_agents", list, index), &entry.sub_agents)?;
        }
    }
    Ok(())
}

/// `(name, module)` must be unique across the whole list, enabled or not.
fn validate_duplicate_name_locator(
    list: &str,
    entries: &[ManifestEntry],
) -> Result<(), ConfigurationError> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(key) = entry.agent_parts() else {
            continue;
        };
        if let Some(&first) = seen.get(&key) {
            return Err(ConfigurationError::DuplicateEntry {
                list: list.to_string(),
                name: key.0.to_string(),
                locator: key.1.to_string(),
                first,
                second: index,
            });
        }
        seen.insert(key, index);
    }
    Ok(())
}

/// `order` must be unique among enabled entries. Disabled entries and
/// entries without an order are exempt.
fn validate_duplicate_order(
    list: &str,
    entries: &[ManifestEntry],
) -> Result<(), ConfigurationError> {
    let mut seen: HashMap<i64, &str> = HashMap::new();
    for entry in entries.iter().filter(|e| e.enabled) {
        let Some(order) = entry.order else {
            continue;
        };
        if let Some(first) = seen.get(&order) {
            return Err(ConfigurationError::DuplicateOrder {
                list: list.to_string(),
                order,
                first: first.to_string(),
                second: entry.display_name().to_string(),
            });
        }
        seen.insert(order, entry.display_name());
    }
    Ok(())
}
