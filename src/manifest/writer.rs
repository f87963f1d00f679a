//! package.json edits and write-back
//!
//! This module provides:
//! - Peer dependency merge into `dependencies` without overwriting
//! - Version rewrites that keep the declared range prefix
//! - Serialization with 2-space indentation and original key order

use crate::domain::{DependencyGroup, MissingPeers, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::ManifestDocument;
use serde_json::{Map, Value};
use std::fs;

impl ManifestDocument {
    /// Add peers to `dependencies`; existing entries are never overwritten
    ///
    /// Returns the peers actually added, in name order.
    pub fn merge_peers(&mut self, peers: &MissingPeers) -> Vec<(String, String)> {
        if peers.is_empty() {
            return Vec::new();
        }

        let key = DependencyGroup::Production.key();
        let slot = self
            .root
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Some(dependencies) = slot.as_object_mut() else {
            return Vec::new();
        };

        let mut added = Vec::new();
        for (name, spec) in peers {
            if dependencies.contains_key(name) {
                continue;
            }
            dependencies.insert(name.clone(), Value::String(spec.clone()));
            added.push((name.clone(), spec.clone()));
        }
        added
    }

    /// Rewrite a package's version in every group that declares it
    ///
    /// The range prefix of each old value is kept. Returns the groups that
    /// were changed; nothing is modified if any value has an unsupported range.
    pub fn set_version(
        &mut self,
        package: &str,
        new_version: &str,
    ) -> Result<Vec<DependencyGroup>, ManifestError> {
        let mut planned = Vec::new();
        for group in DependencyGroup::all() {
            let Some(old) = self.group(*group).and_then(|g| g.get(package)) else {
                continue;
            };
            let raw = old.as_str().unwrap_or_default();
            let spec = VersionSpec::parse(raw)
                .ok_or_else(|| ManifestError::unsupported_range(package, raw))?;
            planned.push((*group, spec.format_updated(new_version)));
        }

        for (group, updated) in &planned {
            if let Some(entries) = self
                .root
                .get_mut(group.key())
                .and_then(Value::as_object_mut)
            {
                entries.insert(package.to_string(), Value::String(updated.clone()));
            }
        }
        Ok(planned.into_iter().map(|(group, _)| group).collect())
    }

    /// Serialize with 2-space indentation, keeping a trailing newline if the file had one
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        let mut text = serde_json::to_string_pretty(&self.root)
            .map_err(|e| ManifestError::json_parse_error(&self.path, e.to_string()))?;
        if self.trailing_newline {
            text.push('\n');
        }
        Ok(text)
    }

    /// Write the document back to the path it was loaded from
    pub fn save(&self) -> Result<(), ManifestError> {
        let text = self.to_json_string()?;
        fs::write(&self.path, text).map_err(|e| ManifestError::write_error(&self.path, e))
    }
}
