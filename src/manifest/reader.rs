//! package.json loading
//!
//! Reads `dependencies` then `devDependencies` into one flat set; a name
//! declared in both groups takes its version from `devDependencies`.

use crate::domain::{Dependency, DependencyGroup, DependencySet};
use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed package.json held in memory for reading and editing
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub(super) path: PathBuf,
    pub(super) root: Map<String, Value>,
    pub(super) trailing_newline: bool,
}

impl ManifestDocument {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
        Self::parse(path, &content)
    }

    /// Parse manifest content; `path` is used for error context and saving
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, ManifestError> {
        let path = path.into();
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(&path, e.to_string()))?;

        match value {
            Value::Object(root) => Ok(Self {
                path,
                root,
                trailing_newline: content.ends_with('\n'),
            }),
            _ => Err(ManifestError::NotAnObject { path }),
        }
    }

    /// Entries of one dependency group, if the group is an object
    pub fn group(&self, group: DependencyGroup) -> Option<&Map<String, Value>> {
        self.root.get(group.key()).and_then(Value::as_object)
    }

    /// Flatten both dependency groups into one set
    ///
    /// Values that are not strings are kept with an empty declared version so
    /// the caller can report them.
    pub fn dependencies(&self) -> DependencySet {
        let mut set = DependencySet::new();
        for group in DependencyGroup::all() {
            let Some(entries) = self.group(*group) else {
                continue;
            };
            for (name, value) in entries {
                let declared = value.as_str().unwrap_or_default();
                set.insert(Dependency::new(name, declared, *group));
            }
        }
        set
    }
}

/// Read the flat dependency set from a manifest file
pub fn read_manifest(path: &Path) -> Result<DependencySet, ManifestError> {
    Ok(ManifestDocument::load(path)?.dependencies())
}
