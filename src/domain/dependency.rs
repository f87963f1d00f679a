//! Dependency records read from package.json

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency group in package.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyGroup {
    /// `dependencies`
    #[serde(rename = "dependencies")]
    Production,
    /// `devDependencies`
    #[serde(rename = "devDependencies")]
    Development,
}

impl DependencyGroup {
    /// Groups in the order they are read; later groups win on name collision
    pub fn all() -> &'static [DependencyGroup] {
        &[DependencyGroup::Production, DependencyGroup::Development]
    }

    /// The JSON key for this group
    pub fn key(&self) -> &'static str {
        match self {
            DependencyGroup::Production => "dependencies",
            DependencyGroup::Development => "devDependencies",
        }
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One declared dependency: `{name, declaredVersion}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Declared version string exactly as written (may carry `^`/`~`)
    pub declared_version: String,
    /// The group the declared version was taken from
    pub group: DependencyGroup,
}

impl Dependency {
    /// Creates a new dependency record
    pub fn new(
        name: impl Into<String>,
        declared_version: impl Into<String>,
        group: DependencyGroup,
    ) -> Self {
        Self {
            name: name.into(),
            declared_version: declared_version.into(),
            group,
        }
    }
}

/// Flat name -> declared-version mapping across dependency groups
///
/// Preserves manifest order; one record per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    entries: Vec<Dependency>,
}

impl DependencySet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dependency, replacing the declared version of an existing name in place
    pub fn insert(&mut self, dependency: Dependency) {
        match self.entries.iter_mut().find(|d| d.name == dependency.name) {
            Some(existing) => *existing = dependency,
            None => self.entries.push(dependency),
        }
    }

    /// Look up a dependency by name
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.entries.iter().find(|d| d.name == name)
    }

    /// Returns true if the manifest declares `name` in any group
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    /// Number of distinct dependency names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no dependencies are declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
