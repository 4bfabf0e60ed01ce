//! Manifest (`project.toml`) parsing and mutation.
//!
//! The manifest declares what the project wants: package identity, opaque
//! user scripts, and the dependency map. Dependency keys are unique names;
//! each entry records the canonical source string and the file's
//! forward-slash path relative to the project root.
//!
//! ```toml
//! [package]
//! name = "my-game"
//! version = "0.1.0"
//!
//! [scripts]
//! run = "love ."
//!
//! [dependencies.inspect]
//! source = "github:kikito/inspect.lua/inspect.lua@v3.1.1"
//! path = "src/lib/inspect.lua"
//! ```
//!
//! Maps are [`BTreeMap`]s so serialization is deterministic; iteration
//! order carries no meaning beyond that.

mod io;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use io::MANIFEST_FILE;

/// The `[package]` section: project identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Canonical source string (`github:owner/repo/path@ref`), or the
    /// original input when no canonical form could be derived.
    pub source: String,
    /// Forward-slash path of the installed file relative to the project
    /// root.
    pub path: String,
}

/// The complete `project.toml` document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub package: PackageMeta,

    /// User-defined script commands; opaque to almd.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, Dependency>,
}

impl Manifest {
    /// A fresh manifest with the given package name.
    ///
    /// # Examples
    ///
    /// ```
    /// use almd::manifest::Manifest;
    ///
    /// let mut manifest = Manifest::new("my-game");
    /// assert_eq!(manifest.package.version, "0.1.0");
    ///
    /// manifest.upsert_dependency(
    ///     "json",
    ///     "github:rxi/json.lua/json.lua@v0.1.2".to_string(),
    ///     "src/lib/json.lua".to_string(),
    /// );
    /// assert!(manifest.dependencies.contains_key("json"));
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            package: PackageMeta {
                name: name.into(),
                version: "0.1.0".to_string(),
                license: None,
                description: None,
            },
            scripts: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Insert or replace a dependency entry.
    pub fn upsert_dependency(&mut self, name: &str, source: String, path: String) {
        self.dependencies
            .insert(name.to_string(), Dependency { source, path });
    }

    /// Remove a dependency entry, returning it if present.
    pub fn remove_dependency(&mut self, name: &str) -> Option<Dependency> {
        self.dependencies.remove(name)
    }

    /// Pairs of dependency names that declare the same destination path.
    ///
    /// The manifest format cannot forbid this, and intent is ambiguous, so
    /// reconciliation reports these as warnings rather than guessing.
    #[must_use]
    pub fn duplicate_paths(&self) -> Vec<(String, String, String)> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        let mut duplicates = Vec::new();
        for (name, dep) in &self.dependencies {
            if let Some(first) = seen.get(dep.path.as_str()) {
                duplicates.push(((*first).to_string(), name.clone(), dep.path.clone()));
            } else {
                seen.insert(dep.path.as_str(), name.as_str());
            }
        }
        duplicates
    }
}
