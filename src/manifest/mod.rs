//! Manifest parsing
//!
//! This module provides functionality to:
//! - Parse declared dependencies from manifests (package.json, Gemfile)
//! - Derive the declared name sets the lockfile filter needs
//!
//! Manifests only tell which names a project asks for, and in which scope.
//! Pinned versions come from the lockfile.

mod gemfile;
mod package_json;

pub use gemfile::GemfileParser;
pub use package_json::PackageJsonParser;

use crate::domain::{Dependency, Ecosystem, Scope};
use crate::error::ManifestError;
use std::collections::BTreeSet;

/// Trait for parsing manifest files
pub trait ManifestParser {
    /// Parse declared dependencies from a manifest file
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;

    /// Returns the manifest file name this parser reads
    fn file_name(&self) -> &'static str;
}

/// Get a manifest parser for a manifest file name
pub fn get_parser(file_name: &str) -> Option<Box<dyn ManifestParser>> {
    match file_name {
        "package.json" => Some(Box::new(PackageJsonParser)),
        "Gemfile" => Some(Box::new(GemfileParser)),
        _ => None,
    }
}

/// Names a manifest declares, grouped by scope category
///
/// Any name in any of the sets is a direct dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestNameSets {
    pub prod: BTreeSet<String>,
    pub dev: BTreeSet<String>,
    pub peer: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

impl ManifestNameSets {
    /// Creates empty name sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a production name (builder pattern)
    pub fn with_prod(mut self, name: impl Into<String>) -> Self {
        self.prod.insert(name.into());
        self
    }

    /// Adds a development name (builder pattern)
    pub fn with_dev(mut self, name: impl Into<String>) -> Self {
        self.dev.insert(name.into());
        self
    }

    /// Adds a peer name (builder pattern)
    pub fn with_peer(mut self, name: impl Into<String>) -> Self {
        self.peer.insert(name.into());
        self
    }

    /// Adds an optional name (builder pattern)
    pub fn with_optional(mut self, name: impl Into<String>) -> Self {
        self.optional.insert(name.into());
        self
    }

    /// Builds the name sets from declared dependencies
    ///
    /// Scopes without a set of their own (system, import, build) count as prod.
    pub fn from_dependencies(dependencies: &[Dependency]) -> Self {
        let mut sets = Self::new();
        for dep in dependencies {
            let name = dep.name.clone();
            match dep.scope {
                Scope::Dev => sets.dev.insert(name),
                Scope::Peer => sets.peer.insert(name),
                Scope::Optional => sets.optional.insert(name),
                Scope::Prod | Scope::System | Scope::Import | Scope::Build => {
                    sets.prod.insert(name)
                }
            };
        }
        sets
    }

    /// Reads the name sets of a package.json
    pub fn from_package_json(content: &str) -> Result<Self, ManifestError> {
        PackageJsonParser
            .parse(content)
            .map(|deps| Self::from_dependencies(&deps))
    }

    /// Reads the name sets of a Gemfile
    pub fn from_gemfile(content: &str) -> Self {
        Self::from_dependencies(&GemfileParser::parse_content(content))
    }

    /// Reads the name sets of any supported manifest, selected by file name
    pub fn from_manifest(file_name: &str, content: &str) -> Result<Self, ManifestError> {
        let parser = get_parser(file_name).ok_or_else(|| ManifestError::UnsupportedFormat {
            path: file_name.into(),
        })?;
        parser
            .parse(content)
            .map(|deps| Self::from_dependencies(&deps))
    }

    /// Returns true if the manifest declares `name` in any scope
    pub fn contains(&self, name: &str) -> bool {
        self.prod.contains(name)
            || self.dev.contains(name)
            || self.peer.contains(name)
            || self.optional.contains(name)
    }

    /// Returns all declared names
    pub fn all_names(&self) -> BTreeSet<&str> {
        self.prod
            .iter()
            .chain(&self.dev)
            .chain(&self.peer)
            .chain(&self.optional)
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.prod.is_empty() && self.dev.is_empty() && self.peer.is_empty() && self.optional.is_empty()
    }
}
