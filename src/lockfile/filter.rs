//! Dependency filter and scope resolution
//!
//! This module provides the DependencyFilter struct that turns raw lockfile
//! records into final dependency records:
//! - Bundled packages are skipped
//! - Scope comes from the manifest's declared sets, then from the record
//! - Undeclared packages are dropped unless transitive output is requested
//! - The first record per name wins

use super::{LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem, Scope};
use crate::manifest::ManifestNameSets;
use std::collections::HashSet;

/// Per-call filter built from the manifest's declared names
#[derive(Debug, Clone)]
pub struct DependencyFilter {
    ecosystem: Ecosystem,
    source_file: &'static str,
    names: ManifestNameSets,
    options: LockfileOptions,
    seen: HashSet<String>,
}

impl DependencyFilter {
    /// Create a new filter for one lockfile pass
    pub fn new(
        ecosystem: Ecosystem,
        source_file: &'static str,
        names: ManifestNameSets,
        options: LockfileOptions,
    ) -> Self {
        Self {
            ecosystem,
            source_file,
            names,
            options,
            seen: HashSet::new(),
        }
    }

    /// Declared names, including any merged in by the lockfile itself
    pub fn names(&self) -> &ManifestNameSets {
        &self.names
    }

    /// Returns true if the manifest declares `name`
    pub fn is_direct(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Resolves the scope of a raw record
    ///
    /// Priority is peer, optional, dev, prod. A record's own optional and dev
    /// flags count as declarations; the lockfile's stated scope is used when
    /// nothing else applies.
    pub fn scope_for(&self, raw: &RawPackage) -> Scope {
        let name = raw.name.as_str();
        if self.names.peer.contains(name) {
            Scope::Peer
        } else if self.names.optional.contains(name) || raw.optional {
            Scope::Optional
        } else if self.names.dev.contains(name) || raw.dev {
            Scope::Dev
        } else if self.names.prod.contains(name) {
            Scope::Prod
        } else {
            raw.scope.unwrap_or_default()
        }
    }

    /// Converts a raw record, or returns None when it is filtered out
    pub fn accept(&mut self, raw: RawPackage) -> Option<Dependency> {
        if raw.bundled {
            tracing::trace!("{}: skipping bundled {}", self.source_file, raw.name);
            return None;
        }

        let direct = self.is_direct(&raw.name);
        if !direct && !self.options.include_transitive {
            tracing::trace!("{}: skipping transitive {}", self.source_file, raw.name);
            return None;
        }

        if self.seen.contains(&raw.name) {
            tracing::trace!("{}: skipping duplicate {}", self.source_file, raw.name);
            return None;
        }
        self.seen.insert(raw.name.clone());

        let scope = self.scope_for(&raw);
        let mut dep = Dependency::new(self.ecosystem, raw.name, raw.version)
            .with_scope(scope)
            .with_direct(direct)
            .with_source_file(self.source_file);
        dep.metadata = raw.metadata;
        Some(dep)
    }

    /// Converts and appends a raw record if it passes the filter
    pub fn push(&mut self, raw: RawPackage, output: &mut Vec<Dependency>) {
        if let Some(dep) = self.accept(raw) {
            output.push(dep);
        }
    }

    /// Filters a whole sequence of raw records
    pub fn apply(mut self, records: impl IntoIterator<Item = RawPackage>) -> Vec<Dependency> {
        let mut output = Vec::new();
        for raw in records {
            self.push(raw, &mut output);
        }
        output
    }
}
