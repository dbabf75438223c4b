//! Lockfile parsing
//!
//! This module provides:
//! - Format detection for npm, Yarn and pnpm lockfile variants
//! - One parser per lockfile format, each walking its native tree into
//!   [`RawPackage`] records
//! - The [`DependencyFilter`] that turns raw records into final
//!   [`Dependency`] values (scope, directness, deduplication)
//!
//! Parsers never fail: a lockfile that cannot be decoded is logged and
//! yields an empty list.

mod detector;
mod filter;
mod gemfile_lock;
mod maven_list;
mod npm;
mod pnpm;
mod yarn;

pub use detector::{
    detect_npm_layout, detect_pnpm_layout, detect_yarn_flavor, npm_lockfile_version,
    pnpm_lockfile_version, NpmLayout, PnpmLayout, YarnFlavor,
};
pub use filter::DependencyFilter;
pub use gemfile_lock::{parse_gemfile_lock, parse_gemfile_lock_with_metadata, LockfileMetadata};
pub use maven_list::parse_maven_dependency_list;
pub use npm::parse_package_lock;
pub use pnpm::parse_pnpm_lock;
pub use yarn::parse_yarn_lock;

use crate::domain::{Dependency, Ecosystem, Metadata, Scope};
use crate::manifest::ManifestNameSets;
use serde_json::Value;
use std::fmt;

/// Supported lockfile formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockfileKind {
    /// package-lock.json (npm)
    NpmLock,
    /// yarn.lock (Yarn classic and Berry)
    YarnLock,
    /// pnpm-lock.yaml
    PnpmLock,
    /// Gemfile.lock (Bundler)
    GemfileLock,
    /// Output of `mvn dependency:list`
    MavenDependencyList,
}

impl LockfileKind {
    /// Returns all supported lockfile kinds, in detection priority order
    pub fn all() -> &'static [LockfileKind] {
        &[
            LockfileKind::NpmLock,
            LockfileKind::YarnLock,
            LockfileKind::PnpmLock,
            LockfileKind::GemfileLock,
            LockfileKind::MavenDependencyList,
        ]
    }

    /// Returns the canonical file name, also used as the records' source file
    pub fn file_name(&self) -> &'static str {
        match self {
            LockfileKind::NpmLock => "package-lock.json",
            LockfileKind::YarnLock => "yarn.lock",
            LockfileKind::PnpmLock => "pnpm-lock.yaml",
            LockfileKind::GemfileLock => "Gemfile.lock",
            LockfileKind::MavenDependencyList => "dependency-list.txt",
        }
    }

    /// Returns the short name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            LockfileKind::NpmLock => "npm",
            LockfileKind::YarnLock => "yarn",
            LockfileKind::PnpmLock => "pnpm",
            LockfileKind::GemfileLock => "bundler",
            LockfileKind::MavenDependencyList => "maven",
        }
    }

    /// Returns the ecosystem of the records this lockfile produces
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            LockfileKind::NpmLock | LockfileKind::YarnLock | LockfileKind::PnpmLock => {
                Ecosystem::Npm
            }
            LockfileKind::GemfileLock => Ecosystem::Ruby,
            LockfileKind::MavenDependencyList => Ecosystem::Maven,
        }
    }

    /// Returns the manifest that declares the direct dependencies, if any
    pub fn manifest_file_name(&self) -> Option<&'static str> {
        match self {
            LockfileKind::NpmLock | LockfileKind::YarnLock | LockfileKind::PnpmLock => {
                Some("package.json")
            }
            LockfileKind::GemfileLock => Some("Gemfile"),
            LockfileKind::MavenDependencyList => None,
        }
    }

    /// Detects the lockfile kind from a file name
    pub fn from_file_name(file_name: &str) -> Option<LockfileKind> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.file_name() == file_name)
    }

    /// Parses a short name (`npm`, `yarn`, `pnpm`, `bundler`, `maven`) or a file name
    pub fn from_name(name: &str) -> Option<LockfileKind> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name) || kind.file_name() == name)
    }
}

impl fmt::Display for LockfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Options shared by every lockfile parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockfileOptions {
    /// Keep dependencies the manifest does not declare (marked non-direct)
    pub include_transitive: bool,
}

impl LockfileOptions {
    /// Create options with default settings (direct dependencies only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether transitive dependencies are included
    pub fn with_transitive(mut self, include: bool) -> Self {
        self.include_transitive = include;
        self
    }
}

/// A package as read from a lockfile, before scope and directness are decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPackage {
    pub name: String,
    pub version: String,
    /// The lockfile marks it development only
    pub dev: bool,
    /// The lockfile marks it optional
    pub optional: bool,
    /// Shipped inside another package's tarball
    pub bundled: bool,
    /// Scope the lockfile states outright (Maven), used when the manifest is silent
    pub scope: Option<Scope>,
    pub metadata: Metadata,
}

impl RawPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_bundled(mut self, bundled: bool) -> Self {
        self.bundled = bundled;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Parses any supported lockfile
///
/// `names` are the declared names from the matching manifest. They decide
/// scope and directness; formats that carry their own direct set (Gemfile.lock,
/// pnpm importers) merge it with `names`.
pub fn parse_lockfile(
    kind: LockfileKind,
    content: &[u8],
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Vec<Dependency> {
    let content = String::from_utf8_lossy(content);
    tracing::debug!("parsing {} ({} bytes)", kind, content.len());

    match kind {
        LockfileKind::NpmLock => parse_package_lock(&content, names, options),
        LockfileKind::YarnLock => parse_yarn_lock(&content, names, options),
        LockfileKind::PnpmLock => parse_pnpm_lock(&content, names, options),
        LockfileKind::GemfileLock => parse_gemfile_lock(&content, names, options),
        LockfileKind::MavenDependencyList => parse_maven_dependency_list(&content),
    }
}
