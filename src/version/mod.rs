//! Version grammars
//!
//! This module provides one parser per ecosystem grammar:
//! - PyPI (PEP 440)
//! - npm (semver 2.0.0, lenient about partial versions)
//! - Maven (qualifiers and ranges)
//! - Cargo (strict semver)
//!
//! Every system parses into a [`Version`], which can be canonicalized and
//! compared with other versions of the same system.

mod cargo;
mod maven;
mod npm;
mod pypi;

pub use cargo::CargoVersion;
pub use maven::MavenVersion;
pub use npm::{normalize_npm_spec, NpmVersion};
pub use pypi::{Phase, PyPIVersion};

use crate::error::VersionError;
use std::cmp::Ordering;
use std::fmt;

/// A version grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSystem {
    PyPI,
    Npm,
    Maven,
    Cargo,
}

impl VersionSystem {
    /// Returns the name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            VersionSystem::PyPI => "PyPI",
            VersionSystem::Npm => "npm",
            VersionSystem::Maven => "Maven",
            VersionSystem::Cargo => "cargo",
        }
    }

    /// Returns all version systems
    pub fn all() -> &'static [VersionSystem] {
        &[
            VersionSystem::PyPI,
            VersionSystem::Npm,
            VersionSystem::Maven,
            VersionSystem::Cargo,
        ]
    }

    /// Parses `raw` under this system's grammar
    pub fn parse(&self, raw: &str) -> Result<Version, VersionError> {
        Ok(match self {
            VersionSystem::PyPI => Version::PyPI(PyPIVersion::parse(raw)?),
            VersionSystem::Npm => Version::Npm(NpmVersion::parse(raw)?),
            VersionSystem::Maven => Version::Maven(MavenVersion::parse(raw)?),
            VersionSystem::Cargo => Version::Cargo(CargoVersion::parse(raw)?),
        })
    }
}

impl fmt::Display for VersionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed version, tagged with the system that produced it
#[derive(Debug, Clone)]
pub enum Version {
    PyPI(PyPIVersion),
    Npm(NpmVersion),
    Maven(MavenVersion),
    Cargo(CargoVersion),
}

impl Version {
    pub fn system(&self) -> VersionSystem {
        match self {
            Version::PyPI(_) => VersionSystem::PyPI,
            Version::Npm(_) => VersionSystem::Npm,
            Version::Maven(_) => VersionSystem::Maven,
            Version::Cargo(_) => VersionSystem::Cargo,
        }
    }

    /// Canonical string form
    ///
    /// `include_epoch` only affects PyPI versions with a non-zero epoch.
    pub fn canon(&self, include_epoch: bool) -> String {
        match self {
            Version::PyPI(v) => v.canon(include_epoch),
            Version::Npm(v) => v.canon(),
            Version::Maven(v) => v.canon(),
            Version::Cargo(v) => v.canon(),
        }
    }

    /// Compares two versions of the same system
    ///
    /// Versions from different systems are not comparable and report `Equal`.
    pub fn compare(&self, other: &Version) -> Ordering {
        match (self, other) {
            (Version::PyPI(a), Version::PyPI(b)) => a.cmp(b),
            (Version::Npm(a), Version::Npm(b)) => a.cmp(b),
            (Version::Maven(a), Version::Maven(b)) => a.cmp(b),
            (Version::Cargo(a), Version::Cargo(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    /// The input exactly as given to `parse`
    pub fn original(&self) -> &str {
        match self {
            Version::PyPI(v) => v.original(),
            Version::Npm(v) => v.original(),
            Version::Maven(v) => v.original(),
            Version::Cargo(v) => v.original(),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.original())
    }
}

/// Returns the canonical form of `raw`, or `raw` itself when it does not parse
pub fn normalize(system: VersionSystem, raw: &str) -> String {
    match system.parse(raw) {
        Ok(version) => version.canon(true),
        Err(e) => {
            tracing::trace!("keeping raw version: {}", e);
            raw.to_string()
        }
    }
}
