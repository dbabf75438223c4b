//! Cargo versions, backed by the `semver` crate

use crate::error::VersionError;
use std::cmp::Ordering;
use std::fmt;

const SYSTEM: &str = "cargo";

/// A parsed Cargo (strict semver) version
#[derive(Debug, Clone)]
pub struct CargoVersion {
    original: String,
    inner: semver::Version,
}

impl CargoVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let inner = semver::Version::parse(version.trim())
            .map_err(|e| VersionError::parse(SYSTEM, version, e.to_string()))?;
        Ok(Self {
            original: version.to_string(),
            inner,
        })
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.inner
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn canon(&self) -> String {
        self.inner.to_string()
    }
}

// semver::Version orders build metadata too; precedence must not.
impl Ord for CargoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = &self.inner;
        let b = &other.inner;
        (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
    }
}

impl PartialOrd for CargoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CargoVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CargoVersion {}

impl fmt::Display for CargoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
