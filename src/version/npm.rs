//! npm (semver 2.0.0) versions
//!
//! Handles:
//! - Optional `v`, `V` or `=` prefix
//! - Partial versions: `1`, `1.2` (missing parts default to 0)
//! - Prerelease identifiers: `1.0.0-alpha.1`
//! - Build metadata: `1.0.0+build.5` (kept in the canonical form, ignored for ordering)

use crate::error::VersionError;
use std::cmp::Ordering;
use std::fmt;

const SYSTEM: &str = "npm";

/// A parsed npm version
#[derive(Debug, Clone)]
pub struct NpmVersion {
    original: String,
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Vec<String>,
    build: Vec<String>,
}

impl NpmVersion {
    /// Parse an npm version string
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version.is_empty() {
            return Err(VersionError::parse(SYSTEM, version, "empty version string"));
        }

        let trimmed = version.trim();
        let s = trimmed
            .strip_prefix(['v', 'V', '='])
            .unwrap_or(trimmed);

        let (s, build) = match s.split_once('+') {
            Some((head, build)) => (head, split_identifiers(build)),
            None => (s, Vec::new()),
        };
        let (core, prerelease) = match s.split_once('-') {
            Some((head, pre)) => (head, split_identifiers(pre)),
            None => (s, Vec::new()),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::parse(SYSTEM, version, "invalid version format"));
        }

        let number = |index: usize, label: &str| -> Result<u64, VersionError> {
            match parts.get(index) {
                None => Ok(0),
                Some(part) => part.parse::<u64>().map_err(|_| {
                    VersionError::parse(
                        SYSTEM,
                        version,
                        format!("invalid {} version: {}", label, part),
                    )
                }),
            }
        };

        Ok(Self {
            original: version.to_string(),
            major: number(0, "major")?,
            minor: number(1, "minor")?,
            patch: number(2, "patch")?,
            prerelease,
            build,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> &[String] {
        &self.prerelease
    }

    pub fn build(&self) -> &[String] {
        &self.build
    }

    /// The input exactly as given to `parse`
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Canonical rendering: `major.minor.patch[-prerelease][+build]`
    pub fn canon(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if !self.prerelease.is_empty() {
            out.push('-');
            out.push_str(&self.prerelease.join("."));
        }
        if !self.build.is_empty() {
            out.push('+');
            out.push_str(&self.build.join("."));
        }
        out
    }

    fn cmp_prerelease(&self, other: &Self) -> Ordering {
        match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .prerelease
                .iter()
                .zip(&other.prerelease)
                .map(|(a, b)| cmp_identifier(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| self.prerelease.len().cmp(&other.prerelease.len())),
        }
    }
}

fn split_identifiers(s: &str) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split('.').map(str::to_string).collect()
    }
}

fn numeric_identifier(s: &str) -> Option<u64> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Numeric identifiers compare numerically and always sort below
/// alphanumeric ones; alphanumeric identifiers compare lexically.
fn cmp_identifier(a: &str, b: &str) -> Ordering {
    match (numeric_identifier(a), numeric_identifier(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

impl Ord for NpmVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| self.cmp_prerelease(other))
    }
}

impl PartialOrd for NpmVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Build metadata is not part of precedence, so it is not part of equality.
impl PartialEq for NpmVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NpmVersion {}

impl fmt::Display for NpmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Normalizes a declared npm specifier for display
///
/// Protocol specifiers collapse to a short tag (`workspace`, `local`, `git`,
/// `github`, `tarball`, `link`), aliases (`npm:name@1.2.3`) resolve to their
/// version, and plain versions are canonicalized. Ranges that are not a
/// single version pass through unchanged.
pub fn normalize_npm_spec(spec: &str) -> String {
    let spec = spec.trim();

    if spec.starts_with("workspace:") {
        return "workspace".to_string();
    }
    if spec.starts_with("file:") {
        return "local".to_string();
    }
    if let Some(alias) = spec.strip_prefix("npm:") {
        // "@scope/name@1.2.3": the version follows the last '@' after the name
        return match alias.rfind('@') {
            Some(idx) if idx > 0 => normalize_npm_spec(&alias[idx + 1..]),
            _ => alias.to_string(),
        };
    }
    if spec.starts_with("git:") || spec.starts_with("git+") {
        return "git".to_string();
    }
    if spec.starts_with("github:") {
        return "github".to_string();
    }
    if spec.starts_with("http:") || spec.starts_with("https:") {
        return "tarball".to_string();
    }
    if spec.starts_with("link:") {
        return "link".to_string();
    }
    if spec.is_empty() || spec == "*" || spec == "latest" {
        return "latest".to_string();
    }

    match NpmVersion::parse(spec) {
        Ok(version) => version.canon(),
        Err(_) => spec.to_string(),
    }
}
