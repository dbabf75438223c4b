//! Maven versions and version ranges
//!
//! Handles:
//! - Release qualifiers: `2.7.0.FINAL`, `1.0.0-RELEASE`, `1.0-GA` (stripped)
//! - Snapshots: `1.0.0-SNAPSHOT`, timestamped `1.0.0-20131201.121010-5`
//! - Milestones and candidates: `1.0.0-M1`, `1.0.0.RC1`, `1.0-SP2`
//! - Ranges: `[1.0,2.0)`, `(,2.0]`, `[1.0,)`
//!
//! Ordering compares canonical strings lexically. It is a coarse
//! approximation of Maven's own comparator, good enough for sorting
//! equal-shaped versions.

use crate::error::VersionError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

const SYSTEM: &str = "Maven";

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\[\(]([^,\]]*),([^\]\)]*)[\]\)]$").unwrap());

static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*)(?:[-.]?(RELEASE|FINAL|SNAPSHOT|GA|BUILD|SP|RC|M\d+|PRE))?$")
        .unwrap()
});

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(?:[-.]?(\d{8}\.\d{6})-(\d+))?$").unwrap());

/// A parsed Maven version or range
#[derive(Debug, Clone)]
pub struct MavenVersion {
    original: String,
    canonical: String,
    range: Option<(String, String)>,
}

impl MavenVersion {
    /// Parse a Maven version or version range
    ///
    /// Only the empty string is rejected. Shapes outside the recognized
    /// qualifier vocabulary pass through verbatim.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version.is_empty() {
            return Err(VersionError::parse(SYSTEM, version, "empty version string"));
        }

        if let Some(caps) = RANGE_RE.captures(version) {
            let lower = canonicalize_plain(caps[1].trim());
            let upper = canonicalize_plain(caps[2].trim());
            let canonical = render_range(&lower, &upper);
            return Ok(Self {
                original: version.to_string(),
                canonical,
                range: Some((lower, upper)),
            });
        }

        Ok(Self {
            original: version.to_string(),
            canonical: canonicalize_plain(version),
            range: None,
        })
    }

    /// Lower and upper bounds when this is a range; empty strings mean unbounded
    pub fn range(&self) -> Option<(&str, &str)> {
        self.range
            .as_ref()
            .map(|(lower, upper)| (lower.as_str(), upper.as_str()))
    }

    pub fn is_range(&self) -> bool {
        self.range.is_some()
    }

    /// The input exactly as given to `parse`
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn canon(&self) -> String {
        self.canonical.clone()
    }
}

fn canonicalize_plain(version: &str) -> String {
    if version.is_empty() {
        return String::new();
    }

    if let Some(caps) = TIMESTAMP_RE.captures(version) {
        let base = &caps[1];
        return match caps.get(3) {
            Some(build) => format!("{}-build.{}", base, build.as_str()),
            None => base.to_string(),
        };
    }

    if let Some(caps) = QUALIFIER_RE.captures(version) {
        let base = &caps[1];
        return match caps.get(2).map(|m| m.as_str()) {
            None | Some("RELEASE") | Some("FINAL") | Some("GA") => base.to_string(),
            Some("SNAPSHOT") => format!("{}-snapshot", base),
            Some("BUILD") => format!("{}-build", base),
            Some(qualifier) => format!("{}-{}", base, qualifier.to_lowercase()),
        };
    }

    version.to_string()
}

fn render_range(lower: &str, upper: &str) -> String {
    match (lower.is_empty(), upper.is_empty()) {
        (true, true) => "*".to_string(),
        (true, false) => format!("<={}", upper),
        (false, true) => format!(">={}", lower),
        (false, false) => format!("{}-{}", lower, upper),
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for MavenVersion {}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
