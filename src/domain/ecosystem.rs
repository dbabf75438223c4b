//! Ecosystem tags attached to every dependency record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Package ecosystem a dependency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// npm registry packages (npm, Yarn and pnpm lockfiles)
    Npm,
    /// Ruby gems (Gemfile, Gemfile.lock)
    Ruby,
    /// Maven artifacts (`groupId:artifactId`)
    Maven,
    /// Go modules
    Golang,
    /// Python distributions
    Python,
    /// Rust crates
    Cargo,
}

impl Ecosystem {
    /// Returns the tag written into dependency records
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Ruby => "ruby",
            Ecosystem::Maven => "maven",
            Ecosystem::Golang => "golang",
            Ecosystem::Python => "python",
            Ecosystem::Cargo => "cargo",
        }
    }

    /// Returns all supported ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Npm,
            Ecosystem::Ruby,
            Ecosystem::Maven,
            Ecosystem::Golang,
            Ecosystem::Python,
            Ecosystem::Cargo,
        ]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Ecosystem::Npm.as_str(), "npm");
        assert_eq!(Ecosystem::Ruby.as_str(), "ruby");
        assert_eq!(Ecosystem::Maven.as_str(), "maven");
        assert_eq!(Ecosystem::Golang.as_str(), "golang");
        assert_eq!(Ecosystem::Python.as_str(), "python");
        assert_eq!(Ecosystem::Cargo.as_str(), "cargo");
    }

    #[test]
    fn test_display_matches_tag() {
        for ecosystem in Ecosystem::all() {
            assert_eq!(ecosystem.to_string(), ecosystem.as_str());
        }
    }

    #[test]
    fn test_serde_uses_tag() {
        for ecosystem in Ecosystem::all() {
            let json = serde_json::to_string(ecosystem).unwrap();
            assert_eq!(json, format!("\"{}\"", ecosystem.as_str()));

            let parsed: Ecosystem = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *ecosystem);
        }
    }
}
