//! Gemfile.lock parser
//!
//! Handles:
//! - `DEPENDENCIES` section: the gems the Gemfile declares (direct set)
//! - `GEM` / `specs:` section: every resolved gem as `    name (version)`
//! - `PLATFORMS` and `BUNDLED WITH` sections as lockfile metadata

use super::{DependencyFilter, LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem};
use crate::manifest::ManifestNameSets;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const FILE_NAME: &str = "Gemfile.lock";

// Exactly four spaces: deeper lines list the gem's own requirements
static SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {4}([^\s(]+)\s+\(([^)]+)\)").unwrap());

/// Lockfile-level information besides the dependency list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockfileMetadata {
    /// Entries of the `PLATFORMS` section
    pub platforms: Vec<String>,
    /// Version under `BUNDLED WITH`
    pub bundler_version: Option<String>,
}

/// Parses a Gemfile.lock
///
/// A gem is direct when the lockfile's `DEPENDENCIES` section lists it;
/// `names` is not consulted. Every gem gets the prod scope; group
/// information only lives in the Gemfile.
pub fn parse_gemfile_lock(
    content: &str,
    _names: &ManifestNameSets,
    options: LockfileOptions,
) -> Vec<Dependency> {
    let declared = ManifestNameSets {
        prod: direct_dependencies(content),
        ..ManifestNameSets::default()
    };

    let records: Vec<RawPackage> = resolved_specs(content)
        .into_iter()
        .map(|(name, version)| {
            let is_direct = declared.prod.contains(&name);
            RawPackage::new(name, version).with_metadata("direct", is_direct)
        })
        .collect();

    DependencyFilter::new(Ecosystem::Ruby, FILE_NAME, declared, options).apply(records)
}

/// Parses a Gemfile.lock together with its platforms and bundler version
pub fn parse_gemfile_lock_with_metadata(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> (Vec<Dependency>, LockfileMetadata) {
    let dependencies = parse_gemfile_lock(content, names, options);
    let metadata = LockfileMetadata {
        platforms: section_lines(content, "PLATFORMS"),
        bundler_version: section_lines(content, "BUNDLED WITH").into_iter().next(),
    };
    (dependencies, metadata)
}

/// Section headers sit at column zero in upper case
fn is_section_header(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with(char::is_whitespace)
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == ' ' || c == '_')
}

/// Non-empty, trimmed lines of the named section
fn section_lines(content: &str, header: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim_end)
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| !is_section_header(line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First token of every `DEPENDENCIES` line: `  rails (~> 7.1)` -> `rails`
fn direct_dependencies(content: &str) -> BTreeSet<String> {
    section_lines(content, "DEPENDENCIES")
        .iter()
        .filter_map(|line| line.split_whitespace().next())
        .map(|name| name.trim_end_matches('!').to_string())
        .collect()
}

/// `(name, version)` of every resolved spec under `GEM`
fn resolved_specs(content: &str) -> Vec<(String, String)> {
    let mut specs = Vec::new();
    let mut in_gem = false;

    for line in content.lines() {
        let line = line.trim_end();
        if is_section_header(line) {
            in_gem = line == "GEM";
            continue;
        }
        if !in_gem {
            continue;
        }
        if let Some(caps) = SPEC_RE.captures(line) {
            specs.push((caps[1].to_string(), caps[2].to_string()));
        }
    }

    specs
}
