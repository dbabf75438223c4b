//! yarn.lock parser
//!
//! Handles:
//! - Yarn classic (`lodash@^4.17.21:` followed by `version "4.17.21"`)
//! - Yarn Berry (`"lodash@npm:^4.17.21":` followed by `version: 4.17.21`)
//! - Berry protocols: workspace, patch, git, file, tarball

use super::detector::{detect_yarn_flavor, YarnFlavor};
use super::{DependencyFilter, LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem};
use crate::manifest::ManifestNameSets;
use regex::Regex;
use std::sync::LazyLock;

const FILE_NAME: &str = "yarn.lock";

static BERRY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"((?:@[^/]+/)?[^@]+)@([^:]+):([^"]+)""#).unwrap());

static BERRY_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+version:\s+"?([^"\s]+)"?"#).unwrap());

static BERRY_RESOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+resolution:\s+"([^"]+)""#).unwrap());

static CLASSIC_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?((?:@[^/"]+/)?[^@"\s]+)@.*:\s*$"#).unwrap());

static CLASSIC_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^version:?\s+"?([^"\s]+)"?"#).unwrap());

/// Parses a yarn.lock of either flavor
pub fn parse_yarn_lock(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Vec<Dependency> {
    let flavor = detect_yarn_flavor(content);
    tracing::debug!("{}: {:?} flavor", FILE_NAME, flavor);

    let filter = DependencyFilter::new(Ecosystem::Npm, FILE_NAME, names.clone(), options);
    let records = match flavor {
        YarnFlavor::Berry => berry_records(content),
        YarnFlavor::Classic => classic_records(content),
    };
    filter.apply(records)
}

/// Maps a Berry entry to its displayed version by descriptor protocol
fn berry_version(version: &str, spec_type: &str, resolution: &str) -> String {
    let version = version.trim();
    let latest_or = |v: &str| {
        if v.is_empty() || v == "*" {
            "latest".to_string()
        } else {
            v.to_string()
        }
    };

    match spec_type {
        "workspace" => "workspace".to_string(),
        "patch" => "patch".to_string(),
        "git" if !resolution.is_empty() => format!("git:{}", resolution),
        "git" => "git".to_string(),
        "file" => "local".to_string(),
        "tarball" if resolution.starts_with("file:") => "local".to_string(),
        "tarball" => "tarball".to_string(),
        _ => latest_or(version),
    }
}

/// A Berry entry being read; it ends at the next key or blank line
struct BerryEntry {
    name: String,
    spec_type: String,
    version: Option<String>,
    resolution: String,
}

impl BerryEntry {
    fn into_record(self) -> Option<RawPackage> {
        let version = berry_version(self.version.as_deref()?, &self.spec_type, &self.resolution);
        let mut raw = RawPackage::new(self.name, version);
        if !self.resolution.is_empty() {
            raw = raw.with_metadata("resolution", self.resolution);
        }
        Some(raw)
    }
}

fn berry_records(content: &str) -> Vec<RawPackage> {
    let mut records = Vec::new();
    let mut current: Option<BerryEntry> = None;

    for line in content.lines() {
        let line = line.trim_end();

        if let Some(caps) = BERRY_KEY_RE.captures(line) {
            records.extend(current.take().and_then(BerryEntry::into_record));
            current = Some(BerryEntry {
                name: caps[1].to_string(),
                spec_type: caps[2].to_string(),
                version: None,
                resolution: String::new(),
            });
            continue;
        }

        if line.is_empty() {
            records.extend(current.take().and_then(BerryEntry::into_record));
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = BERRY_VERSION_RE.captures(line) {
            entry.version.get_or_insert_with(|| caps[1].to_string());
        } else if let Some(caps) = BERRY_RESOLUTION_RE.captures(line) {
            // Read anywhere in the entry, before or after `version:`
            entry.resolution = caps[1].to_string();
        }
    }

    records.extend(current.take().and_then(BerryEntry::into_record));
    records
}

fn classic_records(content: &str) -> Vec<RawPackage> {
    let mut records = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim_end();

        // Entry keys sit at column zero; everything nested is indented
        if !line.starts_with([' ', '\t', '#']) {
            if let Some(caps) = CLASSIC_KEY_RE.captures(line) {
                current = Some(caps[1].to_string());
            }
            continue;
        }

        if current.is_none() {
            continue;
        }

        if let Some(caps) = CLASSIC_VERSION_RE.captures(line.trim_start()) {
            if let Some(name) = current.take() {
                records.push(RawPackage::new(name, &caps[1]));
            }
        }
    }

    records
}
