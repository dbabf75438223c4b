//! pnpm-lock.yaml parser
//!
//! Handles:
//! - v9 lockfiles with a `packages` map (`lodash@4.17.21`, `@babel/core@7.23.0`,
//!   peer suffixes such as `react-dom@18.2.0(react@18.2.0)`)
//! - v6 style lockfiles where only the root importer lists dependencies
//! - Workspace, git and tarball resolutions

use super::detector::{detect_pnpm_layout, PnpmLayout};
use super::{DependencyFilter, LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem};
use crate::error::LockfileError;
use crate::manifest::ManifestNameSets;
use serde::Deserialize;
use std::collections::BTreeMap;

const FILE_NAME: &str = "pnpm-lock.yaml";
const ROOT_IMPORTER: &str = ".";

#[derive(Debug, Default, Deserialize)]
struct PnpmLockfile {
    #[serde(default)]
    importers: BTreeMap<String, Importer>,
    #[serde(default)]
    packages: BTreeMap<String, PnpmPackage>,
    /// Single-project lockfiles list the root dependencies at top level
    #[serde(flatten)]
    root: Importer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Importer {
    dependencies: BTreeMap<String, ImporterDependency>,
    dev_dependencies: BTreeMap<String, ImporterDependency>,
    optional_dependencies: BTreeMap<String, ImporterDependency>,
}

impl Importer {
    fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.optional_dependencies.is_empty()
    }

    fn name_sets(&self) -> ManifestNameSets {
        ManifestNameSets {
            prod: self.dependencies.keys().cloned().collect(),
            dev: self.dev_dependencies.keys().cloned().collect(),
            optional: self.optional_dependencies.keys().cloned().collect(),
            ..ManifestNameSets::default()
        }
    }

    /// All entries in prod, dev, optional order
    fn entries(&self) -> impl Iterator<Item = (&String, &ImporterDependency)> {
        self.dependencies
            .iter()
            .chain(&self.dev_dependencies)
            .chain(&self.optional_dependencies)
    }
}

/// `{specifier, version}` since lockfile v6, a bare version string before
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImporterDependency {
    Detailed {
        #[serde(default)]
        specifier: String,
        #[serde(default)]
        version: String,
    },
    Plain(String),
}

impl ImporterDependency {
    fn version(&self) -> &str {
        match self {
            ImporterDependency::Detailed { version, .. } => version,
            ImporterDependency::Plain(version) => version,
        }
    }

    fn specifier(&self) -> Option<&str> {
        match self {
            ImporterDependency::Detailed { specifier, .. } if !specifier.is_empty() => {
                Some(specifier)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PnpmPackage {
    resolution: Resolution,
    name: Option<String>,
    version: Option<String>,
    dev: bool,
    optional: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resolution {
    directory: Option<String>,
    tarball: Option<String>,
    git: Option<String>,
    repo: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Resolution {
    fn directory(&self) -> Option<&str> {
        non_empty(&self.directory)
    }

    fn tarball(&self) -> Option<&str> {
        non_empty(&self.tarball)
    }

    fn git_url(&self) -> Option<&str> {
        non_empty(&self.git).or_else(|| match self.kind.as_deref() {
            Some("git") => non_empty(&self.repo),
            _ => None,
        })
    }
}

/// Parses a pnpm-lock.yaml
///
/// The root importer's dependency lists are declarations too: they are
/// merged into `names` before filtering.
pub fn parse_pnpm_lock(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Vec<Dependency> {
    match try_parse_pnpm_lock(content, names, options) {
        Ok(deps) => deps,
        Err(e) => {
            tracing::warn!("{}", e);
            Vec::new()
        }
    }
}

fn try_parse_pnpm_lock(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Result<Vec<Dependency>, LockfileError> {
    let lockfile: PnpmLockfile = serde_yaml::from_str(content).map_err(|source| {
        LockfileError::Yaml {
            file: FILE_NAME,
            source,
        }
    })?;

    let layout = detect_pnpm_layout(content).unwrap_or(PnpmLayout::V6);
    tracing::debug!("{}: layout {:?}", FILE_NAME, layout);

    let root = match lockfile.importers.get(ROOT_IMPORTER) {
        Some(importer) => Some(importer),
        None if !lockfile.root.is_empty() => Some(&lockfile.root),
        None => None,
    };

    let mut declared = names.clone();
    if let Some(importer) = root {
        merge_name_sets(&mut declared, importer.name_sets());
    }
    let filter = DependencyFilter::new(Ecosystem::Npm, FILE_NAME, declared, options);

    let records = match layout {
        PnpmLayout::V9 => package_records(&lockfile.packages, root),
        PnpmLayout::V6 => {
            let importer = root.ok_or_else(|| {
                LockfileError::unexpected_shape(FILE_NAME, "no root importer")
            })?;
            importer_records(importer)
        }
    };

    Ok(filter.apply(records))
}

fn merge_name_sets(into: &mut ManifestNameSets, from: ManifestNameSets) {
    into.prod.extend(from.prod);
    into.dev.extend(from.dev);
    into.peer.extend(from.peer);
    into.optional.extend(from.optional);
}

/// Drops a peer dependency suffix: `18.2.0(react@18.2.0)` -> `18.2.0`
fn strip_peer_suffix(s: &str) -> &str {
    s.split('(').next().unwrap_or(s)
}

/// Splits a `packages` key into name and version
///
/// `lodash@4.17.21` -> (`lodash`, `4.17.21`), `/@babel/core@7.23.0` ->
/// (`@babel/core`, `7.23.0`), `./packages/ui` -> (`ui`, none).
fn split_package_key(key: &str) -> Option<(String, Option<String>)> {
    let key = strip_peer_suffix(key);

    if key.starts_with('.') {
        let parts: Vec<&str> = key.split('/').collect();
        let name = parts
            .windows(2)
            .find(|pair| pair[0] == "packages")
            .map(|pair| pair[1])
            .filter(|name| !name.is_empty())?;
        return Some((name.to_string(), None));
    }

    let key = key.trim_start_matches('/');
    let mut parts = key.split('/');
    let first = parts.next()?;
    let (full, rest) = match (first.starts_with('@'), parts.next()) {
        (true, Some(second)) => (format!("{}/{}", first, second), parts.next()),
        (_, second) => (first.to_string(), second),
    };

    let (name, version) = match full.rfind('@') {
        Some(idx) if idx > 0 => (full[..idx].to_string(), Some(full[idx + 1..].to_string())),
        // pnpm 5 keys: `/lodash/4.17.21`
        _ => (full, rest.map(str::to_string)),
    };

    if name.is_empty() {
        return None;
    }
    Some((name, version.filter(|v| !v.is_empty())))
}

/// Maps a package's resolution and version to the displayed version
fn resolve_version(version: &str, resolution: &Resolution) -> String {
    if resolution.directory().is_some() {
        return "workspace".to_string();
    }
    if let Some(url) = resolution.git_url() {
        return format!("git:{}", url);
    }
    if let Some(tarball) = resolution.tarball() {
        return if tarball.starts_with("file:") {
            "local".to_string()
        } else {
            "tarball".to_string()
        };
    }

    let version = version.trim();
    if version.is_empty() || version == "*" {
        "latest".to_string()
    } else {
        version.to_string()
    }
}

fn package_records(
    packages: &BTreeMap<String, PnpmPackage>,
    root: Option<&Importer>,
) -> Vec<RawPackage> {
    // Versions the root importer resolved win over other copies of the same name
    let root_versions: BTreeMap<&str, &str> = root
        .map(|importer| {
            importer
                .entries()
                .map(|(name, dep)| (name.as_str(), strip_peer_suffix(dep.version())))
                .collect()
        })
        .unwrap_or_default();

    let mut preferred = Vec::new();
    let mut others = Vec::new();

    for (key, pkg) in packages {
        let Some((key_name, key_version)) = split_package_key(key) else {
            tracing::trace!("{}: no name in key {}", FILE_NAME, key);
            continue;
        };
        let name = pkg.name.clone().unwrap_or(key_name);
        let version = pkg.version.clone().or(key_version).unwrap_or_default();

        let is_root_version = root_versions.get(name.as_str()) == Some(&version.as_str());
        let raw = RawPackage::new(name, resolve_version(&version, &pkg.resolution))
            .with_dev(pkg.dev)
            .with_optional(pkg.optional);

        if is_root_version {
            preferred.push(raw);
        } else {
            others.push(raw);
        }
    }

    preferred.extend(others);
    preferred
}

fn importer_records(importer: &Importer) -> Vec<RawPackage> {
    importer
        .entries()
        .map(|(name, dep)| {
            let version = resolve_version(strip_peer_suffix(dep.version()), &Resolution::default());
            let raw = RawPackage::new(name.clone(), version);
            match dep.specifier() {
                Some(specifier) => raw.with_metadata("specifier", specifier),
                None => raw,
            }
        })
        .collect()
}
