//! Lockfile layout detection
//!
//! Handles:
//! - npm: path-keyed `packages` (lockfile v2/v3) vs nested `dependencies` (v1)
//! - Yarn: classic vs Berry
//! - pnpm: `packages` map (v9) vs importer-only layout (v6)
//! - `lockfileVersion` sniffing for npm and pnpm

use serde::Deserialize;

/// Structural layout of a package-lock.json
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpmLayout {
    /// Flat `packages` map keyed by `node_modules/...` install paths
    Packages,
    /// Nested `dependencies` tree
    Dependencies,
    /// Neither map has entries
    Empty,
}

/// Yarn lockfile flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YarnFlavor {
    /// Yarn 1 (and yarn.lock files that mimic it)
    Classic,
    /// Yarn 2+ (`__metadata:` header, protocol-qualified descriptors)
    Berry,
}

/// Structural layout of a pnpm-lock.yaml
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnpmLayout {
    /// A populated `packages` map (pnpm 9 and later)
    V9,
    /// Importers only (pnpm 6 to 8 style)
    V6,
}

#[derive(Deserialize)]
struct NpmShape {
    #[serde(default)]
    packages: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

/// Detects the layout of a decoded package-lock.json document
pub fn detect_npm_layout(content: &str) -> Option<NpmLayout> {
    let shape: NpmShape = serde_json::from_str(content).ok()?;
    let layout = if !shape.packages.is_empty() {
        NpmLayout::Packages
    } else if !shape.dependencies.is_empty() {
        NpmLayout::Dependencies
    } else {
        NpmLayout::Empty
    };
    Some(layout)
}

/// Detects whether a yarn.lock is classic or Berry
pub fn detect_yarn_flavor(content: &str) -> YarnFlavor {
    // Classic files may carry `"@npm:` descriptors without being Berry
    if content.contains("\"@npm:") && !content.contains("__metadata:") {
        return YarnFlavor::Classic;
    }

    let berry_markers = ["__metadata:", "specifiers", "@workspace:", "@patch:"];
    if berry_markers.iter().any(|marker| content.contains(marker)) {
        YarnFlavor::Berry
    } else {
        YarnFlavor::Classic
    }
}

#[derive(Deserialize)]
struct PnpmShape {
    #[serde(default)]
    packages: Option<serde_yaml::Mapping>,
}

/// Detects the layout of a pnpm-lock.yaml
pub fn detect_pnpm_layout(content: &str) -> Option<PnpmLayout> {
    let shape: PnpmShape = serde_yaml::from_str(content).ok()?;
    match shape.packages {
        Some(packages) if !packages.is_empty() => Some(PnpmLayout::V9),
        _ => Some(PnpmLayout::V6),
    }
}

/// Returns `lockfileVersion` of a package-lock.json, 1 when it cannot be read
pub fn npm_lockfile_version(content: &str) -> u32 {
    #[derive(Deserialize)]
    struct Header {
        #[serde(rename = "lockfileVersion", default = "default_npm_version")]
        lockfile_version: u32,
    }

    fn default_npm_version() -> u32 {
        1
    }

    serde_json::from_str::<Header>(content)
        .map(|h| h.lockfile_version)
        .unwrap_or(1)
}

/// Returns `lockfileVersion` of a pnpm-lock.yaml, `"6"` when it cannot be read
///
/// The value is written either as a string (`'9.0'`) or as a number (`5.4`).
pub fn pnpm_lockfile_version(content: &str) -> String {
    #[derive(Deserialize)]
    struct Header {
        #[serde(rename = "lockfileVersion")]
        lockfile_version: Option<serde_yaml::Value>,
    }

    let version = serde_yaml::from_str::<Header>(content)
        .ok()
        .and_then(|h| h.lockfile_version);

    match version {
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        _ => "6".to_string(),
    }
}
