//! package-lock.json parser
//!
//! Handles:
//! - lockfile v2/v3 `packages` maps keyed by install path
//!   (`node_modules/express/node_modules/accepts`)
//! - lockfile v1 nested `dependencies` trees
//! - bundled, dev and optional flags

use super::detector::{detect_npm_layout, NpmLayout};
use super::{DependencyFilter, LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem};
use crate::error::LockfileError;
use crate::manifest::ManifestNameSets;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};

const FILE_NAME: &str = "package-lock.json";
const NODE_MODULES: &str = "node_modules/";

/// Nested `dependencies` trees deeper than this are not walked
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Default, Deserialize)]
struct PackageLock {
    #[serde(default)]
    packages: BTreeMap<String, PackageEntry>,
    #[serde(default)]
    dependencies: BTreeMap<String, TreeEntry>,
}

/// Entry of the path-keyed `packages` map
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageEntry {
    version: String,
    resolved: Option<String>,
    link: bool,
    dev: bool,
    optional: bool,
    #[serde(alias = "inBundle")]
    bundled: bool,
}

/// Entry of the nested v1 `dependencies` tree
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TreeEntry {
    version: String,
    resolved: Option<String>,
    dev: bool,
    optional: bool,
    bundled: bool,
    dependencies: BTreeMap<String, TreeEntry>,
}

/// Parses a package-lock.json
///
/// By default only packages installed directly under the root
/// `node_modules/` and declared by the manifest are returned. With
/// `include_transitive`, every installed package is returned and marked
/// direct only when declared.
pub fn parse_package_lock(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Vec<Dependency> {
    match try_parse_package_lock(content, names, options) {
        Ok(deps) => deps,
        Err(e) => {
            tracing::warn!("{}", e);
            Vec::new()
        }
    }
}

fn try_parse_package_lock(
    content: &str,
    names: &ManifestNameSets,
    options: LockfileOptions,
) -> Result<Vec<Dependency>, LockfileError> {
    let lockfile: PackageLock = serde_json::from_str(content).map_err(|source| {
        LockfileError::Json {
            file: FILE_NAME,
            source,
        }
    })?;

    let layout = detect_npm_layout(content).unwrap_or(NpmLayout::Empty);
    tracing::debug!("{}: layout {:?}", FILE_NAME, layout);

    let filter = DependencyFilter::new(Ecosystem::Npm, FILE_NAME, names.clone(), options);
    let records = match layout {
        NpmLayout::Packages => package_records(lockfile.packages, options),
        NpmLayout::Dependencies => tree_records(lockfile.dependencies, options),
        NpmLayout::Empty => Vec::new(),
    };

    Ok(filter.apply(records))
}

/// Extracts the package name from an install path
///
/// `node_modules/express` -> `express`,
/// `node_modules/a/node_modules/@babel/core` -> `@babel/core`.
/// Paths outside `node_modules/` (workspace folders) have no name.
pub(crate) fn name_from_install_path(path: &str) -> Option<&str> {
    let last = path.rsplit(NODE_MODULES).next()?.trim();
    if last.is_empty() || !path.contains(NODE_MODULES) {
        return None;
    }

    if last.starts_with('@') {
        let mut parts = last.splitn(3, '/');
        if let (Some(scope), Some(name)) = (parts.next(), parts.next()) {
            return Some(&last[..scope.len() + 1 + name.len()]);
        }
    }

    last.split('/').next()
}

fn install_depth(path: &str) -> usize {
    path.matches(NODE_MODULES).count()
}

fn package_records(
    packages: BTreeMap<String, PackageEntry>,
    options: LockfileOptions,
) -> Vec<RawPackage> {
    let mut entries: Vec<(String, PackageEntry)> = packages
        .into_iter()
        .filter(|(path, _)| !path.is_empty())
        .filter(|(path, _)| options.include_transitive || install_depth(path) == 1)
        .collect();
    // Shallow installs first so the hoisted copy wins deduplication
    entries.sort_by_key(|(path, _)| install_depth(path));

    entries
        .into_iter()
        .filter_map(|(path, entry)| {
            let name = name_from_install_path(&path)?.to_string();
            let mut raw = RawPackage::new(name, entry.version)
                .with_dev(entry.dev)
                .with_optional(entry.optional)
                .with_bundled(entry.bundled);
            if let Some(resolved) = entry.resolved.filter(|r| !r.is_empty()) {
                raw = raw.with_metadata("resolved", resolved);
            }
            if entry.link {
                raw = raw.with_metadata("link", true);
            }
            Some(raw)
        })
        .collect()
}

fn tree_records(
    dependencies: BTreeMap<String, TreeEntry>,
    options: LockfileOptions,
) -> Vec<RawPackage> {
    let mut records = Vec::new();
    // Breadth first, so top-level entries are seen before nested copies
    let mut queue: VecDeque<(String, usize, BTreeMap<String, TreeEntry>)> = VecDeque::new();
    queue.push_back((String::new(), 0, dependencies));

    while let Some((prefix, depth, level)) = queue.pop_front() {
        for (name, entry) in level {
            let path = format!("{}{}{}", prefix, NODE_MODULES, name);
            tracing::trace!("{}: {}", FILE_NAME, path);

            let mut raw = RawPackage::new(name, entry.version)
                .with_dev(entry.dev)
                .with_optional(entry.optional)
                .with_bundled(entry.bundled);
            if let Some(resolved) = entry.resolved.filter(|r| !r.is_empty()) {
                raw = raw.with_metadata("resolved", resolved);
            }
            records.push(raw);

            if !options.include_transitive || entry.dependencies.is_empty() {
                continue;
            }
            if depth + 1 >= MAX_TREE_DEPTH {
                tracing::debug!("{}: not descending below {}", FILE_NAME, path);
                continue;
            }
            queue.push_back((format!("{}/", path), depth + 1, entry.dependencies));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;

    const V3_EXPRESS: &str = r#"{
        "name": "test-project",
        "version": "1.0.0",
        "lockfileVersion": 3,
        "packages": {
            "": {"name": "test-project", "version": "1.0.0", "dependencies": {"express": "^4.18.0"}},
            "node_modules/express": {
                "version": "4.18.2",
                "resolved": "https://registry.npmjs.org/express/-/express-4.18.2.tgz",
                "dependencies": {"accepts": "~1.3.8"}
            },
            "node_modules/express/node_modules/accepts": {"version": "1.3.8"},
            "node_modules/express/node_modules/body-parser": {"version": "1.20.2"}
        }
    }"#;

    fn express_names() -> ManifestNameSets {
        ManifestNameSets::new().with_prod("express")
    }

    fn find<'a>(deps: &'a [Dependency], name: &str) -> &'a Dependency {
        deps.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn test_name_from_install_path() {
        assert_eq!(name_from_install_path("node_modules/express"), Some("express"));
        assert_eq!(name_from_install_path("node_modules/@babel/core"), Some("@babel/core"));
        assert_eq!(
            name_from_install_path("node_modules/express/node_modules/accepts"),
            Some("accepts")
        );
        assert_eq!(
            name_from_install_path("node_modules/a/node_modules/@types/node"),
            Some("@types/node")
        );
        assert_eq!(name_from_install_path("packages/my-lib"), None);
        assert_eq!(name_from_install_path(""), None);
        assert_eq!(name_from_install_path("node_modules/"), None);
    }

    #[test]
    fn test_v3_default_is_direct_only() {
        let deps = parse_package_lock(V3_EXPRESS, &express_names(), LockfileOptions::new());
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "express");
        assert_eq!(deps[0].version, "4.18.2");
        assert!(deps[0].direct);
        assert_eq!(deps[0].scope, Scope::Prod);
        assert_eq!(deps[0].source_file.as_deref(), Some("package-lock.json"));
        assert_eq!(
            deps[0].metadata["resolved"],
            serde_json::json!("https://registry.npmjs.org/express/-/express-4.18.2.tgz")
        );
    }

    #[test]
    fn test_v3_transitive_adds_nested() {
        let options = LockfileOptions::new().with_transitive(true);
        let deps = parse_package_lock(V3_EXPRESS, &express_names(), options);
        assert_eq!(deps.len(), 3);
        assert!(find(&deps, "express").direct);
        assert!(!find(&deps, "accepts").direct);
        assert_eq!(find(&deps, "accepts").version, "1.3.8");
        assert_eq!(find(&deps, "body-parser").version, "1.20.2");
    }

    #[test]
    fn test_v3_default_drops_undeclared_hoisted() {
        let content = r#"{"lockfileVersion": 3, "packages": {
            "node_modules/express": {"version": "4.18.2"},
            "node_modules/ms": {"version": "2.1.3"}
        }}"#;
        let deps = parse_package_lock(content, &express_names(), LockfileOptions::new());
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "express");
    }

    #[test]
    fn test_v3_hoisted_copy_wins() {
        let content = r#"{"lockfileVersion": 3, "packages": {
            "node_modules/a/node_modules/ms": {"version": "2.0.0"},
            "node_modules/a": {"version": "1.0.0"},
            "node_modules/ms": {"version": "2.1.3"}
        }}"#;
        let options = LockfileOptions::new().with_transitive(true);
        let deps = parse_package_lock(content, &ManifestNameSets::new(), options);
        assert_eq!(deps.len(), 2);
        assert_eq!(find(&deps, "ms").version, "2.1.3");
    }

    #[test]
    fn test_v3_flags_and_bundled() {
        let content = r#"{"lockfileVersion": 3, "packages": {
            "node_modules/jest": {"version": "29.7.0", "dev": true},
            "node_modules/fsevents": {"version": "2.3.3", "optional": true, "dev": true},
            "node_modules/inner": {"version": "1.0.0", "inBundle": true},
            "node_modules/old": {"version": "1.0.0", "bundled": true}
        }}"#;
        let options = LockfileOptions::new().with_transitive(true);
        let deps = parse_package_lock(content, &ManifestNameSets::new(), options);
        assert_eq!(deps.len(), 2);
        assert_eq!(find(&deps, "jest").scope, Scope::Dev);
        assert_eq!(find(&deps, "fsevents").scope, Scope::Optional);
    }

    #[test]
    fn test_v3_scoped_and_declared_scopes() {
        let content = r#"{"lockfileVersion": 3, "packages": {
            "node_modules/@babel/core": {"version": "7.23.0"},
            "node_modules/react": {"version": "18.2.0"},
            "node_modules/typescript": {"version": "5.3.3"}
        }}"#;
        let names = ManifestNameSets::new()
            .with_dev("@babel/core")
            .with_peer("react")
            .with_dev("typescript");
        let deps = parse_package_lock(content, &names, LockfileOptions::new());
        assert_eq!(deps.len(), 3);
        assert_eq!(find(&deps, "@babel/core").scope, Scope::Dev);
        assert_eq!(find(&deps, "react").scope, Scope::Peer);
    }

    #[test]
    fn test_v3_workspace_links() {
        let content = r#"{"lockfileVersion": 3, "packages": {
            "packages/my-lib": {"name": "my-lib", "version": "0.1.0"},
            "node_modules/my-lib": {"resolved": "packages/my-lib", "link": true}
        }}"#;
        let names = ManifestNameSets::new().with_prod("my-lib");
        let deps = parse_package_lock(content, &names, LockfileOptions::new());
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].metadata["link"], serde_json::json!(true));
    }

    #[test]
    fn test_v1_tree_default_is_top_level() {
        let content = r#"{"lockfileVersion": 1, "dependencies": {
            "express": {
                "version": "4.18.2",
                "dependencies": {"accepts": {"version": "1.3.8"}}
            },
            "jest": {"version": "29.7.0", "dev": true}
        }}"#;
        let names = ManifestNameSets::new().with_prod("express").with_dev("jest");
        let deps = parse_package_lock(content, &names, LockfileOptions::new());
        assert_eq!(deps.len(), 2);
        assert_eq!(find(&deps, "jest").scope, Scope::Dev);
        assert!(deps.iter().all(|d| d.direct));
    }

    #[test]
    fn test_v1_tree_transitive_recurses() {
        let content = r#"{"lockfileVersion": 1, "dependencies": {
            "express": {
                "version": "4.18.2",
                "dependencies": {
                    "accepts": {
                        "version": "1.3.8",
                        "dependencies": {"mime-types": {"version": "2.1.35"}}
                    },
                    "bundled-thing": {"version": "1.0.0", "bundled": true}
                }
            }
        }}"#;
        let options = LockfileOptions::new().with_transitive(true);
        let deps = parse_package_lock(content, &express_names(), options);
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["express", "accepts", "mime-types"]);
        assert!(!find(&deps, "mime-types").direct);
    }

    #[test]
    fn test_v1_tree_depth_is_bounded() {
        let mut content = String::from(r#"{"dependencies": "#);
        for i in 0..50 {
            content.push_str(&format!(r#"{{"pkg{}": {{"version": "1.0.0", "dependencies": "#, i));
        }
        content.push_str("{}");
        for _ in 0..50 {
            content.push_str("}}");
        }
        content.push('}');

        let options = LockfileOptions::new().with_transitive(true);
        let deps = parse_package_lock(&content, &ManifestNameSets::new(), options);
        assert_eq!(deps.len(), MAX_TREE_DEPTH);
    }

    #[test]
    fn test_invalid_json_is_empty() {
        let deps = parse_package_lock("{ not json", &express_names(), LockfileOptions::new());
        assert!(deps.is_empty());
    }

    #[test]
    fn test_empty_lockfile() {
        let deps = parse_package_lock(r#"{"lockfileVersion": 3}"#, &express_names(), LockfileOptions::new());
        assert!(deps.is_empty());
    }
}
