//! Lockfile discovery and scanning
//!
//! This module provides:
//! - Lockfile detection: a directory is searched for known lockfile names in
//!   priority order, a file is matched by its name or a forced kind
//! - Manifest lookup: the manifest next to the lockfile supplies the
//!   declared name sets
//! - One scan call: detect, read names, parse
//!
//! A missing or unreadable manifest is not fatal. The scan goes on with empty
//! name sets and records a warning instead.

use crate::domain::Dependency;
use crate::error::AppError;
use crate::lockfile::{parse_lockfile, LockfileKind, LockfileOptions};
use crate::manifest::ManifestNameSets;
use std::fs;
use std::path::{Path, PathBuf};

/// A lockfile found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileInfo {
    /// Path to the lockfile
    pub path: PathBuf,
    /// Format used to parse it
    pub kind: LockfileKind,
}

impl LockfileInfo {
    pub fn new(path: impl Into<PathBuf>, kind: LockfileKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Path of the manifest expected next to this lockfile
    pub fn manifest_path(&self) -> Option<PathBuf> {
        let file_name = self.kind.manifest_file_name()?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        Some(dir.join(file_name))
    }
}

/// Result of scanning one lockfile
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// The lockfile that was parsed
    pub lockfile: LockfileInfo,
    /// Manifest that supplied the declared names, if one was read
    pub manifest: Option<PathBuf>,
    /// Normalized dependencies
    pub dependencies: Vec<Dependency>,
    /// Non-fatal problems met along the way
    pub warnings: Vec<String>,
}

/// Finds the lockfile to parse at `path`
///
/// With `forced` set, a directory is searched only for that kind's file name
/// and a file is parsed as that kind whatever its name.
pub fn detect_lockfile(path: &Path, forced: Option<LockfileKind>) -> Result<LockfileInfo, AppError> {
    if path.is_dir() {
        let candidates: Vec<LockfileKind> = match forced {
            Some(kind) => vec![kind],
            None => LockfileKind::all().to_vec(),
        };
        return candidates
            .into_iter()
            .map(|kind| LockfileInfo::new(path.join(kind.file_name()), kind))
            .find(|info| info.path.is_file())
            .ok_or_else(|| AppError::no_lockfile(path));
    }

    if !path.exists() {
        return Err(AppError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let by_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(LockfileKind::from_file_name);

    forced
        .or(by_name)
        .map(|kind| LockfileInfo::new(path, kind))
        .ok_or_else(|| AppError::no_lockfile(path))
}

/// Reads the declared name sets from the manifest next to `lockfile`
///
/// Returns `Ok(None)` when the format has no manifest or the file is absent.
pub fn read_name_sets(lockfile: &LockfileInfo) -> Result<Option<(PathBuf, ManifestNameSets)>, AppError> {
    let Some(manifest_path) = lockfile.manifest_path() else {
        return Ok(None);
    };
    if !manifest_path.is_file() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(&manifest_path).map_err(|e| AppError::io(&manifest_path, e))?;
    let file_name = lockfile.kind.manifest_file_name().unwrap_or_default();
    let names = ManifestNameSets::from_manifest(file_name, &content)?;
    tracing::debug!(
        "{}: {} declared names",
        manifest_path.display(),
        names.all_names().len()
    );
    Ok(Some((manifest_path, names)))
}

/// Scanner configured with lockfile options
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: LockfileOptions,
    forced: Option<LockfileKind>,
}

impl Scanner {
    /// Create a scanner with default options
    pub fn new(options: LockfileOptions) -> Self {
        Self {
            options,
            forced: None,
        }
    }

    /// Parse every lockfile as `kind` instead of detecting it
    pub fn with_kind(mut self, kind: Option<LockfileKind>) -> Self {
        self.forced = kind;
        self
    }

    /// Detects, reads and parses the lockfile at `path`
    pub fn scan(&self, path: &Path) -> Result<ScanResult, AppError> {
        let lockfile = detect_lockfile(path, self.forced)?;
        tracing::debug!("{}: parsing as {}", lockfile.path.display(), lockfile.kind.as_str());

        let mut warnings = Vec::new();
        let (manifest, names) = match read_name_sets(&lockfile) {
            Ok(Some((manifest_path, names))) => (Some(manifest_path), names),
            Ok(None) => {
                if let Some(expected) = lockfile.manifest_path() {
                    warnings.push(format!(
                        "{} not found; no package counts as direct",
                        expected.display()
                    ));
                }
                (None, ManifestNameSets::new())
            }
            Err(e) => {
                warnings.push(format!("{}; no package counts as direct", e));
                (None, ManifestNameSets::new())
            }
        };

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        let content = fs::read(&lockfile.path).map_err(|e| AppError::io(&lockfile.path, e))?;
        let dependencies = parse_lockfile(lockfile.kind, &content, &names, self.options);

        Ok(ScanResult {
            lockfile,
            manifest,
            dependencies,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_detect_lockfile_in_directory() {
        let dir = project(&[("yarn.lock", ""), ("Gemfile.lock", "")]);
        let info = detect_lockfile(dir.path(), None).unwrap();
        assert_eq!(info.kind, LockfileKind::YarnLock);
        assert_eq!(info.path, dir.path().join("yarn.lock"));
    }

    #[test]
    fn test_detect_lockfile_forced_in_directory() {
        let dir = project(&[("yarn.lock", ""), ("Gemfile.lock", "")]);
        let info = detect_lockfile(dir.path(), Some(LockfileKind::GemfileLock)).unwrap();
        assert_eq!(info.kind, LockfileKind::GemfileLock);
    }

    #[test]
    fn test_detect_lockfile_empty_directory() {
        let dir = project(&[]);
        let err = detect_lockfile(dir.path(), None).unwrap_err();
        assert!(matches!(err, AppError::NoLockfile { .. }));
    }

    #[test]
    fn test_detect_lockfile_by_file_name() {
        let dir = project(&[("pnpm-lock.yaml", "")]);
        let info = detect_lockfile(&dir.path().join("pnpm-lock.yaml"), None).unwrap();
        assert_eq!(info.kind, LockfileKind::PnpmLock);
    }

    #[test]
    fn test_detect_lockfile_forced_file() {
        let dir = project(&[("deps.txt", "")]);
        let path = dir.path().join("deps.txt");
        assert!(detect_lockfile(&path, None).is_err());
        let info = detect_lockfile(&path, Some(LockfileKind::MavenDependencyList)).unwrap();
        assert_eq!(info.kind, LockfileKind::MavenDependencyList);
    }

    #[test]
    fn test_detect_lockfile_missing_path() {
        let dir = project(&[]);
        let err = detect_lockfile(&dir.path().join("nope.lock"), None).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn test_manifest_path() {
        let info = LockfileInfo::new("/work/app/Gemfile.lock", LockfileKind::GemfileLock);
        assert_eq!(info.manifest_path(), Some(PathBuf::from("/work/app/Gemfile")));
        let info = LockfileInfo::new("dependency-list.txt", LockfileKind::MavenDependencyList);
        assert_eq!(info.manifest_path(), None);
    }

    #[test]
    fn test_scan_with_manifest() {
        let dir = project(&[
            ("package.json", r#"{"dependencies": {"express": "^4.18.0"}}"#),
            (
                "package-lock.json",
                r#"{"lockfileVersion": 3, "packages": {
                    "": {"name": "app"},
                    "node_modules/express": {"version": "4.18.2"},
                    "node_modules/accepts": {"version": "1.3.8"}
                }}"#,
            ),
        ]);
        let result = Scanner::new(LockfileOptions::new()).scan(dir.path()).unwrap();
        assert_eq!(result.lockfile.kind, LockfileKind::NpmLock);
        assert_eq!(result.manifest, Some(dir.path().join("package.json")));
        assert!(result.warnings.is_empty());
        assert_eq!(result.dependencies.len(), 1);
        assert_eq!(result.dependencies[0].name, "express");
    }

    #[test]
    fn test_scan_without_manifest_warns() {
        let dir = project(&[("Gemfile.lock", "GEM\n  specs:\n    rake (13.1.0)\n\nDEPENDENCIES\n  rake\n")]);
        let result = Scanner::new(LockfileOptions::new()).scan(dir.path()).unwrap();
        assert!(result.manifest.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Gemfile"));
        // Gemfile.lock carries its own direct set
        assert_eq!(result.dependencies.len(), 1);
    }

    #[test]
    fn test_scan_with_broken_manifest_warns() {
        let dir = project(&[
            ("package.json", "{ not json"),
            ("yarn.lock", "lodash@^4.17.21:\n  version \"4.17.21\"\n"),
        ]);
        let scanner = Scanner::new(LockfileOptions::new().with_transitive(true));
        let result = scanner.scan(dir.path()).unwrap();
        assert!(result.manifest.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.dependencies.len(), 1);
        assert!(!result.dependencies[0].direct);
    }

    #[test]
    fn test_scan_forced_kind() {
        let dir = project(&[("out.txt", "   junit:junit:jar:4.13.2:test\n")]);
        let scanner = Scanner::new(LockfileOptions::new()).with_kind(Some(LockfileKind::MavenDependencyList));
        let result = scanner.scan(&dir.path().join("out.txt")).unwrap();
        assert_eq!(result.dependencies.len(), 1);
        assert!(result.warnings.is_empty());
    }
}
