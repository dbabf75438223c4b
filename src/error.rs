//! Error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: A version string violates its ecosystem's grammar
//! - LockfileError: A lockfile could not be decoded into its expected shape
//! - ManifestError: A manifest could not be read for its declared names
//! - AppError: Binary-level failures (IO, nothing to parse)
//!
//! Lockfile errors never leave the public parsing functions: they are logged
//! and turned into an empty dependency list.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type used by the binary
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Failed to read an input file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No supported lockfile was found at the given location
    #[error("no supported lockfile found at {path}")]
    NoLockfile { path: PathBuf },
}

/// Errors produced when a version string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The version does not match the system's grammar
    #[error("{system} version parse error: {version}: {reason}")]
    Parse {
        system: String,
        version: String,
        reason: String,
    },
}

/// Structural errors while decoding a lockfile
#[derive(Error, Debug)]
pub enum LockfileError {
    /// JSON decoding error (package-lock.json)
    #[error("failed to parse JSON in {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// YAML decoding error (pnpm-lock.yaml)
    #[error("failed to parse YAML in {file}: {source}")]
    Yaml {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document decoded but does not have the expected layout
    #[error("unexpected layout in {file}: {message}")]
    UnexpectedShape { file: &'static str, message: String },
}

/// Errors related to reading declared names from manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    /// JSON parsing error (for package.json)
    #[error("failed to parse JSON in {path}: {message}")]
    Json { path: PathBuf, message: String },

    /// The manifest has no reader
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

impl VersionError {
    /// Creates a new Parse error
    pub fn parse(
        system: impl Into<String>,
        version: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        VersionError::Parse {
            system: system.into(),
            version: version.into(),
            reason: reason.into(),
        }
    }
}

impl LockfileError {
    /// Creates a new UnexpectedShape error
    pub fn unexpected_shape(file: &'static str, message: impl Into<String>) -> Self {
        LockfileError::UnexpectedShape {
            file,
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new Json error
    pub fn json(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::Json {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new NoLockfile error
    pub fn no_lockfile(path: impl Into<PathBuf>) -> Self {
        AppError::NoLockfile { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_message() {
        let err = VersionError::parse("PyPI", "a!1.0", "invalid epoch: a");
        let msg = format!("{}", err);
        assert_eq!(msg, "PyPI version parse error: a!1.0: invalid epoch: a");
    }

    #[test]
    fn test_version_error_fields() {
        let VersionError::Parse {
            system,
            version,
            reason,
        } = VersionError::parse("npm", "abc", "invalid major version: abc");
        assert_eq!(system, "npm");
        assert_eq!(version, "abc");
        assert!(reason.contains("major"));
    }

    #[test]
    fn test_lockfile_error_json() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LockfileError::Json {
            file: "package-lock.json",
            source,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("package-lock.json"));
    }

    #[test]
    fn test_lockfile_error_unexpected_shape() {
        let err = LockfileError::unexpected_shape("pnpm-lock.yaml", "no root importer");
        let msg = format!("{}", err);
        assert!(msg.contains("unexpected layout"));
        assert!(msg.contains("no root importer"));
    }

    #[test]
    fn test_manifest_error_json() {
        let err = ManifestError::json("package.json", "expected value");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::UnsupportedFormat {
            path: PathBuf::from("build.sbt"),
        }
        .into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("unsupported manifest format"));
    }

    #[test]
    fn test_app_error_no_lockfile() {
        let err = AppError::no_lockfile("/tmp/project");
        assert!(format!("{}", err).contains("no supported lockfile"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = VersionError::parse("npm", "", "empty version string");
        let debug = format!("{:?}", err);
        assert!(debug.contains("Parse"));
    }
}
