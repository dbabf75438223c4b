//! Normalized dependency records

use super::Ecosystem;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Free-form, ecosystem specific extras (git URL, branch, platforms, ...)
pub type Metadata = BTreeMap<String, Value>;

/// Usage classification of a dependency
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Production runtime dependency
    #[default]
    Prod,
    /// Development or test only
    Dev,
    /// Peer dependency provided by the host package
    Peer,
    /// Optional dependency
    Optional,
    /// Maven `system` scope
    System,
    /// Maven `import` scope (BOM imports)
    Import,
    /// Build-time only
    Build,
}

impl Scope {
    /// Returns the scope tag used in dependency records
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Prod => "prod",
            Scope::Dev => "dev",
            Scope::Peer => "peer",
            Scope::Optional => "optional",
            Scope::System => "system",
            Scope::Import => "import",
            Scope::Build => "build",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency as reported to downstream consumers
///
/// `version` is either a declared constraint (manifests) or the pinned
/// version (lockfiles), always in its normalized string form. It is never
/// required to be parseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Ecosystem tag
    pub ecosystem: Ecosystem,
    /// Ecosystem-qualified name (`@scope/name`, `group:artifact`, ...)
    pub name: String,
    /// Version string
    pub version: String,
    /// Usage scope
    pub scope: Scope,
    /// True if the manifest declares this name itself
    pub direct: bool,
    /// File the record was read from
    pub source_file: Option<String>,
    /// Descriptive extras, never used for equality or scope decisions
    pub metadata: Metadata,
}

impl Dependency {
    /// Creates a new production dependency that is not yet marked direct
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: version.into(),
            scope: Scope::Prod,
            direct: false,
            source_file: None,
            metadata: Metadata::new(),
        }
    }

    /// Sets the scope (builder pattern)
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the direct flag (builder pattern)
    pub fn with_direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }

    /// Sets the source file (builder pattern)
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Adds a metadata entry (builder pattern)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the `(type, name)` identity used for deduplication
    pub fn key(&self) -> (Ecosystem, &str) {
        (self.ecosystem, self.name.as_str())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.scope)
    }
}

/// Dependencies serialize as the compact record
/// `[type, name, version, scope, direct, metadata]`.
///
/// The source file travels inside the metadata object under `source`
/// unless the metadata already carries that key.
impl Serialize for Dependency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut metadata = self.metadata.clone();
        if let Some(ref source_file) = self.source_file {
            metadata
                .entry("source".to_string())
                .or_insert_with(|| Value::String(source_file.clone()));
        }

        let mut record = serializer.serialize_tuple(6)?;
        record.serialize_element(self.ecosystem.as_str())?;
        record.serialize_element(&self.name)?;
        record.serialize_element(&self.version)?;
        record.serialize_element(self.scope.as_str())?;
        record.serialize_element(&self.direct)?;
        record.serialize_element(&metadata)?;
        record.end()
    }
}
