//! package.json parser for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies

use crate::domain::{Dependency, Ecosystem, Scope};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::version::normalize_npm_spec;
use serde_json::{Map, Value};

const FILE_NAME: &str = "package.json";

/// Parser for package.json files
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let json: Value =
            serde_json::from_str(content).map_err(|e| ManifestError::json(FILE_NAME, e.to_string()))?;

        let mut dependencies = Vec::new();

        for (key, scope) in [
            ("dependencies", Scope::Prod),
            ("devDependencies", Scope::Dev),
            ("peerDependencies", Scope::Peer),
            ("optionalDependencies", Scope::Optional),
        ] {
            if let Some(deps) = json.get(key).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, scope, &mut dependencies);
            }
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn file_name(&self) -> &'static str {
        FILE_NAME
    }
}

fn parse_dependency_object(deps: &Map<String, Value>, scope: Scope, output: &mut Vec<Dependency>) {
    for (name, spec) in deps {
        // Non-string values (objects, numbers) are not valid specifiers
        let Some(spec) = spec.as_str() else {
            continue;
        };
        output.push(
            Dependency::new(Ecosystem::Npm, name.clone(), normalize_npm_spec(spec))
                .with_scope(scope)
                .with_direct(true)
                .with_source_file(FILE_NAME),
        );
    }
}
