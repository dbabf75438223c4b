//! Maven `dependency:list` output parser
//!
//! Reads the file written by `mvn dependency:list -DoutputFile=dependency-list.txt`:
//!
//! ```text
//! The following files have been resolved:
//!    org.springframework.boot:spring-boot-starter-web:jar:4.0.1:compile -- module spring.boot.starter.web [auto]
//! ```
//!
//! The list does not say which artifacts the pom declares, so every record
//! is kept and marked non-direct.

use super::{DependencyFilter, LockfileOptions, RawPackage};
use crate::domain::{Dependency, Ecosystem, Scope};
use crate::manifest::ManifestNameSets;
use regex::Regex;
use std::sync::LazyLock;

const FILE_NAME: &str = "dependency-list.txt";

const HEADER: &str = "The following files have been resolved:";

// groupId:artifactId:type:version:scope, scope ends before ANSI codes or annotations
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+([^:]+):([^:]+):([^:]+):([^:]+):([^\s\[\x1b]+)").unwrap()
});

/// Parses `mvn dependency:list` output
pub fn parse_maven_dependency_list(content: &str) -> Vec<Dependency> {
    let records: Vec<RawPackage> = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.contains(HEADER))
        .filter_map(parse_line)
        .collect();

    tracing::debug!("{}: {} resolved artifacts", FILE_NAME, records.len());

    let options = LockfileOptions::new().with_transitive(true);
    DependencyFilter::new(Ecosystem::Maven, FILE_NAME, ManifestNameSets::new(), options)
        .apply(records)
}

fn parse_line(line: &str) -> Option<RawPackage> {
    let caps = DEPENDENCY_RE.captures(line)?;
    let group_id = caps[1].trim();
    let artifact_id = caps[2].trim();
    let packaging = caps[3].trim();
    let version = caps[4].trim();

    if group_id.is_empty() || artifact_id.is_empty() {
        return None;
    }

    let mut raw = RawPackage::new(format!("{}:{}", group_id, artifact_id), version)
        .with_scope(map_scope(caps[5].trim()));
    if !packaging.is_empty() && packaging != "jar" {
        raw = raw.with_metadata("type", packaging);
    }
    Some(raw.with_metadata("source", "dependency-list"))
}

fn map_scope(scope: &str) -> Scope {
    match scope {
        "test" => Scope::Dev,
        "system" => Scope::System,
        "import" => Scope::Import,
        _ => Scope::Prod,
    }
}
