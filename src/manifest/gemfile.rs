//! Gemfile parser for Ruby projects
//!
//! Handles:
//! - gem declarations with and without a version constraint
//! - group blocks (`group :development, :test do ... end`), nested or not
//! - git, branch, path, platforms and `require: false` options

use crate::domain::{Dependency, Ecosystem, Scope};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const FILE_NAME: &str = "Gemfile";

static GEM_WITH_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^gem\s+['"]([^'"]+)['"]\s*,\s*['"]([^'"]+)['"]"#).unwrap()
});

static GEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^gem\s+['"]([^'"]+)['"]"#).unwrap());

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^group\s+(.+?)\s+do\b").unwrap());

// Any other block opener (`platforms :jruby do`, `source "..." do`)
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdo(\s*\|[^|]*\|)?$").unwrap());

// Statement openers closed by their own `end`; one-line forms are excluded by the caller
static KEYWORD_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(if|unless|case|while|until|begin)\b").unwrap());

static GROUP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

static GIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"git:\s*['"]([^'"]+)['"]"#).unwrap());

static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"branch:\s*['"]([^'"]+)['"]"#).unwrap());

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"path:\s*['"]([^'"]+)['"]"#).unwrap());

static PLATFORMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"platforms?:\s*\[([^\]]+)\]").unwrap());

/// Parser for Gemfile files
pub struct GemfileParser;

impl GemfileParser {
    /// Parses a Gemfile; lines that are not gem declarations are ignored
    pub fn parse_content(content: &str) -> Vec<Dependency> {
        let mut dependencies = Vec::new();
        // One frame per open block; non-group blocks push an empty frame
        let mut blocks: Vec<Vec<String>> = Vec::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = GROUP_RE.captures(line) {
                blocks.push(parse_group_names(&caps[1]));
                continue;
            }

            if line == "end" {
                blocks.pop();
                continue;
            }

            let keyword_block = KEYWORD_BLOCK_RE.is_match(line) && !line.ends_with(" end");
            if keyword_block || (!line.starts_with("gem") && BLOCK_RE.is_match(line)) {
                blocks.push(Vec::new());
                continue;
            }

            let (name, version) = if let Some(caps) = GEM_WITH_VERSION_RE.captures(line) {
                (caps[1].to_string(), caps[2].to_string())
            } else if let Some(caps) = GEM_RE.captures(line) {
                (caps[1].to_string(), "latest".to_string())
            } else {
                continue;
            };

            let groups: Vec<String> = blocks.iter().flatten().cloned().collect();
            let mut dep = Dependency::new(Ecosystem::Ruby, name, version)
                .with_scope(scope_for_groups(&groups))
                .with_direct(true)
                .with_source_file(FILE_NAME);
            add_metadata(&mut dep, line, groups);

            tracing::trace!("gemfile: {}", dep);
            dependencies.push(dep);
        }

        dependencies
    }
}

impl ManifestParser for GemfileParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        Ok(Self::parse_content(content))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
    }

    fn file_name(&self) -> &'static str {
        FILE_NAME
    }
}

fn clean_symbol(raw: &str) -> &str {
    raw.trim().trim_matches(':').trim_matches(['"', '\'']).trim()
}

fn parse_group_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(clean_symbol)
        .filter(|name| GROUP_NAME_RE.is_match(name))
        .map(str::to_string)
        .collect()
}

fn scope_for_groups(groups: &[String]) -> Scope {
    if groups.iter().any(|g| g == "test" || g == "development") {
        Scope::Dev
    } else {
        Scope::Prod
    }
}

fn add_metadata(dep: &mut Dependency, line: &str, groups: Vec<String>) {
    if !groups.is_empty() {
        dep.metadata.insert("groups".to_string(), Value::from(groups));
    }

    for (key, re) in [("git", &GIT_RE), ("branch", &BRANCH_RE), ("path", &PATH_RE)] {
        if let Some(caps) = re.captures(line) {
            dep.metadata
                .insert(key.to_string(), Value::from(caps[1].to_string()));
        }
    }

    if line.contains("require: false") || line.contains("require:false") {
        dep.metadata.insert("require".to_string(), Value::Bool(false));
    }

    if let Some(caps) = PLATFORMS_RE.captures(line) {
        let platforms: Vec<String> = caps[1]
            .split(',')
            .map(clean_symbol)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if !platforms.is_empty() {
            dep.metadata
                .insert("platforms".to_string(), Value::from(platforms));
        }
    }
}
