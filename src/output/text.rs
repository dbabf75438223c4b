//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One aligned line per dependency with colored scope
//! - Direct vs transitive marker
//! - Lockfile header and a per-scope summary

use crate::domain::{Dependency, Scope};
use crate::output::{OutputFormatter, Verbosity};
use crate::scanner::ScanResult;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn colored_scope(scope: Scope) -> String {
        let label = format!("[{}]", scope);
        match scope {
            Scope::Prod => label.green().to_string(),
            Scope::Dev => label.yellow().to_string(),
            Scope::Peer => label.cyan().to_string(),
            Scope::Optional => label.magenta().to_string(),
            _ => label.blue().to_string(),
        }
    }

    fn marker(direct: bool) -> &'static str {
        if direct {
            "direct"
        } else {
            "transitive"
        }
    }

    /// Format a single dependency line
    fn format_dependency_line(
        &self,
        dep: &Dependency,
        max_name_len: usize,
        max_version_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.color {
            let name_display = format!("{:width$}", dep.name, width = max_name_len);
            let version_display = format!("{:width$}", dep.version, width = max_version_len);
            let marker = if dep.direct {
                Self::marker(true).bold().to_string()
            } else {
                Self::marker(false).dimmed().to_string()
            };
            write!(
                writer,
                "  {} {} {} {}",
                name_display.bold(),
                version_display.bright_white(),
                Self::colored_scope(dep.scope),
                marker
            )?;
        } else {
            write!(
                writer,
                "  {:name_width$} {:version_width$} [{}] {}",
                dep.name,
                dep.version,
                dep.scope,
                Self::marker(dep.direct),
                name_width = max_name_len,
                version_width = max_version_len
            )?;
        }

        if self.verbosity == Verbosity::Verbose && !dep.metadata.is_empty() {
            let metadata = serde_json::to_string(&dep.metadata).unwrap_or_default();
            if self.color {
                write!(writer, " {}", metadata.dimmed())?;
            } else {
                write!(writer, " {}", metadata)?;
            }
        }

        writeln!(writer)
    }

    /// Format the trailing summary: totals and counts per scope
    fn format_summary(&self, deps: &[Dependency], writer: &mut dyn Write) -> std::io::Result<()> {
        let direct = deps.iter().filter(|d| d.direct).count();
        let mut by_scope: BTreeMap<&'static str, usize> = BTreeMap::new();
        for dep in deps {
            *by_scope.entry(dep.scope.as_str()).or_default() += 1;
        }

        let breakdown: Vec<String> = by_scope
            .iter()
            .map(|(scope, count)| format!("{} {}", count, scope))
            .collect();

        let total = format!(
            "{} {}",
            deps.len(),
            if deps.len() == 1 {
                "dependency"
            } else {
                "dependencies"
            }
        );

        writeln!(writer)?;
        if self.color {
            write!(writer, "{}", total.bold())?;
        } else {
            write!(writer, "{}", total)?;
        }
        write!(writer, " ({} direct, {} transitive)", direct, deps.len() - direct)?;
        if !breakdown.is_empty() {
            write!(writer, ": {}", breakdown.join(", "))?;
        }
        writeln!(writer)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let path_display = result.lockfile.path.display().to_string();
        let kind_display = format!("({})", result.lockfile.kind.as_str());
        if self.color {
            writeln!(writer, "{} {}", path_display.bold(), kind_display.dimmed())?;
        } else {
            writeln!(writer, "{} {}", path_display, kind_display)?;
        }

        if self.verbosity == Verbosity::Verbose {
            let manifest = result
                .manifest
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string());
            writeln!(writer, "  manifest: {}", manifest)?;
        }

        if result.dependencies.is_empty() {
            writeln!(writer, "  no dependencies found")?;
            return Ok(());
        }

        let max_name_len = result
            .dependencies
            .iter()
            .map(|d| d.name.len())
            .max()
            .unwrap_or(0);
        let max_version_len = result
            .dependencies
            .iter()
            .map(|d| d.version.len())
            .max()
            .unwrap_or(0);

        for dep in &result.dependencies {
            self.format_dependency_line(dep, max_name_len, max_version_len, writer)?;
        }

        self.format_summary(&result.dependencies, writer)
    }
}
