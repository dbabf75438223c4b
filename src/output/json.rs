//! JSON output formatter for machine processing
//!
//! Writes a JSON array with one compact record per line:
//!
//! ```text
//! [
//!   ["npm","express","4.18.2","prod",true,{"source":"package-lock.json"}]
//! ]
//! ```

use crate::output::OutputFormatter;
use crate::scanner::ScanResult;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.dependencies.is_empty() {
            return writeln!(writer, "[]");
        }

        writeln!(writer, "[")?;
        let last = result.dependencies.len() - 1;
        for (i, dep) in result.dependencies.iter().enumerate() {
            let record = serde_json::to_string(dep)?;
            let separator = if i == last { "" } else { "," };
            writeln!(writer, "  {}{}", record, separator)?;
        }
        writeln!(writer, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, Ecosystem, Scope};
    use crate::lockfile::LockfileKind;
    use crate::scanner::LockfileInfo;
    use serde_json::{json, Value};

    fn render(dependencies: Vec<Dependency>) -> String {
        let result = ScanResult {
            lockfile: LockfileInfo::new("Gemfile.lock", LockfileKind::GemfileLock),
            manifest: None,
            dependencies,
            warnings: Vec::new(),
        };
        let mut output = Vec::new();
        JsonFormatter::new().format(&result, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_json_records() {
        let output = render(vec![
            Dependency::new(Ecosystem::Ruby, "rails", "7.1.0")
                .with_direct(true)
                .with_source_file("Gemfile.lock"),
            Dependency::new(Ecosystem::Ruby, "rspec", "3.12.0").with_scope(Scope::Dev),
        ]);

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!([
                ["ruby", "rails", "7.1.0", "prod", true, {"source": "Gemfile.lock"}],
                ["ruby", "rspec", "3.12.0", "dev", false, {}]
            ])
        );
        assert_eq!(output.lines().count(), 4);
    }

    #[test]
    fn test_json_empty() {
        let output = render(Vec::new());
        assert_eq!(output, "[]\n");
    }
}
