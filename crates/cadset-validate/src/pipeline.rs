use std::path::{Path, PathBuf};

use cadset_core::{FindingKind, Ledger, Record, WHOLE_FILE};
use cadset_sandbox::Sandbox;
use serde_json::Value;

use crate::analyzer::StaticAnalyzer;
use crate::consistency;
use crate::report::Report;
use crate::schema;

/// One pass over a dataset.
///
/// Dynamic execution is on exactly when a sandbox is supplied; the caller
/// decides that once, at startup.
pub struct ValidationRun {
    ledger: Ledger,
    analyzer: StaticAnalyzer,
    sandbox: Option<Sandbox>,
    total_lines: usize,
}

impl ValidationRun {
    pub fn new(sandbox: Option<Sandbox>) -> Self {
        Self { ledger: Ledger::new(), analyzer: StaticAnalyzer::new(), sandbox, total_lines: 0 }
    }

    pub fn static_only() -> Self {
        Self::new(None)
    }

    pub fn dynamic_enabled(&self) -> bool {
        self.sandbox.is_some()
    }

    pub fn validate_path(mut self, path: &Path) -> Report {
        tracing::info!(path = %path.display(), dynamic = self.dynamic_enabled(), "validating dataset");
        match std::fs::read_to_string(path) {
            Ok(text) => self.validate_text(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.ledger.record(WHOLE_FILE, FindingKind::FileError, format!("Dataset file not found: {}", path.display()))
            }
            Err(e) => self.ledger.record(
                WHOLE_FILE,
                FindingKind::FileError,
                format!("Dataset file unreadable: {}: {e}", path.display()),
            ),
        }
        self.finish(path.to_path_buf())
    }

    pub fn validate_text(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().collect();
        // Blank lines after the last record are tolerated.
        let last_content = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(0, |i| i + 1);
        for (idx, raw) in lines.iter().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                if line < last_content {
                    self.ledger.record(line, FindingKind::EmptyLine, "Empty line found");
                }
                continue;
            }
            self.total_lines += 1;
            self.validate_line(line, raw.trim());
        }
    }

    /// Runs every stage for one line. Code is executed only when the static
    /// stage passed and no earlier stage (schema, content) recorded an error on
    /// this record, so a record missing a field or with an empty field never runs.
    fn validate_line(&mut self, line: usize, raw: &str) {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                self.ledger.record(line, FindingKind::JsonError, format!("Invalid JSON: {e}"));
                return;
            }
        };

        let errors_before = self.ledger.error_count();
        let Some(obj) = schema::check_schema(line, &value, &mut self.ledger) else {
            return;
        };
        schema::check_content(line, obj, &mut self.ledger);

        if let Some(Value::String(code)) = obj.get("output") {
            if !code.trim().is_empty() {
                let static_passed = self.analyzer.analyze(line, code, &mut self.ledger);
                let record_clean = self.ledger.error_count() == errors_before;
                match &self.sandbox {
                    Some(sandbox) if static_passed && record_clean => sandbox.run(line, code, &mut self.ledger),
                    Some(_) => tracing::debug!(line, "skipping dynamic check: record has errors"),
                    None => {}
                }
            }
        }

        if let Ok(record) = Record::from_value(&value) {
            self.ledger.extend(consistency::check(line, &record));
        }
    }

    /// Ends the run. Dropping the sandbox here removes the scratch directory.
    pub fn finish(self, dataset: PathBuf) -> Report {
        let dynamic = self.dynamic_enabled();
        Report::new(dataset, self.total_lines, dynamic, self.ledger)
    }
}
