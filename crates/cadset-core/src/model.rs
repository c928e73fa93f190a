use serde::{Deserialize, Serialize};

use crate::types::{FindingKind, Severity, Verdict};

/// Line number used for findings about the dataset file as a whole.
pub const WHOLE_FILE: usize = 0;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn new(line: usize, kind: FindingKind, message: impl Into<String>) -> Self {
        Self { line, kind, message: message.into() }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Append-only error/warning lists for one validation run.
///
/// Findings are routed by the severity of their kind and keep discovery order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn record(&mut self, line: usize, kind: FindingKind, message: impl Into<String>) {
        self.push(Finding::new(line, kind, message));
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for f in findings {
            self.push(f);
        }
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn verdict(&self) -> Verdict {
        if !self.errors.is_empty() {
            Verdict::Failed
        } else if !self.warnings.is_empty() {
            Verdict::ReadyWithWarnings
        } else {
            Verdict::Pass
        }
    }

    pub fn count_of(&self, kind: FindingKind) -> usize {
        let list = match kind.severity() {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
        };
        list.iter().filter(|f| f.kind == kind).count()
    }
}
