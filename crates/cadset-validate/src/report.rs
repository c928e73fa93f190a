use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use cadset_core::{Finding, FindingKind, Ledger, Verdict, WHOLE_FILE};
use serde::Serialize;

const RULE: &str = "============================================================";
const SUBRULE: &str = "----------------------------------------";

/// Read-only summary of a finished run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub dataset: PathBuf,
    pub total_lines: usize,
    pub dynamic: bool,
    pub verdict: Verdict,
    pub error_tally: BTreeMap<FindingKind, usize>,
    pub warning_tally: BTreeMap<FindingKind, usize>,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Report {
    pub fn new(dataset: PathBuf, total_lines: usize, dynamic: bool, ledger: Ledger) -> Self {
        let verdict = ledger.verdict();
        let errors = sorted_by_line(ledger.errors());
        let warnings = sorted_by_line(ledger.warnings());
        Self {
            dataset,
            total_lines,
            dynamic,
            verdict,
            error_tally: tally(&errors),
            warning_tally: tally(&warnings),
            errors,
            warnings,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "\n{RULE}");
        let _ = writeln!(s, "DATASET VALIDATION REPORT");
        let _ = writeln!(s, "{RULE}");
        let _ = writeln!(s, "Dataset: {}", self.dataset.display());
        let _ = writeln!(s, "Total lines processed: {}", self.total_lines);
        let _ = writeln!(s, "Dynamic validation: {}", if self.dynamic { "ENABLED" } else { "DISABLED" });
        let _ = writeln!(s, "Errors found: {}", self.errors.len());
        let _ = writeln!(s, "Warnings found: {}", self.warnings.len());

        if !self.errors.is_empty() {
            section(&mut s, "ERRORS (must be fixed):", "Error Summary:", &self.errors, &self.error_tally);
        }
        if !self.warnings.is_empty() {
            section(&mut s, "WARNINGS (should be reviewed):", "Warning Summary:", &self.warnings, &self.warning_tally);
        }

        match self.verdict {
            Verdict::Pass => {
                let _ = writeln!(s, "\nDATASET VALIDATION PASSED! All validations successful.");
                if self.dynamic {
                    let _ = writeln!(s, "Geometry generation and STL export: ALL SUCCESSFUL");
                }
                let _ = writeln!(s, "Ready for production training!");
            }
            Verdict::ReadyWithWarnings => {
                let _ = writeln!(s, "\nDATASET READY! No critical errors found.");
                if self.dynamic {
                    let _ = writeln!(s, "All code executes successfully and generates valid geometry");
                }
                let _ = writeln!(s, "Please review {} warnings for optimization", self.warnings.len());
            }
            Verdict::Failed => {
                let _ = writeln!(s, "\nVALIDATION FAILED! Please fix {} critical errors.", self.errors.len());
                let _ = writeln!(s, "Consider using the automatic fixer: cadset fix");
            }
        }
        let _ = writeln!(s, "{RULE}");
        s
    }
}

fn section(s: &mut String, title: &str, summary: &str, findings: &[Finding], tally: &BTreeMap<FindingKind, usize>) {
    let _ = writeln!(s, "\n{title}");
    let _ = writeln!(s, "{SUBRULE}");
    for f in findings {
        let _ = writeln!(s, "{}: [{}] {}", line_label(f.line), f.kind, f.message);
    }
    let _ = writeln!(s, "\n{summary}");
    for (kind, count) in tally {
        let _ = writeln!(s, "- {kind}: {count} occurrences");
    }
}

fn line_label(line: usize) -> String {
    if line == WHOLE_FILE {
        "File    ".to_string()
    } else {
        format!("Line {line:3}")
    }
}

// Stable: findings on one line keep their discovery order.
fn sorted_by_line(findings: &[Finding]) -> Vec<Finding> {
    let mut v = findings.to_vec();
    v.sort_by_key(|f| f.line);
    v
}

fn tally(findings: &[Finding]) -> BTreeMap<FindingKind, usize> {
    let mut out = BTreeMap::new();
    for f in findings {
        *out.entry(f.kind).or_insert(0) += 1;
    }
    out
}
