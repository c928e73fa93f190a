use cadset_core::{Finding, FindingKind, Ledger, Severity};
use rustpython_parser::{ast, Parse};

use crate::rule::{default_rules, Rule};
use crate::types::CodeInput;

/// Parses `code` as a Python module. The error text is the parser's own.
pub fn parse_python(code: &str) -> Result<(), String> {
    ast::Suite::parse(code, "<record>").map(|_| ()).map_err(|e| e.to_string())
}

/// Side-effect free checks on one record's code.
pub struct StaticAnalyzer {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for StaticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticAnalyzer {
    pub fn new() -> Self {
        Self { rules: default_rules() }
    }

    /// Returns the stage's findings and whether the stage passed (no error-kind
    /// finding). A parse failure stops the stage: later rules assume parseable code.
    pub fn check(&self, input: &CodeInput<'_>) -> (Vec<Finding>, bool) {
        if let Err(e) = parse_python(input.code) {
            let f = Finding::new(input.line, FindingKind::SyntaxError, format!("Python syntax error: {e}"));
            return (vec![f], false);
        }
        let mut findings = Vec::new();
        for rule in &self.rules {
            let hits = rule.eval(input);
            if !hits.is_empty() {
                tracing::debug!(rule = rule.id(), line = input.line, count = hits.len(), "rule fired");
            }
            findings.extend(hits);
        }
        let passed = findings.iter().all(|f| f.severity() != Severity::Error);
        (findings, passed)
    }

    pub fn analyze(&self, line: usize, code: &str, ledger: &mut Ledger) -> bool {
        let (findings, passed) = self.check(&CodeInput::new(line, code));
        tracing::debug!(line, passed, findings = findings.len(), "static analysis");
        ledger.extend(findings);
        passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_short_circuits_parameter_audit() {
        let analyzer = StaticAnalyzer::new();
        let (findings, passed) = analyzer.check(&CodeInput::new(
            3,
            "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(-5, 10, 10\n",
        ));
        assert!(!passed);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::SyntaxError);
        assert!(findings[0].message.starts_with("Python syntax error"));
    }

    #[test]
    fn clean_code_passes_with_no_findings() {
        let analyzer = StaticAnalyzer::new();
        let (findings, passed) =
            analyzer.check(&CodeInput::new(1, "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)"));
        assert!(passed);
        assert!(findings.is_empty());
    }

    #[test]
    fn warnings_do_not_fail_the_stage() {
        let analyzer = StaticAnalyzer::new();
        let (findings, passed) =
            analyzer.check(&CodeInput::new(1, "import cadquery as cq\nresult = cq.Workplane().box(2000, 1, 1)"));
        assert!(passed);
        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::PatternWarning, FindingKind::ParameterWarning]);
    }

    #[test]
    fn missing_binding_fails_the_stage() {
        let mut ledger = Ledger::new();
        let passed = StaticAnalyzer::new().analyze(9, "import cadquery as cq\ncq.Workplane(\"XZ\").sphere(4)", &mut ledger);
        assert!(!passed);
        assert_eq!(ledger.count_of(FindingKind::StructureError), 1);
    }
}
