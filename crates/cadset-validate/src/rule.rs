use cadset_core::{Finding, FindingKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::params::NumericParameterRule;
use crate::types::CodeInput;

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn eval(&self, input: &CodeInput<'_>) -> Vec<Finding>;
}

static SETUP_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*import[ \t]+cadquery[ \t]+as[ \t]+cq\b").unwrap());
static RESULT_BINDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^result[ \t]*=[^=]").unwrap());
static STANDARD_WORKPLANE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"cq\.Workplane\(\s*["'](?:XY|YZ|ZX|XZ|YX|ZY)["']"#).unwrap());

pub fn has_setup_import(code: &str) -> bool {
    SETUP_IMPORT.is_match(code)
}

/// Top-level `result = ...` at the start of a line; indented bindings do not count.
pub fn has_result_binding(code: &str) -> bool {
    RESULT_BINDING.is_match(code)
}

pub fn has_standard_workplane(code: &str) -> bool {
    STANDARD_WORKPLANE.is_match(code)
}

/// Requires `import cadquery as cq`.
pub struct SetupImportRule;

impl Rule for SetupImportRule {
    fn id(&self) -> &str {
        "setup_import"
    }

    fn eval(&self, input: &CodeInput<'_>) -> Vec<Finding> {
        if has_setup_import(input.code) {
            return vec![];
        }
        vec![Finding::new(
            input.line,
            FindingKind::ImportError,
            "Missing required import: 'import cadquery as cq'",
        )]
    }
}

pub struct ResultBindingRule;

impl Rule for ResultBindingRule {
    fn id(&self) -> &str {
        "result_binding"
    }

    fn eval(&self, input: &CodeInput<'_>) -> Vec<Finding> {
        if has_result_binding(input.code) {
            return vec![];
        }
        vec![Finding::new(input.line, FindingKind::StructureError, "Missing 'result = ' assignment")]
    }
}

/// Advisory: at least one `cq.Workplane` on one of the six axis-pair planes.
pub struct WorkplanePatternRule;

impl Rule for WorkplanePatternRule {
    fn id(&self) -> &str {
        "workplane_pattern"
    }

    fn eval(&self, input: &CodeInput<'_>) -> Vec<Finding> {
        if has_standard_workplane(input.code) {
            return vec![];
        }
        vec![Finding::new(
            input.line,
            FindingKind::PatternWarning,
            "No standard CadQuery Workplane pattern found",
        )]
    }
}

/// Rules run after a successful parse, in reporting order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(SetupImportRule),
        Box::new(ResultBindingRule),
        Box::new(WorkplanePatternRule),
        Box::new(NumericParameterRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)";

    #[test]
    fn default_rule_ids_are_distinct() {
        let rules = default_rules();
        let ids: std::collections::BTreeSet<&str> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), rules.len());
        assert!(ids.contains("numeric_parameters"));
    }

    #[test]
    fn good_code_passes_every_structural_rule() {
        let input = CodeInput::new(1, GOOD);
        assert!(SetupImportRule.eval(&input).is_empty());
        assert!(ResultBindingRule.eval(&input).is_empty());
        assert!(WorkplanePatternRule.eval(&input).is_empty());
    }

    #[test]
    fn missing_import_is_an_import_error() {
        let findings = SetupImportRule.eval(&CodeInput::new(4, "result = cq.Workplane('XY')"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::ImportError);
        assert_eq!(findings[0].line, 4);
    }

    #[test]
    fn indented_or_compared_result_is_not_a_binding() {
        assert!(!has_result_binding("def f():\n    result = 1"));
        assert!(!has_result_binding("result == 3"));
        assert!(has_result_binding("x = 1\nresult=x"));
    }

    #[test]
    fn all_six_planes_are_recognised() {
        for plane in ["XY", "YZ", "ZX", "XZ", "YX", "ZY"] {
            assert!(has_standard_workplane(&format!("cq.Workplane('{plane}')")), "{plane}");
        }
        assert!(!has_standard_workplane("cq.Workplane()"));
        assert!(!has_standard_workplane("cq.Workplane(\"front\")"));
    }
}
