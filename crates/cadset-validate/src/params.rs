//! Numeric parameter auditor.
//!
//! Best-effort textual scan: a call's argument list runs from the name's `(`
//! to the first `)`, so nested calls (`box(f(1), 2)`) truncate the list and a
//! same-named call nested inside another is audited on its own span as well.
//! A binary minus inside the arguments reads as a negative literal.

use cadset_core::{Finding, FindingKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::numbers::{format_number, signed_literals};
use crate::rule::Rule;
use crate::types::CodeInput;

/// Above this a primitive's size is probably in the wrong unit.
pub const LARGE_DIMENSION: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Constraint {
    /// Positive, and warn past [`LARGE_DIMENSION`].
    Dimension,
    /// Fillet and chamfer radii.
    EdgeRadius,
    HoleDiameter,
    Unchecked,
}

const RECOGNISED_CALLS: [(&str, Constraint); 11] = [
    ("box", Constraint::Dimension),
    ("cylinder", Constraint::Dimension),
    ("sphere", Constraint::Dimension),
    ("hole", Constraint::HoleDiameter),
    ("fillet", Constraint::EdgeRadius),
    ("chamfer", Constraint::EdgeRadius),
    ("translate", Constraint::Unchecked),
    ("rotate", Constraint::Unchecked),
    ("rarray", Constraint::Unchecked),
    ("polarArray", Constraint::Unchecked),
    ("cboreHole", Constraint::Unchecked),
];

static CALL_PATTERNS: Lazy<Vec<(&'static str, Constraint, Regex)>> = Lazy::new(|| {
    RECOGNISED_CALLS
        .iter()
        .map(|(name, c)| (*name, *c, Regex::new(&format!(r"\b{name}\s*\([^)]*\)")).unwrap()))
        .collect()
});

pub struct NumericParameterRule;

impl Rule for NumericParameterRule {
    fn id(&self) -> &str {
        "numeric_parameters"
    }

    fn eval(&self, input: &CodeInput<'_>) -> Vec<Finding> {
        let mut out = vec![];
        for (name, constraint, pattern) in CALL_PATTERNS.iter() {
            for call in pattern.find_iter(input.code) {
                for value in signed_literals(call.as_str()) {
                    if let Some(f) = judge(input.line, name, *constraint, value) {
                        out.push(f);
                    }
                }
            }
        }
        out
    }
}

fn judge(line: usize, name: &str, constraint: Constraint, value: f64) -> Option<Finding> {
    let shown = format_number(value);
    match constraint {
        Constraint::Dimension if value <= 0.0 => Some(Finding::new(
            line,
            FindingKind::ParameterError,
            format!("Dimension parameter {shown} should be positive in {name}()"),
        )),
        Constraint::Dimension if value > LARGE_DIMENSION => Some(Finding::new(
            line,
            FindingKind::ParameterWarning,
            format!("Large dimension parameter {shown} in {name}() - verify units"),
        )),
        Constraint::EdgeRadius if value <= 0.0 => Some(Finding::new(
            line,
            FindingKind::ParameterError,
            format!("Fillet/chamfer radius {shown} must be positive"),
        )),
        Constraint::HoleDiameter if value <= 0.0 => Some(Finding::new(
            line,
            FindingKind::ParameterError,
            format!("Hole diameter {shown} must be positive"),
        )),
        _ => None,
    }
}
