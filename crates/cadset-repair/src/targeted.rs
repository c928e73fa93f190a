//! Fixes aimed at one finding kind at a time, selected with `--issues`.

use std::path::Path;

use anyhow::{Context, Result};
use cadset_core::FindingKind;
use cadset_validate::numbers::{format_number, same_number};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::backup::write_lines;
use crate::pass::RepairSummary;

static DIAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*mm.*diameter").unwrap());
const DIAMETER_NOTE: &str = "# Diameter";

/// Parses `kind1,kind2`. Names that are not finding kinds, or kinds without a
/// targeted fix, are logged and ignored.
pub fn parse_issues(spec: &str) -> Vec<FindingKind> {
    let mut kinds = Vec::new();
    for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match FindingKind::parse(name) {
            Some(kind) if has_targeted_fix(kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Some(kind) => tracing::warn!(%kind, "no targeted fix for this issue kind"),
            None => tracing::warn!(issue = name, "unknown issue kind"),
        }
    }
    kinds
}

pub fn has_targeted_fix(kind: FindingKind) -> bool {
    matches!(kind, FindingKind::ConsistencyWarning | FindingKind::ParameterError)
}

/// Annotates the cylinder call that carries the radius of a diameter given in
/// the input. Returns the new code, or `None` when nothing applies.
pub fn annotate_diameter(input: &str, code: &str) -> Option<String> {
    let input = input.to_lowercase();
    if code.contains(DIAMETER_NOTE) {
        return None;
    }
    let diameter: f64 = DIAMETER.captures(&input)?.get(1)?.as_str().parse().ok()?;
    let radius = diameter / 2.0;

    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();
    let target = lines.iter().position(|l| {
        !l.trim_end().ends_with('\\') && first_cylinder_arg(l).is_some_and(|r| same_number(r, radius))
    })?;
    let note = format!("  {DIAMETER_NOTE} {}mm = radius {}mm", format_number(diameter), format_number(radius));
    lines[target].push_str(&note);
    Some(lines.join("\n"))
}

fn first_cylinder_arg(line: &str) -> Option<f64> {
    let start = line.find("cylinder(")? + "cylinder(".len();
    let rest = &line[start..];
    let end = rest.find(|c: char| c == ',' || c == ')').unwrap_or(rest.len());
    rest[..end].trim().parse().ok()
}

fn apply(obj: &mut Map<String, Value>, kinds: &[FindingKind], line: usize) {
    for kind in kinds {
        match kind {
            FindingKind::ConsistencyWarning => {
                let (Some(Value::String(input)), Some(Value::String(code))) = (obj.get("input"), obj.get("output")) else {
                    continue;
                };
                if let Some(fixed) = annotate_diameter(input, code) {
                    obj.insert("output".to_string(), Value::String(fixed));
                }
            }
            // Parameter values need a human; they are reported, never rewritten.
            FindingKind::ParameterError => tracing::debug!(line, "parameter issues left for manual review"),
            _ => {}
        }
    }
}

pub fn fix_issues_text(text: &str, kinds: &[FindingKind]) -> (Vec<String>, RepairSummary) {
    let mut out = Vec::new();
    let mut summary = RepairSummary::default();
    for (idx, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let mut value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => {
                summary.dropped += 1;
                continue;
            }
        };
        if let Value::Object(obj) = &mut value {
            apply(obj, kinds, idx + 1);
        }
        let fixed = value.to_string();
        if fixed != raw {
            tracing::debug!(line = idx + 1, "fixed specific issues");
            summary.changed += 1;
        }
        out.push(fixed);
    }
    (out, summary)
}

/// Rewrites the store in place. The caller takes the backup.
pub fn fix_issues_file(path: &Path, kinds: &[FindingKind]) -> Result<RepairSummary> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let (lines, summary) = fix_issues_text(&text, kinds);
    write_lines(path, &lines)?;
    tracing::info!(changed = summary.changed, dropped = summary.dropped, "targeted fixes complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_issue_kinds_only() {
        assert_eq!(
            parse_issues("consistency_warning, parameter_error,bogus,json_error,consistency_warning"),
            vec![FindingKind::ConsistencyWarning, FindingKind::ParameterError]
        );
        assert!(parse_issues("").is_empty());
    }

    #[test]
    fn annotates_the_radius_line() {
        let code = "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(10, 40)";
        let fixed = annotate_diameter("A 20mm diameter rod", code).unwrap();
        assert_eq!(
            fixed,
            "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(10, 40)  # Diameter 20mm = radius 10mm"
        );
        assert!(annotate_diameter("A 20mm diameter rod", &fixed).is_none());
    }

    #[test]
    fn fractional_radius_matches_numerically() {
        let code = "result = cq.Workplane(\"XY\").cylinder(2.5, 8)";
        let fixed = annotate_diameter("5mm diameter pin", code).unwrap();
        assert!(fixed.ends_with("# Diameter 5mm = radius 2.5mm"));
    }

    #[test]
    fn no_diameter_or_no_match_is_untouched() {
        let code = "result = cq.Workplane(\"XY\").cylinder(10, 40)";
        assert!(annotate_diameter("a 20mm tall rod", code).is_none());
        assert!(annotate_diameter("a 30mm diameter rod", code).is_none());
    }

    #[test]
    fn invalid_lines_are_dropped_and_changes_counted() {
        let text = concat!(
            r#"{"instruction":"Make a rod","input":"a 20mm diameter rod","output":"result = cq.Workplane(\"XY\").cylinder(10, 40)"}"#,
            "\n{broken\n",
            r#"{"instruction":"Make a box","input":"a box","output":"result = cq.Workplane(\"XY\").box(1, 1, 1)"}"#,
            "\n",
        );
        let (lines, summary) = fix_issues_text(text, &[FindingKind::ConsistencyWarning]);
        assert_eq!(summary, RepairSummary { changed: 1, dropped: 1 });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("# Diameter 20mm = radius 10mm"));
    }

    #[test]
    fn parameter_issues_change_nothing() {
        let raw = r#"{"instruction":"Make a box","input":"a box","output":"result = cq.Workplane(\"XY\").box(-1, 1, 1)"}"#;
        let (lines, summary) = fix_issues_text(raw, &[FindingKind::ParameterError]);
        assert_eq!(summary, RepairSummary::default());
        assert_eq!(lines, vec![raw.to_string()]);
    }
}
