//! Natural-language to code agreement. Phrasing is ambiguous, so everything
//! here is a `consistency_warning`, never an error.

use cadset_core::{Finding, FindingKind, Record};

use crate::numbers::{contains_number, millimetre_quantities, unsigned_literals};

/// Shape call and the input words that imply it.
pub const SHAPE_KEYWORDS: [(&str, &[&str]); 4] = [
    ("box", &["box", "cube", "rectangular", "square", "plate"]),
    ("cylinder", &["cylinder", "rod", "pipe", "circular"]),
    ("sphere", &["sphere", "ball"]),
    ("wedge", &["wedge", "triangular"]),
];

pub fn check(line: usize, record: &Record) -> Vec<Finding> {
    let input = record.input.to_lowercase();
    let output = record.output.to_lowercase();
    let mut out = dimension_findings(line, &input, &output);
    out.extend(shape_findings(line, &input, &output));
    out
}

fn dimension_findings(line: usize, input: &str, output: &str) -> Vec<Finding> {
    let literals = unsigned_literals(output);
    let mentions_diameter = input.contains("diameter");
    millimetre_quantities(input)
        .into_iter()
        .filter(|(_, dim)| {
            let verbatim = contains_number(&literals, *dim);
            let as_radius = mentions_diameter && contains_number(&literals, dim / 2.0);
            !(verbatim || as_radius)
        })
        .map(|(raw, _)| {
            Finding::new(
                line,
                FindingKind::ConsistencyWarning,
                format!("Dimension {raw}mm from input not found in output"),
            )
        })
        .collect()
}

fn shape_findings(line: usize, input: &str, output: &str) -> Vec<Finding> {
    SHAPE_KEYWORDS
        .iter()
        .filter(|(shape, words)| {
            words.iter().any(|w| input.contains(w)) && !output.contains(&format!(".{shape}("))
        })
        .map(|(shape, _)| {
            Finding::new(
                line,
                FindingKind::ConsistencyWarning,
                format!("Input mentions {shape} but output doesn't use .{shape}()"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(input: &str, output: &str) -> Record {
        Record { instruction: "Create a part".into(), input: input.into(), output: output.into() }
    }

    #[test]
    fn diameter_given_as_radius_is_accounted_for() {
        let r = record(
            "a 20mm diameter cylinder",
            "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(30, 10)",
        );
        assert!(check(1, &r).is_empty());
    }

    #[test]
    fn missing_diameter_and_radius_warns_once() {
        let r = record(
            "a 20mm diameter cylinder",
            "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(30, 7)",
        );
        let findings = check(2, &r);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Dimension 20mm from input not found in output");
    }

    #[test]
    fn half_dimension_without_diameter_wording_is_not_enough() {
        let r = record("a 20mm cube", "result = cq.Workplane(\"XY\").box(10, 10, 10)");
        assert_eq!(check(1, &r).len(), 1);
    }

    #[test]
    fn decimal_formatting_does_not_matter() {
        let r = record("a 10 mm ball", "result = cq.Workplane(\"XY\").sphere(10.0)");
        assert!(check(1, &r).is_empty());
    }

    #[test]
    fn shape_keyword_without_call_warns_per_shape() {
        let r = record("a square plate and a rod", "result = cq.Workplane(\"XY\").sphere(3)");
        let messages: Vec<_> = check(1, &r).into_iter().map(|f| f.message).collect();
        assert_eq!(
            messages,
            vec![
                "Input mentions box but output doesn't use .box()".to_string(),
                "Input mentions cylinder but output doesn't use .cylinder()".to_string(),
            ]
        );
    }

    #[test]
    fn keywords_match_anywhere_in_the_input() {
        let r = record(
            "a football-shaped knob on a nonrectangular base",
            "result = cq.Workplane(\"XY\").cylinder(3, 1)",
        );
        let messages: Vec<_> = check(1, &r).into_iter().map(|f| f.message).collect();
        assert_eq!(
            messages,
            vec![
                "Input mentions box but output doesn't use .box()".to_string(),
                "Input mentions sphere but output doesn't use .sphere()".to_string(),
            ]
        );

        let r = record("a product holder", "result = cq.Workplane(\"XY\").sphere(3)");
        let findings = check(1, &r);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Input mentions cylinder but output doesn't use .cylinder()");
    }
}
