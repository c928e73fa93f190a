//! Numeric literal scanning shared by the auditor, the consistency checker and
//! the repair tool. These are textual scans, not expression evaluation.

use once_cell::sync::Lazy;
use regex::Regex;

static SIGNED: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());
static UNSIGNED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static MILLIMETRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*mm").unwrap());

/// Optionally signed literals. A binary minus (`x-5`) reads as `-5`.
pub fn signed_literals(text: &str) -> Vec<f64> {
    SIGNED.find_iter(text).filter_map(|m| m.as_str().parse().ok()).collect()
}

pub fn unsigned_literals(text: &str) -> Vec<f64> {
    UNSIGNED.find_iter(text).filter_map(|m| m.as_str().parse().ok()).collect()
}

/// `(source text, value)` for every `<number> mm` quantity.
pub fn millimetre_quantities(text: &str) -> Vec<(String, f64)> {
    MILLIMETRES
        .captures_iter(text)
        .filter_map(|c| {
            let raw = c.get(1)?.as_str();
            raw.parse().ok().map(|v| (raw.to_string(), v))
        })
        .collect()
}

pub fn same_number(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= 1e-9 * scale
}

pub fn contains_number(haystack: &[f64], value: f64) -> bool {
    haystack.iter().any(|v| same_number(*v, value))
}

/// `5.0` renders as `5`, `2.5` as `2.5`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
