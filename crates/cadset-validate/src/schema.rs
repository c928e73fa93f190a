use cadset_core::{json_type_name, missing_fields, unexpected_fields, FindingKind, Ledger, REQUIRED_FIELDS};
use serde_json::{Map, Value};

/// Fields shorter than this (after trimming) draw a `content_warning`.
pub const MIN_FIELD_CHARS: usize = 5;

/// Shape checks for one decoded line. Returns the object when the line is one,
/// so later stages can run on whatever fields are present.
pub fn check_schema<'a>(line: usize, value: &'a Value, ledger: &mut Ledger) -> Option<&'a Map<String, Value>> {
    let Some(obj) = value.as_object() else {
        ledger.record(line, FindingKind::SchemaError, "Line must be a JSON object");
        return None;
    };

    let missing = missing_fields(obj);
    if !missing.is_empty() {
        ledger.record(line, FindingKind::SchemaError, format!("Missing required fields: {}", missing.join(", ")));
    }

    let extra = unexpected_fields(obj);
    if !extra.is_empty() {
        ledger.record(line, FindingKind::SchemaWarning, format!("Unexpected fields found: {}", extra.join(", ")));
    }

    for field in REQUIRED_FIELDS {
        if let Some(v) = obj.get(field) {
            if !v.is_string() {
                ledger.record(
                    line,
                    FindingKind::SchemaError,
                    format!("Field '{field}' must be a string, got {}", json_type_name(v)),
                );
            }
        }
    }
    Some(obj)
}

pub fn check_content(line: usize, obj: &Map<String, Value>, ledger: &mut Ledger) {
    for field in REQUIRED_FIELDS {
        let Some(Value::String(text)) = obj.get(field) else { continue };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            ledger.record(line, FindingKind::ContentError, format!("Field '{field}' cannot be empty"));
        } else if trimmed.chars().count() < MIN_FIELD_CHARS {
            ledger.record(
                line,
                FindingKind::ContentWarning,
                format!("Field '{field}' seems very short (< {MIN_FIELD_CHARS} characters)"),
            );
        }
    }
}
