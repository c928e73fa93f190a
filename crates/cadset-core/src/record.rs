use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 3] = ["instruction", "input", "output"];

/// One training example. `output` is the frozen ground truth shared by every
/// augmented variant of a source record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub instruction: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line must be a JSON object")]
    NotAnObject,
    #[error("missing required fields: {0}")]
    MissingFields(String),
    #[error("field '{field}' must be a string, got {actual}")]
    WrongType { field: &'static str, actual: &'static str },
}

impl Record {
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;
        let missing = missing_fields(obj);
        if !missing.is_empty() {
            return Err(RecordError::MissingFields(missing.join(", ")));
        }
        let field = |name: &'static str| -> Result<String, RecordError> {
            match &obj[name] {
                Value::String(s) => Ok(s.clone()),
                other => Err(RecordError::WrongType { field: name, actual: json_type_name(other) }),
            }
        };
        Ok(Self {
            instruction: field("instruction")?,
            input: field("input")?,
            output: field("output")?,
        })
    }

    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Required fields absent from `obj`, in canonical order.
pub fn missing_fields(obj: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS.iter().copied().filter(|f| !obj.contains_key(*f)).collect()
}

/// Keys of `obj` outside the required set, in document order.
pub fn unexpected_fields(obj: &Map<String, Value>) -> Vec<&str> {
    obj.keys().map(String::as_str).filter(|k| !REQUIRED_FIELDS.contains(k)).collect()
}

pub fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_record() {
        let r = Record::parse_line(r#"{"instruction":"a","input":"b","output":"c"}"#).unwrap();
        assert_eq!(r.output, "c");
    }

    #[test]
    fn reports_missing_fields_in_canonical_order() {
        let err = Record::parse_line(r#"{"input":"b"}"#).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: instruction, output");
    }

    #[test]
    fn rejects_non_string_field() {
        let err = Record::parse_line(r#"{"instruction":"a","input":3,"output":"c"}"#).unwrap_err();
        assert!(matches!(err, RecordError::WrongType { field: "input", actual: "int" }));
    }

    #[test]
    fn rejects_arrays() {
        assert!(matches!(Record::parse_line("[1,2]"), Err(RecordError::NotAnObject)));
    }
}
