use std::path::Path;

use anyhow::{Context, Result};
use cadset_core::REQUIRED_FIELDS;
use serde_json::{Map, Value};

use crate::backup::write_lines;
use crate::transforms::fix_code;

/// What happened to one physical line of the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineFix {
    Blank,
    Dropped,
    Kept { text: String, changed: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub changed: usize,
    pub dropped: usize,
}

/// Decodes a line as a record object carrying every required field.
pub(crate) fn decode_record(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) if REQUIRED_FIELDS.iter().all(|f| obj.contains_key(*f)) => Some(obj),
        _ => None,
    }
}

pub fn fix_line(raw: &str) -> LineFix {
    let raw = raw.trim();
    if raw.is_empty() {
        return LineFix::Blank;
    }
    let Some(mut obj) = decode_record(raw) else {
        return LineFix::Dropped;
    };

    for field in REQUIRED_FIELDS {
        if let Some(Value::String(s)) = obj.get_mut(field) {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }
    // Code fixes run on the trimmed output.
    if let Some(Value::String(code)) = obj.get_mut("output") {
        *code = fix_code(code);
    }

    let text = Value::Object(obj).to_string();
    let changed = text != raw;
    LineFix::Kept { text, changed }
}

/// General repair over a whole store; returns the rewritten lines.
pub fn repair_text(text: &str) -> (Vec<String>, RepairSummary) {
    let mut out = Vec::new();
    let mut summary = RepairSummary::default();
    for (idx, raw) in text.lines().enumerate() {
        match fix_line(raw) {
            LineFix::Blank => {}
            LineFix::Dropped => {
                tracing::info!(line = idx + 1, "removed invalid line");
                summary.dropped += 1;
            }
            LineFix::Kept { text, changed } => {
                if changed {
                    tracing::debug!(line = idx + 1, "fixed line");
                    summary.changed += 1;
                }
                out.push(text);
            }
        }
    }
    (out, summary)
}

/// Rewrites the store in place. The caller takes the backup.
pub fn repair_file(path: &Path) -> Result<RepairSummary> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let (lines, summary) = repair_text(&text);
    write_lines(path, &lines)?;
    tracing::info!(changed = summary.changed, dropped = summary.dropped, "repair pass complete");
    Ok(summary)
}
