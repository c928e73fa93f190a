use cadset_core::Record;
use serde_json::Value;

const EXAMPLE_RECORD: &str = r#"{
  "instruction": "Create a thin rectangular plate",
  "input": "Make a flat plate 50mm by 30mm with 2mm thickness",
  "output": "import cadquery as cq\n\nresult = cq.Workplane(\"XY\").box(50, 30, 2)"
}"#;

const EXAMPLE_VARIATIONS: &str = r#"[
  "a 50 by 30 slab, make it 2mm high",
  "hey can u generate a flat plate for me 50mm x 30mm but only 2mm thick?",
  "plate 50 30 2",
  "Make flat plat 50mm by 30mm with 2mm thicknes"
]"#;

/// Asks for `n` rephrasings of `record.input` that still describe the exact
/// same `output` code, as a bare JSON list of strings.
pub fn build_prompt(record: &Record, n: usize) -> String {
    let data_point = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_line());
    format!(
        "You are augmenting a training dataset of CadQuery modelling requests. \
Given one clean example, write {n} alternative user requests that a real person might type \
for the EXACT same output code.

Mix these styles:
1. Casual synonyms and slang (\"thingy\", \"block\", \"slab\", \"cutout\").
2. Typos and loose grammar (\"cilinder\", \"filit\").
3. Search-bar phrasing with articles and connectors dropped.
4. Conversational filler (\"hey can you make me...\", \"ok so I need... thanks\").

Example data point:
{EXAMPLE_RECORD}

Example response:
{EXAMPLE_VARIATIONS}

Now write {n} variations for the data point below. Respond ONLY with a JSON list of strings, \
with no other text before or after it.

Data point:
{data_point}
"
    )
}

/// Pulls the JSON list of strings out of a free-form reply. The span runs from
/// the first `[` to the last `]`; anything that does not decode to a list of
/// strings yields no variations.
pub fn extract_variations(reply: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (reply.find('['), reply.rfind(']')) else {
        tracing::warn!("no JSON list in generator reply");
        return vec![];
    };
    if end < start {
        tracing::warn!("no JSON list in generator reply");
        return vec![];
    }
    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            tracing::warn!("generator reply is not a list of strings");
            vec![]
        }
        Err(e) => {
            tracing::warn!(error = %e, "generator reply list does not decode");
            vec![]
        }
    }
}
