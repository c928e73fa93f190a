use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cadset_core::Record;
use serde_json::Value;

use crate::generator::TextGenerator;
use crate::prompt::{build_prompt, extract_variations};

#[derive(Clone, Debug)]
pub struct AugmentOptions {
    pub variations_per_entry: usize,
    /// Source records to process; `None` means all.
    pub limit: Option<usize>,
    pub pause: Duration,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self { variations_per_entry: 4, limit: None, pause: Duration::from_millis(500) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AugmentSummary {
    pub sources: usize,
    pub skipped: usize,
    pub variations: usize,
}

/// Copies every usable source record to `dest`, each followed by its
/// generated variants. Variants keep `instruction` and `output` verbatim and
/// replace only `input`.
pub fn augment(source: &Path, dest: &Path, generator: &dyn TextGenerator, opts: &AugmentOptions) -> Result<AugmentSummary> {
    let text = std::fs::read_to_string(source).with_context(|| format!("read source {}", source.display()))?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = std::fs::File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut out = BufWriter::new(file);

    tracing::info!(
        source = %source.display(),
        dest = %dest.display(),
        generator = generator.name(),
        "augmenting dataset"
    );

    let mut summary = AugmentSummary::default();
    let lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .take(opts.limit.unwrap_or(usize::MAX));

    for (idx, raw) in lines {
        let line = idx + 1;
        let Some((value, record)) = decode(raw.trim()) else {
            tracing::warn!(line, "skipping malformed record");
            summary.skipped += 1;
            continue;
        };

        if summary.sources > 0 && !opts.pause.is_zero() {
            std::thread::sleep(opts.pause);
        }
        summary.sources += 1;
        writeln!(out, "{value}").with_context(|| format!("write {}", dest.display()))?;

        let prompt = build_prompt(&record, opts.variations_per_entry);
        let variations = match generator.generate(&prompt) {
            Ok(reply) => extract_variations(&reply),
            Err(e) => {
                tracing::warn!(line, error = %e, "generator failed; no variations for this record");
                vec![]
            }
        };
        tracing::debug!(line, count = variations.len(), "variations generated");

        for input in variations {
            let variant = Record { input, ..record.clone() };
            writeln!(out, "{}", variant.to_line()).with_context(|| format!("write {}", dest.display()))?;
            summary.variations += 1;
        }
    }

    out.flush().with_context(|| format!("flush {}", dest.display()))?;
    tracing::info!(
        sources = summary.sources,
        skipped = summary.skipped,
        variations = summary.variations,
        "augmentation complete"
    );
    Ok(summary)
}

fn decode(raw: &str) -> Option<(Value, Record)> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let record = Record::from_value(&value).ok()?;
    Some((value, record))
}
