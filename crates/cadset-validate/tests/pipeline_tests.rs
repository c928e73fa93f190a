use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cadset_core::{FindingKind, Verdict};
use cadset_sandbox::{CadKernel, Capabilities, Fault, GeometryHandle, HolderKind, Sandbox, SandboxOptions};
use cadset_validate::{Report, ValidationRun};
use serde_json::json;

/// Writes a plausible mesh and counts how often it was asked to run code.
struct CountingKernel {
    calls: Arc<AtomicUsize>,
}

impl CadKernel for CountingKernel {
    fn name(&self) -> &str {
        "counting"
    }

    fn execute(&self, code: &str, caps: &Capabilities) -> Result<GeometryHandle, Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if code.contains("raise") {
            return Err(Fault::Runtime("boom".into()));
        }
        std::fs::write(&caps.export_to, vec![0u8; 284]).map_err(|e| Fault::Export(e.to_string()))?;
        Ok(GeometryHandle { kind: HolderKind::Workplane, mesh_path: caps.export_to.clone() })
    }
}

fn line(instruction: &str, input: &str, output: &str) -> String {
    json!({"instruction": instruction, "input": input, "output": output}).to_string()
}

fn good_line() -> String {
    line(
        "Create a box",
        "Make a 10mm cube",
        "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)",
    )
}

fn validate_static(text: &str) -> Report {
    let mut run = ValidationRun::static_only();
    run.validate_text(text);
    run.finish(PathBuf::from("dataset.jsonl"))
}

fn validate_dynamic(text: &str) -> (Report, usize) {
    let calls = Arc::new(AtomicUsize::new(0));
    let kernel = CountingKernel { calls: calls.clone() };
    let sandbox = Sandbox::new(Box::new(kernel), SandboxOptions::default()).unwrap();
    let mut run = ValidationRun::new(Some(sandbox));
    run.validate_text(text);
    let report = run.finish(PathBuf::from("dataset.jsonl"));
    (report, calls.load(Ordering::SeqCst))
}

fn count(report: &Report, kind: FindingKind) -> usize {
    report.errors.iter().chain(report.warnings.iter()).filter(|f| f.kind == kind).count()
}

#[test]
fn minimal_valid_record_is_clean() {
    let report = validate_static(&format!("{}\n", good_line()));
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.verdict, Verdict::Pass);
}

#[test]
fn missing_field_blocks_dynamic_stage() {
    let text = json!({
        "instruction": "Create a box",
        "output": "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)"
    })
    .to_string();
    let (report, calls) = validate_dynamic(&text);
    assert_eq!(count(&report, FindingKind::SchemaError), 1);
    assert_eq!(count(&report, FindingKind::ExecutionError), 0);
    assert_eq!(count(&report, FindingKind::RuntimeError), 0);
    assert_eq!(calls, 0);
}

#[test]
fn content_error_blocks_dynamic_stage() {
    let text = line("", "Make a 10mm cube", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)");
    let (report, calls) = validate_dynamic(&text);
    assert_eq!(count(&report, FindingKind::ContentError), 1);
    assert_eq!(report.verdict, Verdict::Failed);
    assert_eq!(calls, 0);
}

#[test]
fn syntax_error_suppresses_parameter_findings() {
    let text = line("Create a box", "Make a 10mm cube", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(-5, 10,");
    let (report, calls) = validate_dynamic(&text);
    assert_eq!(count(&report, FindingKind::SyntaxError), 1);
    assert_eq!(count(&report, FindingKind::ParameterError), 0);
    assert_eq!(count(&report, FindingKind::ParameterWarning), 0);
    assert_eq!(calls, 0);
}

#[test]
fn negative_dimension_is_one_parameter_error() {
    let text = line("Create a box", "Make a box", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(-5, 10, 10)");
    let report = validate_static(&text);
    assert_eq!(count(&report, FindingKind::ParameterError), 1);
    assert!(report.errors[0].message.contains("-5"));
}

#[test]
fn oversized_dimension_is_one_parameter_warning() {
    let text = line("Create a box", "Make a box", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(2000, 10, 10)");
    let report = validate_static(&text);
    assert_eq!(count(&report, FindingKind::ParameterWarning), 1);
    assert!(report.errors.is_empty());
}

#[test]
fn diameter_radius_conversion_is_recognised() {
    let ok = line(
        "Create a cylinder",
        "a 20mm diameter cylinder",
        "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(40, 10)",
    );
    assert_eq!(count(&validate_static(&ok), FindingKind::ConsistencyWarning), 0);

    let missing = line(
        "Create a cylinder",
        "a 20mm diameter cylinder",
        "import cadquery as cq\nresult = cq.Workplane(\"XY\").cylinder(40, 7)",
    );
    assert_eq!(count(&validate_static(&missing), FindingKind::ConsistencyWarning), 1);
}

#[test]
fn empty_dataset_passes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.jsonl");
    std::fs::write(&path, "").unwrap();
    let report = ValidationRun::static_only().validate_path(&path);
    assert_eq!(report.errors.len(), 0);
    assert_eq!(report.warnings.len(), 0);
    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn missing_dataset_is_a_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let report = ValidationRun::static_only().validate_path(&dir.path().join("absent.jsonl"));
    assert_eq!(count(&report, FindingKind::FileError), 1);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn dynamic_stage_runs_only_for_clean_records() {
    let text = [
        good_line(),
        line("Create a box", "Make a 10mm cube", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(0, 10, 10)"),
        line("Create a box", "Make a 10mm cube", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)\nraise"),
    ]
    .join("\n");
    let (report, calls) = validate_dynamic(&text);
    assert_eq!(calls, 2);
    assert_eq!(count(&report, FindingKind::RuntimeError), 1);
    assert_eq!(report.errors.iter().find(|f| f.kind == FindingKind::RuntimeError).unwrap().line, 3);
    assert!(report.dynamic);
}

#[test]
fn findings_are_reported_in_line_order() {
    let text = [
        line("Create", "Make a 10mm cube", "result = cq.Workplane(\"XY\").box(10, 10, 10)"),
        "[1, 2]".to_string(),
        line("Create a box", "Make a 10mm cube", "import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, -1)"),
    ]
    .join("\n");
    let report = validate_static(&text);
    let lines: Vec<usize> = report.errors.iter().map(|f| f.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert_eq!(report.verdict, Verdict::Failed);
}
