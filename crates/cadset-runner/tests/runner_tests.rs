use std::path::Path;

use anyhow::Result;
use cadset_augment::TextGenerator;
use cadset_core::Verdict;
use cadset_repair::backup_path;
use cadset_runner::{Config, Runner};
use serde_json::json;

struct EchoGenerator;

impl TextGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    fn generate(&self, _prompt: &str) -> Result<String> {
        Ok("[\"tiny cube pls\"]".to_string())
    }
}

fn runner(root: &Path) -> Runner {
    let mut r = Runner::open(root.to_path_buf(), None).unwrap();
    r.cfg.kernel.python = "cadset-no-such-python".to_string();
    r.cfg.augment.pause_ms = 0;
    r
}

fn write_dataset(root: &Path, lines: &[String]) -> std::path::PathBuf {
    let path = root.join("data/dataset.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn record(output: &str) -> String {
    json!({"instruction": "Create a box", "input": "Make a 10mm cube", "output": output}).to_string()
}

#[test]
fn init_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let (path, created) = Runner::init(dir.path()).unwrap();
    assert!(created);
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    let (_, again) = Runner::init(dir.path()).unwrap();
    assert!(!again);
}

#[test]
fn default_dataset_path_is_under_root() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(dir.path());
    assert_eq!(r.dataset_path(None), dir.path().join("data/dataset.jsonl"));
}

#[test]
fn unavailable_kernel_falls_back_to_static() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(dir.path());
    assert!(r.sandbox(false).is_none());
    let path = write_dataset(dir.path(), &[record("import cadquery as cq\nresult = cq.Workplane(\"XY\").box(10, 10, 10)")]);
    let report = r.validate(&path, false);
    assert!(!report.dynamic);
    assert_eq!(report.verdict, Verdict::Pass);
}

#[test]
fn fix_backs_up_then_repairs() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(dir.path());
    let original = record("cq.Workplane(\"XY\").box(10,10,10)");
    let path = write_dataset(dir.path(), &[original.clone()]);

    let summary = r.fix(&path, None).unwrap();
    assert_eq!(summary.changed, 1);
    assert_eq!(std::fs::read_to_string(backup_path(&path)).unwrap(), format!("{original}\n"));
    assert_eq!(r.validate(&path, true).verdict, Verdict::Pass);
}

#[test]
fn unknown_issue_kinds_touch_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(dir.path());
    let path = write_dataset(dir.path(), &[record("result = 1")]);
    assert!(r.fix(&path, Some("bogus,json_error")).is_err());
    assert!(!backup_path(&path).exists());
}

#[test]
fn augment_uses_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(dir.path());
    let source = dir.path().join("data/validated_dataset.jsonl");
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    std::fs::write(&source, record("result = 1") + "\n").unwrap();

    let summary = r.augment(None, None, None, &EchoGenerator).unwrap();
    assert_eq!(summary.sources, 1);
    assert_eq!(summary.variations, 1);
    let out = std::fs::read_to_string(dir.path().join("data/augmented_dataset.jsonl")).unwrap();
    assert_eq!(out.lines().count(), 2);
}
