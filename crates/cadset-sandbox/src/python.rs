//! CadQuery kernel behind a process boundary.
//!
//! Each execution spawns `python DRIVER code.py mesh.stl report.json ...`.
//! The driver binds only the namespace alias, runs the code, type-checks
//! `result`, exports it and writes a one-object JSON report. The child's
//! stdout is discarded and stderr goes to a file, so a chatty snippet can
//! never block on a full pipe.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::kernel::{CadKernel, Capabilities, Fault, GeometryHandle, HolderKind};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const DRIVER_FILE: &str = "cadset_driver.py";

pub const DRIVER_SOURCE: &str = r#"import json
import sys


def main():
    code_path, mesh_path, report_path, limit_mb, alias = sys.argv[1:6]

    def report(**fields):
        with open(report_path, "w", encoding="utf-8") as fh:
            json.dump(fields, fh)

    limit = int(limit_mb)
    if limit > 0:
        try:
            import resource

            cap = limit * 1024 * 1024
            resource.setrlimit(resource.RLIMIT_AS, (cap, cap))
        except Exception:
            pass

    try:
        import cadquery as cq
    except Exception as exc:
        report(status="unavailable", message=str(exc))
        return

    with open(code_path, encoding="utf-8") as fh:
        source = fh.read()

    local_scope = {}
    try:
        exec(compile(source, "<record>", "exec"), {alias: cq}, local_scope)
    except BaseException as exc:
        report(status="runtime", message=str(exc) or type(exc).__name__)
        return

    result = local_scope.get("result")
    if result is None:
        report(status="missing_result")
        return
    if isinstance(result, cq.Workplane):
        kind = "Workplane"
    elif isinstance(result, cq.Shape):
        kind = "Shape"
    else:
        report(status="wrong_type", type_name=type(result).__name__)
        return

    try:
        cq.exporters.export(result, mesh_path)
    except Exception as exc:
        report(status="export", message=str(exc) or type(exc).__name__)
        return

    report(status="ok", kind=kind)


main()
"#;

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum DriverReport {
    Ok { kind: HolderKind },
    Runtime { message: String },
    MissingResult,
    WrongType { type_name: String },
    Export { message: String },
    Unavailable { message: String },
}

pub struct PythonKernel {
    python: String,
}

impl PythonKernel {
    pub fn new(python: impl Into<String>) -> Self {
        Self { python: python.into() }
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    /// Checks once that the interpreter can import the CAD kernel; returns its version.
    pub fn probe(&self) -> Result<String, Fault> {
        let out = Command::new(&self.python)
            .args(["-c", "import cadquery; print(cadquery.__version__)"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Fault::Unavailable(format!("spawn {}: {e}", self.python)))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("import failed");
            return Err(Fault::Unavailable(last.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn ensure_driver(dir: &Path) -> Result<PathBuf, Fault> {
        let path = dir.join(DRIVER_FILE);
        if !path.exists() {
            std::fs::write(&path, DRIVER_SOURCE)
                .map_err(|e| Fault::Unavailable(format!("write driver {}: {e}", path.display())))?;
        }
        Ok(path)
    }

    fn wait(&self, child: &mut std::process::Child, timeout: Duration) -> Result<std::process::ExitStatus, Fault> {
        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Fault::Timeout(timeout));
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(Fault::Runtime(format!("wait failed: {e}"))),
            }
        }
    }
}

impl CadKernel for PythonKernel {
    fn name(&self) -> &str {
        "cadquery"
    }

    fn execute(&self, code: &str, caps: &Capabilities) -> Result<GeometryHandle, Fault> {
        let dir = caps
            .export_to
            .parent()
            .ok_or_else(|| Fault::Unavailable("export path has no parent directory".into()))?;
        let driver = Self::ensure_driver(dir)?;
        let code_path = caps.export_to.with_extension("py");
        let report_path = caps.export_to.with_extension("report.json");
        let stderr_path = caps.export_to.with_extension("stderr");
        let _scratch = ScratchFiles(vec![code_path.clone(), report_path.clone(), stderr_path.clone()]);

        std::fs::write(&code_path, code).map_err(|e| Fault::Unavailable(format!("write code: {e}")))?;
        let stderr = File::create(&stderr_path).map_err(|e| Fault::Unavailable(format!("create stderr log: {e}")))?;

        let mut child = Command::new(&self.python)
            .arg(&driver)
            .arg(&code_path)
            .arg(&caps.export_to)
            .arg(&report_path)
            .arg(caps.memory_limit_mb.unwrap_or(0).to_string())
            .arg(&caps.namespace)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| Fault::Unavailable(format!("spawn {}: {e}", self.python)))?;

        let status = self.wait(&mut child, caps.timeout)?;

        let report = match std::fs::read_to_string(&report_path) {
            Ok(s) => serde_json::from_str::<DriverReport>(&s)
                .map_err(|e| Fault::Runtime(format!("unreadable driver report: {e}")))?,
            Err(_) => {
                // No report: the interpreter died before the driver could write one.
                let tail = std::fs::read_to_string(&stderr_path).unwrap_or_default();
                let last = tail.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("no output");
                return Err(Fault::Runtime(format!("kernel process exited with {status}: {last}")));
            }
        };

        match report {
            DriverReport::Ok { kind } => Ok(GeometryHandle { kind, mesh_path: caps.export_to.clone() }),
            DriverReport::Runtime { message } => Err(Fault::Runtime(message)),
            DriverReport::MissingResult => Err(Fault::MissingResult),
            DriverReport::WrongType { type_name } => Err(Fault::WrongType(type_name)),
            DriverReport::Export { message } => Err(Fault::Export(message)),
            DriverReport::Unavailable { message } => Err(Fault::Unavailable(message)),
        }
    }
}

/// Removes per-execution inputs and logs when the execution ends.
struct ScratchFiles(Vec<PathBuf>);

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for p in &self.0 {
            let _ = std::fs::remove_file(p);
        }
    }
}
