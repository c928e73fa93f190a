use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cadset_core::{Finding, FindingKind, Ledger};
use tempfile::TempDir;

use crate::kernel::{CadKernel, Capabilities, Fault};

/// Exported meshes smaller than this are probably degenerate.
pub const MIN_MESH_BYTES: u64 = 100;

#[derive(Clone, Debug)]
pub struct SandboxOptions {
    pub namespace: String,
    pub timeout: Duration,
    pub memory_limit_mb: Option<u64>,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self { namespace: "cq".to_string(), timeout: Duration::from_secs(30), memory_limit_mb: Some(2048) }
    }
}

/// Dynamic checks for one validation run.
///
/// Owns the run's scratch directory; dropping the sandbox removes it, whatever
/// path the run took to get there.
pub struct Sandbox {
    kernel: Box<dyn CadKernel>,
    scratch: TempDir,
    opts: SandboxOptions,
}

impl Sandbox {
    pub fn new(kernel: Box<dyn CadKernel>, opts: SandboxOptions) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("cadset_validation_")
            .tempdir()
            .context("create validation scratch directory")?;
        tracing::debug!(dir = %scratch.path().display(), kernel = kernel.name(), "sandbox ready");
        Ok(Self { kernel, scratch, opts })
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Deterministic per-line mesh location inside this run's scratch directory.
    pub fn mesh_path(&self, line: usize) -> PathBuf {
        self.scratch.path().join(format!("line_{line}.stl"))
    }

    pub fn check(&self, line: usize, code: &str) -> Vec<Finding> {
        let caps = Capabilities {
            namespace: self.opts.namespace.clone(),
            timeout: self.opts.timeout,
            memory_limit_mb: self.opts.memory_limit_mb,
            export_to: self.mesh_path(line),
        };
        let _artifact = GeneratedArtifact { mesh_path: caps.export_to.clone() };

        let handle = match self.kernel.execute(code, &caps) {
            Ok(handle) => handle,
            Err(fault) => {
                tracing::debug!(line, %fault, "dynamic check failed");
                return vec![fault_finding(line, &fault)];
            }
        };
        tracing::debug!(line, kind = ?handle.kind, "geometry exported");

        match std::fs::metadata(&handle.mesh_path) {
            Err(_) => vec![Finding::new(
                line,
                FindingKind::ExportError,
                "STL export completed but file was not created",
            )],
            Ok(meta) if meta.len() < MIN_MESH_BYTES => vec![Finding::new(
                line,
                FindingKind::GeometryWarning,
                format!(
                    "Generated STL is very small ({} bytes) - possibly degenerate geometry",
                    meta.len()
                ),
            )],
            Ok(_) => vec![],
        }
    }

    pub fn run(&self, line: usize, code: &str, ledger: &mut Ledger) {
        ledger.extend(self.check(line, code));
    }
}

/// The mesh exported for one record; removed as soon as it goes out of scope.
struct GeneratedArtifact {
    mesh_path: PathBuf,
}

impl Drop for GeneratedArtifact {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.mesh_path);
    }
}

pub fn fault_finding(line: usize, fault: &Fault) -> Finding {
    match fault {
        Fault::Runtime(_) | Fault::Timeout(_) | Fault::Unavailable(_) => {
            Finding::new(line, FindingKind::RuntimeError, format!("Code execution failed: {fault}"))
        }
        Fault::MissingResult | Fault::WrongType(_) => {
            Finding::new(line, FindingKind::ExecutionError, fault.to_string())
        }
        Fault::Export(_) => Finding::new(line, FindingKind::GeometryError, format!("Geometry export failed: {fault}")),
    }
}
