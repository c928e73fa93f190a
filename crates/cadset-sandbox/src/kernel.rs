use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What one execution may see and how long and large it may grow.
#[derive(Clone, Debug)]
pub struct Capabilities {
    /// The only name bound in the code's global scope (`cq`).
    pub namespace: String,
    pub timeout: Duration,
    pub memory_limit_mb: Option<u64>,
    /// Where the kernel exports the mesh of a valid result.
    pub export_to: PathBuf,
}

/// The kernel's two recognised result holders.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HolderKind {
    Workplane,
    Shape,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryHandle {
    pub kind: HolderKind,
    pub mesh_path: PathBuf,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("{0}")]
    Runtime(String),
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("Code executed but 'result' variable was not created")]
    MissingResult,
    #[error("Result is not a valid CadQuery object, got {0}")]
    WrongType(String),
    #[error("{0}")]
    Export(String),
    #[error("kernel unavailable: {0}")]
    Unavailable(String),
}

/// Runs untrusted CAD code. Implementations must not let the code see anything
/// but `capabilities.namespace` and must honour the timeout.
pub trait CadKernel: Send + Sync {
    fn name(&self) -> &str;
    fn execute(&self, code: &str, capabilities: &Capabilities) -> Result<GeometryHandle, Fault>;
}
