use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Every finding the pipeline can produce. The severity of a kind is fixed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    FileError,
    JsonError,
    SchemaError,
    SchemaWarning,
    ContentError,
    ContentWarning,
    SyntaxError,
    ImportError,
    StructureError,
    PatternWarning,
    ParameterError,
    ParameterWarning,
    ConsistencyWarning,
    ExecutionError,
    ExportError,
    GeometryError,
    GeometryWarning,
    RuntimeError,
    EmptyLine,
}

impl FindingKind {
    pub const ALL: [FindingKind; 19] = [
        FindingKind::FileError,
        FindingKind::JsonError,
        FindingKind::SchemaError,
        FindingKind::SchemaWarning,
        FindingKind::ContentError,
        FindingKind::ContentWarning,
        FindingKind::SyntaxError,
        FindingKind::ImportError,
        FindingKind::StructureError,
        FindingKind::PatternWarning,
        FindingKind::ParameterError,
        FindingKind::ParameterWarning,
        FindingKind::ConsistencyWarning,
        FindingKind::ExecutionError,
        FindingKind::ExportError,
        FindingKind::GeometryError,
        FindingKind::GeometryWarning,
        FindingKind::RuntimeError,
        FindingKind::EmptyLine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::FileError => "file_error",
            FindingKind::JsonError => "json_error",
            FindingKind::SchemaError => "schema_error",
            FindingKind::SchemaWarning => "schema_warning",
            FindingKind::ContentError => "content_error",
            FindingKind::ContentWarning => "content_warning",
            FindingKind::SyntaxError => "syntax_error",
            FindingKind::ImportError => "import_error",
            FindingKind::StructureError => "structure_error",
            FindingKind::PatternWarning => "pattern_warning",
            FindingKind::ParameterError => "parameter_error",
            FindingKind::ParameterWarning => "parameter_warning",
            FindingKind::ConsistencyWarning => "consistency_warning",
            FindingKind::ExecutionError => "execution_error",
            FindingKind::ExportError => "export_error",
            FindingKind::GeometryError => "geometry_error",
            FindingKind::GeometryWarning => "geometry_warning",
            FindingKind::RuntimeError => "runtime_error",
            FindingKind::EmptyLine => "empty_line",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::SchemaWarning
            | FindingKind::ContentWarning
            | FindingKind::PatternWarning
            | FindingKind::ParameterWarning
            | FindingKind::ConsistencyWarning
            | FindingKind::GeometryWarning
            | FindingKind::EmptyLine => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    ReadyWithWarnings,
    Failed,
}

impl Verdict {
    /// Process exit status for scripting: only `Failed` is non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Pass | Verdict::ReadyWithWarnings => 0,
            Verdict::Failed => 1,
        }
    }
}
