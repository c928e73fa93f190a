use std::fmt::Write as _;

use cadset_sandbox::PythonKernel;

use crate::util::run_cmd;
use crate::Config;

/// What the environment can do for dynamic validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoctorReport {
    pub python: String,
    pub kernel_enabled: bool,
    pub interpreter: Result<String, String>,
    pub cadquery: Result<String, String>,
}

impl DoctorReport {
    pub fn dynamic_available(&self) -> bool {
        self.kernel_enabled && self.interpreter.is_ok() && self.cadquery.is_ok()
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "interpreter ({}): {}", self.python, status(&self.interpreter));
        let _ = writeln!(s, "cadquery: {}", status(&self.cadquery));
        let _ = writeln!(s, "kernel enabled in config: {}", if self.kernel_enabled { "yes" } else { "no" });
        let _ = writeln!(
            s,
            "dynamic validation: {}",
            if self.dynamic_available() { "ENABLED" } else { "DISABLED (static checks only)" }
        );
        s
    }
}

fn status(r: &Result<String, String>) -> String {
    match r {
        Ok(v) => format!("ok ({v})"),
        Err(e) => format!("MISSING ({e})"),
    }
}

pub fn doctor(cfg: &Config) -> DoctorReport {
    let python = cfg.kernel.python.clone();
    let interpreter = run_cmd(&python, &["--version"]).map_err(|e| first_line(&e.to_string()));
    let cadquery = if interpreter.is_ok() {
        PythonKernel::new(python.clone()).probe().map_err(|e| e.to_string())
    } else {
        Err("interpreter not runnable".to_string())
    };
    DoctorReport { python, kernel_enabled: cfg.kernel.enabled, interpreter, cadquery }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().to_string()
}
