use anyhow::{anyhow, Context, Result};
use std::process::Command;

/// Runs a short-lived helper and returns its trimmed stdout.
pub fn run_cmd(program: &str, args: &[&str]) -> Result<String> {
    let out = Command::new(program).args(args).output().with_context(|| format!("run {} {:?}", program, args))?;
    if !out.status.success() {
        return Err(anyhow!(
            "command failed: {} {:?}\nstdout:{}\nstderr:{}",
            program,
            args,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    // Python 2 and some builds print `--version` to stderr.
    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if stdout.is_empty() {
        return Ok(String::from_utf8_lossy(&out.stderr).trim().to_string());
    }
    Ok(stdout)
}
