use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// `data/dataset.jsonl` -> `data/dataset.jsonl.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

/// Point-in-time copy taken before the store is rewritten.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let dest = backup_path(path);
    std::fs::copy(path, &dest).with_context(|| format!("back up {} to {}", path.display(), dest.display()))?;
    tracing::info!(backup = %dest.display(), "backup created");
    Ok(dest)
}

/// Whole-file replace; the store is never left half written by a failed pass.
pub(crate) fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir).with_context(|| format!("create temp file in {}", dir.display()))?;
    std::fs::write(tmp.path(), body).with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.persist(path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_appends_suffix() {
        assert_eq!(backup_path(Path::new("data/dataset.jsonl")), PathBuf::from("data/dataset.jsonl.backup"));
    }

    #[test]
    fn backup_is_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.jsonl");
        std::fs::write(&path, "{}\n").unwrap();
        let dest = create_backup(&path).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "{}\n");
    }
}
