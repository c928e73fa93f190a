use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cadset_sandbox::SandboxOptions;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub kernel: KernelConfig,
    #[serde(default)]
    pub augment: AugmentConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub enabled: bool,
    pub python: String,
    pub timeout_secs: u64,
    pub memory_limit_mb: u64, // 0 = no ceiling
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AugmentConfig {
    pub source: String,
    pub dest: String,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub variations_per_entry: usize,
    pub temperature: f32,
    pub pause_ms: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { path: "data/dataset.jsonl".to_string() }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self { enabled: true, python: "python3".to_string(), timeout_secs: 30, memory_limit_mb: 2048 }
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            source: "data/validated_dataset.jsonl".to_string(),
            dest: "data/augmented_dataset.jsonl".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            model: "llama3:8b".to_string(),
            variations_per_entry: 4,
            temperature: 0.8,
            pause_ms: 500,
        }
    }
}

impl KernelConfig {
    pub fn sandbox_options(&self) -> SandboxOptions {
        SandboxOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            memory_limit_mb: (self.memory_limit_mb > 0).then_some(self.memory_limit_mb),
            ..SandboxOptions::default()
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// A missing file means defaults; a present but broken one is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".cadset").join("cadset.toml")
    }
}

/// Tilde-expands `p` and anchors relative paths at `root`.
pub fn resolve_path(root: &Path, p: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(p).to_string());
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}
