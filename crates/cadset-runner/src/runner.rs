use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use cadset_augment::{augment, AugmentOptions, AugmentSummary, ChatClient, ChatSettings, TextGenerator};
use cadset_repair::{create_backup, fix_issues_file, parse_issues, repair_file, RepairSummary};
use cadset_sandbox::{PythonKernel, Sandbox};
use cadset_validate::{Report, ValidationRun};

use crate::config::{resolve_path, Config};
use crate::doctor::{doctor, DoctorReport};

const GENERATOR_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Runner {
    pub root: PathBuf,
    pub cfg: Config,
}

impl Runner {
    /// Loads `config` (or `.cadset/cadset.toml` under `root`); missing means defaults.
    pub fn open(root: PathBuf, config: Option<&Path>) -> Result<Self> {
        let cfg_path = config.map(Path::to_path_buf).unwrap_or_else(|| Config::config_path(&root));
        let cfg = Config::load_or_default(&cfg_path)?;
        Ok(Self { root, cfg })
    }

    /// Writes the default config if none exists. Returns its path and whether it was created.
    pub fn init(root: &Path) -> Result<(PathBuf, bool)> {
        let cfg_path = Config::config_path(root);
        if cfg_path.exists() {
            return Ok((cfg_path, false));
        }
        Config::default().save_to(&cfg_path)?;
        Ok((cfg_path, true))
    }

    pub fn dataset_path(&self, arg: Option<&Path>) -> PathBuf {
        match arg {
            Some(p) => resolve_path(&self.root, &p.to_string_lossy()),
            None => resolve_path(&self.root, &self.cfg.dataset.path),
        }
    }

    /// Decides once whether this run executes code. Any reason not to is
    /// logged and the run continues with static checks only.
    pub fn sandbox(&self, static_only: bool) -> Option<Sandbox> {
        if static_only {
            return None;
        }
        if !self.cfg.kernel.enabled {
            tracing::info!("kernel disabled in config; static validation only");
            return None;
        }
        let kernel = PythonKernel::new(self.cfg.kernel.python.clone());
        match kernel.probe() {
            Ok(version) => tracing::info!(python = kernel.python(), version = %version, "cadquery available"),
            Err(e) => {
                tracing::warn!(error = %e, "cadquery not available; dynamic validation disabled");
                return None;
            }
        }
        match Sandbox::new(Box::new(kernel), self.cfg.kernel.sandbox_options()) {
            Ok(sb) => Some(sb),
            Err(e) => {
                tracing::warn!(error = %e, "sandbox unavailable; dynamic validation disabled");
                None
            }
        }
    }

    pub fn validation_run(&self, static_only: bool) -> ValidationRun {
        ValidationRun::new(self.sandbox(static_only))
    }

    pub fn validate(&self, path: &Path, static_only: bool) -> Report {
        self.validation_run(static_only).validate_path(path)
    }

    /// General repair pass, or only the targeted fixes named in `issues`.
    /// Backs the store up before touching it.
    pub fn fix(&self, path: &Path, issues: Option<&str>) -> Result<RepairSummary> {
        let kinds = match issues {
            Some(spec) => {
                let kinds = parse_issues(spec);
                if kinds.is_empty() {
                    bail!("no fixable issue kinds in '{spec}' (supported: consistency_warning, parameter_error)");
                }
                Some(kinds)
            }
            None => None,
        };
        create_backup(path)?;
        match kinds {
            Some(kinds) => fix_issues_file(path, &kinds),
            None => repair_file(path),
        }
    }

    pub fn chat_client(&self) -> Result<ChatClient> {
        let a = &self.cfg.augment;
        ChatClient::new(ChatSettings {
            base_url: a.base_url.clone(),
            api_key: a.api_key.clone(),
            model: a.model.clone(),
            temperature: a.temperature,
            timeout: GENERATOR_TIMEOUT,
        })
    }

    pub fn augment_options(&self, limit: Option<usize>) -> AugmentOptions {
        AugmentOptions {
            variations_per_entry: self.cfg.augment.variations_per_entry,
            limit,
            pause: Duration::from_millis(self.cfg.augment.pause_ms),
        }
    }

    pub fn augment(
        &self,
        source: Option<&Path>,
        dest: Option<&Path>,
        limit: Option<usize>,
        generator: &dyn TextGenerator,
    ) -> Result<AugmentSummary> {
        let source = match source {
            Some(p) => resolve_path(&self.root, &p.to_string_lossy()),
            None => resolve_path(&self.root, &self.cfg.augment.source),
        };
        let dest = match dest {
            Some(p) => resolve_path(&self.root, &p.to_string_lossy()),
            None => resolve_path(&self.root, &self.cfg.augment.dest),
        };
        augment(&source, &dest, generator, &self.augment_options(limit))
    }

    pub fn doctor(&self) -> DoctorReport {
        doctor(&self.cfg)
    }
}
