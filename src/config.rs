// Configuration from ~/.leadconverter/rc
//
// Format: one `key=value` per line, `#` starts a comment. Relative paths are
// resolved against the directory holding the rc file.

use crate::cli::error::UserError;
use crate::funnel::StaleConfig;
use crate::registry::StageRegistry;
use crate::utils::parse_duration;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".leadconverter";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON data file with clients, deals, tasks and quotes
    pub data_path: PathBuf,
    /// Optional custom stage catalog; the built-in funnel is used otherwise
    pub stages_path: Option<PathBuf>,
    pub stale: StaleConfig,
    /// Write normalization corrections back without `--apply`
    pub apply_corrections: bool,
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(CONFIG_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Get the default data file path
    pub fn default_data_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("data.json"))
    }

    /// Load the rc file if present, defaults otherwise
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let default_data = Self::default_data_path()?;
        if !config_path.exists() {
            log::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::with_data_path(default_data));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        Self::parse(&content, &config_path, default_data)
    }

    fn with_data_path(data_path: PathBuf) -> Self {
        Self {
            data_path,
            stages_path: None,
            stale: StaleConfig::default(),
            apply_corrections: false,
        }
    }

    /// Parse rc content. `config_path` anchors relative paths.
    pub fn parse(content: &str, config_path: &Path, default_data: PathBuf) -> Result<Self> {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |value: &str| {
            let path = PathBuf::from(value);
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };

        let mut config = Self::with_data_path(default_data);
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(UserError::new(format!(
                    "Invalid config line {}: '{}' (expected key=value)",
                    line_no + 1,
                    line
                ))
                .into());
            };
            let value = value.trim();
            match key.trim() {
                "data.location" => config.data_path = resolve(value),
                "stages.location" => config.stages_path = Some(resolve(value)),
                "stale.threshold" => {
                    let secs = parse_duration(value).map_err(|e| {
                        UserError::new(format!("Invalid stale.threshold: '{}': {}", value, e))
                    })?;
                    config.stale = StaleConfig::with_threshold_secs(secs);
                }
                "corrections.apply" => {
                    config.apply_corrections = parse_bool(value).ok_or_else(|| {
                        UserError::new(format!("Invalid corrections.apply: '{}' (expected yes or no)", value))
                    })?;
                }
                other => log::warn!("Ignoring unknown config key '{}'", other),
            }
        }
        Ok(config)
    }

    /// Build the stage registry this configuration points at
    pub fn registry(&self) -> Result<StageRegistry> {
        match &self.stages_path {
            Some(path) => StageRegistry::from_json_file(path),
            None => Ok(StageRegistry::builtin().clone()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Some(true),
        "no" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
