use crate::model::{TaskFilter, DEFAULT_COLUMN_NAME};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "KANBAN_CONFIG";

/// User preferences read from `config.yml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub default_column_name: String,
    pub default_filter: TaskFilter,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_column_name: DEFAULT_COLUMN_NAME.to_string(),
            default_filter: TaskFilter::All,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `KANBAN_CONFIG` or the per-user config file; a missing file means defaults.
    pub fn load() -> Result<Self> {
        match config_path()? {
            Some(path) => Config::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config =
            serde_yaml::from_str(&data).with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(Some(PathBuf::from(path)));
    }
    Ok(ProjectDirs::from("", "", "kanban").map(|dirs| dirs.config_dir().join("config.yml")))
}
