//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigError, DeployConfig};

/// Environment variable overriding the default config path.
pub const CONFIG_ENV: &str = "CM360_DEPLOY_CONFIG";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// `$CM360_DEPLOY_CONFIG`, else `~/.cm360-deploy/config.yaml`.
    fn default_path() -> Result<PathBuf> {
        resolve_default_path(std::env::var(CONFIG_ENV).ok(), dirs::home_dir())
    }

    fn read(path: &Path) -> Result<DeployConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

fn resolve_default_path(env: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(val) = env {
        return Ok(PathBuf::from(val));
    }
    let home = home.ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".cm360-deploy").join("config.yaml"))
}

impl ConfigStore for YamlConfigStore {
    fn load(&self, explicit: Option<&Path>) -> Result<DeployConfig> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Self::read(path);
        }
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(DeployConfig::default());
        }
        Self::read(&path)
    }
}
