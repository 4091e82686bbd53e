// kpathsea-cli/src/settings.rs

//! Config discovery and merging: file, then environment, then flags.

use crate::models::cli::Cli;
use anyhow::{Context, Result, anyhow};
use kpathsea_core::KpathseaConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILENAME: &str = "Kpathsea.toml";

/// Walks from `start` up to the filesystem root looking for [`CONFIG_FILENAME`].
pub fn find_config_upwards(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.is_file() {
            return Some(config_path);
        }
        current = current.parent()?;
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("kpathsea").join(CONFIG_FILENAME))
        .filter(|p| p.is_file())
}

/// Picks the config file to load, if any.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(anyhow!("Config file {:?} does not exist", path));
        }
        return Ok(Some(path.to_path_buf()));
    }
    Ok(find_config_upwards(cwd).or_else(user_config_path))
}

/// Builds the effective configuration for this invocation.
pub fn load_settings<F>(cli: &Cli, cwd: &Path, env_lookup: F) -> Result<KpathseaConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match discover_config(cli.config.as_deref(), cwd)? {
        Some(path) => {
            info!("Found configuration file at: {:?}", path);
            KpathseaConfig::from_file(&path)?
        }
        None => {
            debug!("No {} found; using defaults", CONFIG_FILENAME);
            KpathseaConfig::default()
        }
    };

    config
        .apply_env_overrides(env_lookup)
        .context("Invalid KPATHSEA_* environment variable")?;

    if let Some(tex_path) = &cli.tex_path {
        config.tex_path = Some(tex_path.clone());
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }
    if let Some(format) = cli.format {
        config.default_format = Some(format);
    }
    debug!(config = ?config, "Effective configuration");
    Ok(config)
}
