// kpathsea-core/src/config.rs

//! Handles configuration structures and parsing for the library.

use crate::format::FileFormat;
use crate::lookup::Kpathsea;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_TEX_PATH: &str = "KPATHSEA_TEX_PATH";
pub const ENV_TIMEOUT_SECS: &str = "KPATHSEA_TIMEOUT_SECS";
pub const ENV_FORMAT: &str = "KPATHSEA_FORMAT";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KpathseaConfig {
    /// Directory containing the TeX binaries. `kpsewhich` is taken from `PATH` when unset.
    #[serde(default)]
    pub tex_path: Option<PathBuf>,
    /// Kill lookups after this many seconds. No limit when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Format used when a lookup does not name one.
    #[serde(default)]
    pub default_format: Option<FileFormat>,
}

impl KpathseaConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<KpathseaConfig> {
        let config: KpathseaConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::info!("Successfully parsed and validated kpathsea configuration.");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<KpathseaConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))
    }

    fn validate(&self) -> Result<()> {
        if let Some(tex_path) = &self.tex_path {
            if tex_path.as_os_str().is_empty() {
                return Err(anyhow!("'tex_path' is set but empty."));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("'timeout_secs' must be greater than zero."));
        }
        Ok(())
    }

    /// Applies `KPATHSEA_*` overrides. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tex_path) = lookup(ENV_TEX_PATH).filter(|v| !v.trim().is_empty()) {
            self.tex_path = Some(PathBuf::from(tex_path));
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().with_context(|| {
                format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS)
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            self.default_format = Some(format.parse().map_err(|e: String| anyhow!(e))?);
        }
        self.validate()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn format(&self) -> FileFormat {
        self.default_format.unwrap_or_default()
    }
}

impl Kpathsea {
    /// Creates an instance from configuration, using the real filesystem and processes.
    pub fn from_config(config: &KpathseaConfig) -> Self {
        let kpse = Kpathsea::new(config.tex_path.as_deref());
        match config.timeout() {
            Some(timeout) => kpse.with_timeout(timeout),
            None => kpse,
        }
    }
}
