//! Initialize a config file: write the default settings so operators have something to edit.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

/// Write the default config to `config_path` if it does not exist, creating the parent directory.
/// Returns true when a file was written, false when one was already there.
pub fn init_config_file(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        log::debug!("config already exists at {}, skipping", config_path.display());
        return Ok(false);
    }
    if let Some(dir) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&Config::default()).context("serializing default config")?;
    std::fs::write(config_path, json + "\n")
        .with_context(|| format!("writing default config to {}", config_path.display()))?;
    log::info!("created default config at {}", config_path.display());
    Ok(true)
}
