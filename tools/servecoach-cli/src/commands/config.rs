//! Show (and optionally persist) the effective configuration.

use std::path::PathBuf;

use servecoach_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        config
            .save_to(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("\nConfig saved to: {}", path.display());
    }

    Ok(())
}
