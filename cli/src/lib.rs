use std::fs;
use std::path::Path;
use thiserror::Error;
use wand::{WandConfig, WandError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Wand(#[from] WandError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Load a configuration from TOML string
pub fn config_from_toml(content: &str) -> Result<WandConfig, CliError> {
    let config: WandConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration from JSON string
pub fn config_from_json(content: &str) -> Result<WandConfig, CliError> {
    let config: WandConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Auto-detect file format and load configuration
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WandConfig, CliError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => config_from_toml(&fs::read_to_string(path_ref)?),
        Some("json") => config_from_json(&fs::read_to_string(path_ref)?),
        _ => Err(CliError::UnsupportedFileFormat),
    }
}

/// Configuration from an optional file, falling back to defaults
pub fn resolve_config(path: Option<&Path>) -> Result<WandConfig, CliError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(WandConfig::default()),
    }
}
