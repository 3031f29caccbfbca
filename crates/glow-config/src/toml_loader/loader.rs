//! Core TOML loading: read a dataset from a path or a string.

use crate::schema::DataSet;
use crate::validation;
use glow_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

/// Parse a dataset from TOML text without validating it.
pub fn parse_str(content: &str) -> Result<DataSet, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
}

/// Load a dataset from a TOML file.
///
/// Missing fields take serde defaults. After loading, the dataset is
/// validated; if validation fails, a warning is logged and the parsed
/// dataset is returned as-is.
pub fn load_from_path(path: &Path) -> Result<DataSet, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let dataset = parse_str(&content)?;

    if let Err(e) = validation::validate(&dataset) {
        warn!("config validation warning: {e}; using parsed values");
    }

    info!(
        layers = dataset.layers.len(),
        "loaded glow config from {}",
        path.display()
    );
    Ok(dataset)
}

/// Load and strictly validate a dataset, rejecting out-of-range values.
pub fn load_validated(path: &Path) -> Result<DataSet, ConfigError> {
    let dataset = load_from_path(path)?;
    validation::validate(&dataset)?;
    Ok(dataset)
}
