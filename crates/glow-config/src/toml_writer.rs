//! Write a DataSet to TOML on disk.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place so a
//! crash mid-write never leaves a truncated config behind.

use std::path::Path;

use glow_common::ConfigError;

use crate::schema::DataSet;

/// Serialize a dataset to a TOML string.
pub fn to_toml_string(dataset: &DataSet) -> Result<String, ConfigError> {
    toml::to_string_pretty(dataset)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))
}

/// Write a dataset to a specific path, creating parent directories.
pub fn save_to_path(dataset: &DataSet, path: &Path) -> Result<(), ConfigError> {
    let toml_str = to_toml_string(dataset)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write config to {}: {e}",
            tmp_path.display()
        ))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        tracing::warn!("atomic rename failed ({e}), falling back to direct write");
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::ParseError(format!(
                "failed to write config to {}: {e2}",
                path.display()
            ))
        })?;
    }

    tracing::debug!(path = %path.display(), "glow config saved to disk");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LayerConfig, OverlayMode};
    use crate::toml_loader::load_from_path;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_layers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glow.toml");

        let mut ds = DataSet::default();
        ds.common.overlay_mode = OverlayMode::Glow;
        ds.layers.push(LayerConfig::on_layer(5));
        ds.layers.push(LayerConfig {
            enabled: false,
            ..LayerConfig::on_layer(6)
        });
        save_to_path(&ds, &path).unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded, ds);
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("glow.toml");

        save_to_path(&DataSet::default(), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
