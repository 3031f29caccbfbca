//! Glow pipeline configuration.
//!
//! TOML-backed [`DataSet`] with validation, atomic saving and live
//! reload. Every table has serde defaults so partial files work.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let ds = glow_config::load(Path::new("glow.toml")).expect("failed to load config");
//! println!("{}", glow_config::dataset_to_json(&ds));
//! ```

pub mod reload;
pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;
pub mod watcher;

pub use reload::ReloadManager;
pub use schema::{
    AlphaMode, BlurSettings, CommonConfig, DataSet, LayerConfig, OverlayMode, ThresholdMode,
};
pub use toml_writer::save_to_path;
pub use watcher::ConfigWatcher;

use glow_common::ConfigError;
use std::path::Path;

/// Load and validate a dataset from `path`.
pub fn load(path: &Path) -> Result<DataSet, ConfigError> {
    toml_loader::load_validated(path)
}

/// Serialize a dataset to a pretty-printed JSON string.
pub fn dataset_to_json(ds: &DataSet) -> String {
    serde_json::to_string_pretty(ds)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize dataset: {e}\"}}"))
}
