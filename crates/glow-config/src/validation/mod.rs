//! DataSet validation.
//!
//! Checks every numeric range and the clear colour format, collecting all
//! errors into a single `ConfigError`.

mod common;
mod helpers;
mod layer;


pub use layer::MAX_SCENE_LAYER;

use crate::schema::DataSet;
use glow_common::ConfigError;

/// Run all validations on a dataset, collecting all errors.
pub fn validate(ds: &DataSet) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    common::validate_common(&mut errors, ds);
    layer::validate_layers(&mut errors, ds);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
