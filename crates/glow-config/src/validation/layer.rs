//! `[[layers]]` validation, including the nested blur table.

use crate::schema::DataSet;

use super::helpers::{validate_range, validate_range_f32};

/// Highest scene layer a 32-bit layer mask can address.
pub const MAX_SCENE_LAYER: u32 = 31;

pub(crate) fn validate_layers(errors: &mut Vec<String>, ds: &DataSet) {
    for (i, layer) in ds.layers.iter().enumerate() {
        validate_range(
            errors,
            &format!("layers[{i}].scene_layer"),
            layer.scene_layer,
            0,
            MAX_SCENE_LAYER,
        );
        validate_range_f32(
            errors,
            &format!("layers[{i}].intensity"),
            layer.intensity,
            0.0,
            64.0,
        );
        validate_range_f32(
            errors,
            &format!("layers[{i}].threshold"),
            layer.threshold,
            0.0,
            1.0,
        );
        validate_range(
            errors,
            &format!("layers[{i}].blur.iterations"),
            layer.blur.iterations,
            1,
            8,
        );
        validate_range_f32(
            errors,
            &format!("layers[{i}].blur.spread"),
            layer.blur.spread,
            0.0,
            8.0,
        );
        validate_range(
            errors,
            &format!("layers[{i}].blur.downsample"),
            layer.blur.downsample,
            1,
            4,
        );
    }
}
