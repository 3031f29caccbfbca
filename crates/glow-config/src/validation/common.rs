//! `[common]` table validation.

use glow_common::Color;

use crate::schema::DataSet;

use super::helpers::validate_range_f32;

pub(crate) fn validate_common(errors: &mut Vec<String>, ds: &DataSet) {
    if Color::from_hex(&ds.common.clear_color).is_none() {
        errors.push(format!(
            "common.clear_color = {:?} is not a hex colour",
            ds.common.clear_color
        ));
    }
    validate_range_f32(
        errors,
        "common.overlay_height",
        ds.common.overlay_height,
        0.0,
        1.0,
    );
}
