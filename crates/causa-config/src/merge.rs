//! The configuration merge rule
//!
//! Maps merge recursively. Lists concatenate, with the overlay's items
//! appended to the base's. Every other combination is right-wins. Inputs
//! are never mutated; merging operates on owned clones.

use serde_json::Value;

use crate::layer::RawConfiguration;

/// Merge `overlay` into `base` in place.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items.iter().cloned());
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Fold a list of layers into a single merged tree.
///
/// The fold starts from an empty map, so a single non-map layer (a
/// malformed configuration file) simply wins the right-most position.
pub fn merge_layers(layers: &[RawConfiguration]) -> Value {
    let mut merged = Value::Object(serde_json::Map::new());
    for layer in layers {
        merge_values(&mut merged, &layer.configuration);
    }
    merged
}
