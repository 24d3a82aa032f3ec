//! Template object detection
//!
//! A template object is a map whose *only* key equals the template
//! marker. Detection never evaluates the format string; it is used both
//! by the renderer and by configuration readers that must refuse to hand
//! out unrendered templates.

use serde_json::Value;

/// Default template marker key.
pub const DEFAULT_MARKER: &str = "$format";

/// Check whether `value` is a template object for the given marker.
pub fn is_template_object(marker: &str, value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.contains_key(marker))
}

/// Return the format string of a template object, if `value` is one.
///
/// Returns `None` when `value` is not a template object. A template
/// object whose marker value is not a string is reported by the renderer
/// as a rendering failure, not here.
pub fn template_format<'a>(marker: &str, value: &'a Value) -> Option<&'a Value> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(marker)
}

/// Check whether any node under `value` is a template object.
///
/// True iff rendering `value` would alter it.
pub fn contains_template(marker: &str, value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            is_template_object(marker, value)
                || map.values().any(|child| contains_template(marker, child))
        }
        Value::Array(items) => items.iter().any(|item| contains_template(marker, item)),
        _ => false,
    }
}
