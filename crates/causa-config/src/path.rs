//! Dotted configuration paths
//!
//! Paths address nodes in a value tree: dotted keys descend into maps,
//! numeric segments index lists. A missing segment yields `None` rather
//! than an error.

use serde_json::Value;

/// Resolve a dotted path against a value tree.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether `prefix` addresses `path` itself or one of its ancestors.
///
/// Comparison is segment-wise: `a.b` is a prefix of `a.b.c` but `a` is
/// not a prefix of `ab`.
pub fn is_path_prefix(prefix: &str, path: &str) -> bool {
    let mut prefix_segments = prefix.split('.');
    let mut path_segments = path.split('.');
    loop {
        match (prefix_segments.next(), path_segments.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(a), Some(b)) if a == b => continue,
            _ => return false,
        }
    }
}
