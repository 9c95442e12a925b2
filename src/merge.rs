//! Deep merge for partial document updates.
//!
//! Plain nested objects merge recursively by key; arrays and scalars in the
//! patch replace the corresponding base value wholesale. This is the merge
//! contract behind [`DocumentRef::update`](crate::DocumentRef::update).

use serde_json::{Map, Value};

/// Merge `patch` over `base`.
///
/// When both sides are objects their fields merge recursively; any other
/// pairing resolves to the patch value.
pub fn deep_merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            Value::Object(merge_records(base, patch))
        }
        (_, patch) => patch,
    }
}

/// Merge two object maps field by field.
pub fn merge_records(
    mut base: Map<String, Value>,
    patch: Map<String, Value>,
) -> Map<String, Value> {
    for (key, patch_value) in patch {
        let merged = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, patch_value),
            None => patch_value,
        };
        base.insert(key, merged);
    }
    base
}
