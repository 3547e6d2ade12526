//! Deep merge of configuration trees.
//!
//! Higher precedence values override lower precedence values field by field.
//! Arrays are replaced entirely, not concatenated.

use super::ConfigTree;
use serde_json::Value;

/// Deep merge two trees, with `overlay` taking precedence over `base`.
///
/// - Objects on both sides are merged recursively
/// - Any other overlay value (arrays, scalars, null) replaces the base value
/// - Keys only present in `base` are kept unchanged
///
/// Neither input is modified; the result is a new tree.
///
/// # Example
/// ```
/// use serde_json::json;
/// use sonoma::config::{ConfigTree, merge};
///
/// let base: ConfigTree = serde_json::from_value(json!({
///     "network": "devnet",
///     "auth": { "apiKey": "old", "user": "dev" }
/// })).unwrap();
/// let overlay: ConfigTree = serde_json::from_value(json!({
///     "auth": { "apiKey": "new" }
/// })).unwrap();
/// let merged = merge(&base, &overlay);
/// assert_eq!(merged["auth"], json!({ "apiKey": "new", "user": "dev" }));
/// assert_eq!(merged["network"], json!("devnet"));
/// ```
pub fn merge(base: &ConfigTree, overlay: &ConfigTree) -> ConfigTree {
    let mut merged = base.clone();
    for (key, overlay_value) in overlay {
        let value = match (merged.get(key), overlay_value) {
            (Some(Value::Object(base_child)), Value::Object(overlay_child)) => {
                Value::Object(merge(base_child, overlay_child))
            }
            (_, overlay_value) => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Merge trees in order, with later trees taking precedence.
///
/// Equivalent to folding `merge` over the list starting from an empty tree.
pub fn merge_all<'a>(trees: impl IntoIterator<Item = &'a ConfigTree>) -> ConfigTree {
    trees
        .into_iter()
        .fold(ConfigTree::new(), |acc, tree| merge(&acc, tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_merge_simple_objects() {
        let base = tree(json!({"a": 1, "b": 2}));
        let overlay = tree(json!({"b": 3, "c": 4}));
        let result = merge(&base, &overlay);
        assert_eq!(result, tree(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn test_merge_nested_objects() {
        let base = tree(json!({"a": {"b": 1, "c": 2}}));
        let overlay = tree(json!({"a": {"c": 3, "d": 4}}));
        let result = merge(&base, &overlay);
        assert_eq!(result, tree(json!({"a": {"b": 1, "c": 3, "d": 4}})));
    }

    #[test]
    fn test_inputs_unchanged() {
        let base = tree(json!({"a": {"b": 1}, "list": [1, 2]}));
        let overlay = tree(json!({"a": {"b": 2, "c": 3}, "list": [3]}));
        let base_before = base.clone();
        let overlay_before = overlay.clone();
        let _ = merge(&base, &overlay);
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn test_empty_identities() {
        let a = tree(json!({"x": 1, "nested": {"y": [true]}}));
        assert_eq!(merge(&a, &ConfigTree::new()), a);
        assert_eq!(merge(&ConfigTree::new(), &a), a);
    }

    #[test]
    fn test_scalar_override() {
        let result = merge(&tree(json!({"x": 1})), &tree(json!({"x": 2})));
        assert_eq!(result["x"], json!(2));
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let result = merge(&tree(json!({"x": [1, 2]})), &tree(json!({"x": [3]})));
        assert_eq!(result["x"], json!([3]));
    }

    #[test]
    fn test_null_replaces_base() {
        let result = merge(&tree(json!({"a": 1})), &tree(json!({"a": null})));
        assert_eq!(result["a"], Value::Null);
    }

    #[test]
    fn test_overlay_replaces_primitive_with_object() {
        let base = tree(json!({"value": 42}));
        let overlay = tree(json!({"value": {"nested": true}}));
        assert_eq!(merge(&base, &overlay), overlay);
    }

    #[test]
    fn test_overlay_replaces_object_with_primitive() {
        let base = tree(json!({"value": {"nested": true}}));
        let overlay = tree(json!({"value": 42}));
        assert_eq!(merge(&base, &overlay), overlay);
    }

    #[test]
    fn test_merge_all() {
        let trees = [
            tree(json!({"a": 1})),
            tree(json!({"b": 2})),
            tree(json!({"a": 3, "c": 4})),
        ];
        let result = merge_all(&trees);
        assert_eq!(result, tree(json!({"a": 3, "b": 2, "c": 4})));
    }

    #[test]
    fn test_merge_all_empty() {
        let none: [ConfigTree; 0] = [];
        assert!(merge_all(&none).is_empty());
    }
}
