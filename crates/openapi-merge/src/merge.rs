//! Deep merge and top-level override over JSON documents.

use crate::error::PipelineError;
use serde_json::{Map, Value};

/// Combine two documents into a new one, leaving both inputs untouched.
///
/// Rules, in order:
///
/// 1. **Mapping + mapping**: key union. Keys present in both are merged recursively;
///    keys present in one side are taken as-is. Result order is `source`'s keys
///    followed by `target`-only keys.
/// 2. **Sequence + sequence**: `source` elements followed by `target` elements.
/// 3. **Anything else**: `target` wins. This covers scalars, type mismatches and a
///    `null`/absent `source`.
///
/// ```
/// use openapi_merge::merge;
/// use serde_json::json;
///
/// let merged = merge(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}));
/// assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));
/// ```
pub fn merge(source: &Value, target: &Value) -> Value {
    merge_owned(source.clone(), target.clone())
}

/// Consuming form of [`merge`], used when folding a running result.
pub fn merge_owned(source: Value, target: Value) -> Value {
    match (source, target) {
        (Value::Object(mut source), Value::Object(target)) => {
            for (key, value) in target {
                match source.get_mut(&key) {
                    Some(slot) => {
                        // `take` keeps the key's position; `remove` would reorder.
                        let existing = std::mem::take(slot);
                        *slot = merge_owned(existing, value);
                    }
                    None => {
                        source.insert(key, value);
                    }
                }
            }
            Value::Object(source)
        }
        (Value::Array(mut source), Value::Array(target)) => {
            source.extend(target);
            Value::Array(source)
        }
        (_, target) => target,
    }
}

/// Overlay `overrides` onto the top level of `document`.
///
/// Each override key replaces the whole value at that key; nested mappings are not
/// merged. Existing keys keep their position and new keys are appended.
pub fn apply_override(
    document: Value,
    overrides: &Map<String, Value>,
) -> Result<Value, PipelineError> {
    let Value::Object(mut document) = document else {
        return Err(PipelineError::NotAMapping);
    };
    for (key, value) in overrides {
        document.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_empty_source_yields_target() {
        let target = json!({"openapi": "3.1.0", "paths": {"/a": {}}, "tags": [1]});
        assert_eq!(merge(&json!({}), &target), target);
        assert_eq!(merge(&json!({}), &json!([1, 2])), json!([1, 2]));
        assert_eq!(merge(&json!({}), &json!("x")), json!("x"));
    }

    #[test]
    fn test_empty_mappings() {
        assert_eq!(merge(&json!({}), &json!({})), json!({}));
    }

    #[test]
    fn test_scalar_target_wins() {
        assert_eq!(merge(&json!(1), &json!(2)), json!(2));
        assert_eq!(merge(&json!("a"), &json!("b")), json!("b"));
        assert_eq!(merge(&json!(true), &json!(false)), json!(false));
        assert_eq!(merge(&json!("a"), &json!(null)), json!(null));
    }

    #[test]
    fn test_absent_source() {
        assert_eq!(merge(&Value::Null, &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge(&Value::Null, &json!([1])), json!([1]));
    }

    #[test]
    fn test_sequences_concatenate() {
        assert_eq!(merge(&json!([1, 2]), &json!([3, 4])), json!([1, 2, 3, 4]));
        // No deduplication
        assert_eq!(merge(&json!([1]), &json!([1])), json!([1, 1]));
    }

    #[test]
    fn test_nested_mappings_merge() {
        assert_eq!(
            merge(&json!({"a": {"x": 1}}), &json!({"a": {"y": 2}})),
            json!({"a": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn test_key_union_with_target_precedence() {
        assert_eq!(
            merge(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4})),
            json!({"a": 1, "b": 3, "c": 4})
        );
    }

    #[test]
    fn test_type_mismatch_takes_target() {
        assert_eq!(merge(&json!({"a": 1}), &json!([1])), json!([1]));
        assert_eq!(merge(&json!([1]), &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge(&json!({"a": 1}), &json!("s")), json!("s"));
        assert_eq!(
            merge(&json!({"k": {"x": 1}}), &json!({"k": [1]})),
            json!({"k": [1]})
        );
    }

    #[test]
    fn test_key_order_source_then_new_target_keys() {
        let merged = merge(
            &json!({"z": 1, "a": 1, "m": 1}),
            &json!({"b": 2, "a": 2, "y": 2}),
        );
        assert_eq!(keys(&merged), vec!["z", "a", "m", "b", "y"]);
    }

    #[test]
    fn test_inputs_unchanged() {
        let source = json!({"a": {"x": [1]}});
        let target = json!({"a": {"x": [2], "y": 1}});
        let merged = merge(&source, &target);

        assert_eq!(source, json!({"a": {"x": [1]}}));
        assert_eq!(target, json!({"a": {"x": [2], "y": 1}}));
        assert_eq!(merged, json!({"a": {"x": [1, 2], "y": 1}}));
    }

    #[test]
    fn test_openapi_documents() {
        let users = json!({
            "openapi": "3.1.0",
            "paths": {"/users": {"get": {"summary": "List users"}}},
            "components": {"schemas": {"User": {"type": "object"}}},
            "tags": [{"name": "users"}]
        });
        let orders = json!({
            "openapi": "3.0.3",
            "paths": {"/orders": {"get": {"summary": "List orders"}}},
            "components": {"schemas": {"Order": {"type": "object"}}},
            "tags": [{"name": "orders"}]
        });

        let merged = merge(&users, &orders);
        assert_eq!(merged["openapi"], "3.0.3");
        assert!(merged["paths"]["/users"]["get"].is_object());
        assert!(merged["paths"]["/orders"]["get"].is_object());
        assert_eq!(keys(&merged["components"]["schemas"]), vec!["User", "Order"]);
        assert_eq!(merged["tags"], json!([{"name": "users"}, {"name": "orders"}]));
    }

    #[test]
    fn test_override_replaces_whole_values() {
        let document = json!({"info": {"title": "L", "version": "1"}, "paths": {}});
        let overrides = json!({"info": {"title": "O"}, "servers": [{"url": "/"}]});

        let result = apply_override(document, overrides.as_object().unwrap()).unwrap();
        assert_eq!(result["info"], json!({"title": "O"}));
        assert_eq!(keys(&result), vec!["info", "paths", "servers"]);
    }

    #[test]
    fn test_override_requires_mapping() {
        let result = apply_override(json!([1, 2]), &Map::new());
        assert!(matches!(result, Err(PipelineError::NotAMapping)));
    }
}
