//! Configuration value merging
//!
//! This module provides the merge engine that turns a complete default
//! configuration plus a partial (possibly recursively partial) override into
//! a fully-populated configuration value.
//!
//! ## Features
//!
//! - Shallow merging as the baseline: override entries replace same-keyed
//!   default entries wholesale
//! - Opt-in recursive descent that combines nested objects key-by-key
//! - Array handling with replace or concat-and-dedup modes
//! - An async variant that resolves sibling keys concurrently
//!
//! Both variants are permissive: invalid input never produces an error, it
//! degrades to best-effort object construction. A non-object default acts as
//! an empty object; a non-object override leaves the defaults untouched.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use stagehand::merge::merge_values;
//!
//! let defaults = json!({ "a": 1, "child": { "x": 1, "y": 2 } });
//! let overrides = json!({ "child": { "x": 9 } });
//!
//! let shallow = merge_values(&defaults, Some(&overrides), false);
//! assert_eq!(shallow["child"], json!({ "x": 9 }));
//!
//! let recursive = merge_values(&defaults, Some(&overrides), true);
//! assert_eq!(recursive["child"], json!({ "x": 9, "y": 2 }));
//! ```

use futures::future::{join_all, BoxFuture, FutureExt};
use serde_json::{Map, Value as JsonValue};

/// Merge a partial override value over a complete default value.
///
/// The result always carries every key of `defaults`, with override values
/// winning. With `recursive` false the merge is shallow: any override entry
/// replaces the default entry wholesale, nested objects included. With
/// `recursive` true, keys whose default *and* override values are both plain
/// objects are combined key-by-key instead; null, scalar, and array values
/// are still replaced wholesale (arrays are never concatenated here).
///
/// Key order is preserved: default keys keep their positions, override-only
/// keys are appended in override order.
///
/// # Arguments
///
/// * `defaults` - The complete default configuration; non-objects act as `{}`
/// * `overrides` - The caller's partial configuration, if any
/// * `recursive` - Whether nested objects are combined rather than replaced
pub fn merge_values(
    defaults: &JsonValue,
    overrides: Option<&JsonValue>,
    recursive: bool,
) -> JsonValue {
    let default_map = match defaults {
        JsonValue::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let override_map = match overrides {
        Some(JsonValue::Object(map)) => map,
        _ => return JsonValue::Object(default_map),
    };

    let mut merged = default_map.clone();
    for (key, value) in override_map {
        merged.insert(key.clone(), value.clone());
    }

    if !recursive {
        return JsonValue::Object(merged);
    }

    for (key, default_value) in &default_map {
        let Some(override_value) = override_map.get(key) else {
            continue;
        };
        if !default_value.is_object() || !override_value.is_object() {
            continue;
        }
        merged.insert(
            key.clone(),
            merge_values(default_value, Some(override_value), true),
        );
    }

    JsonValue::Object(merged)
}

/// Async twin of [`merge_values`] with concurrent sibling resolution.
///
/// Behavior matches the sync variant except for two points:
///
/// - when `recursive` and `merge_arrays` are both set, two array values at
///   the same key are concatenated and deduplicated (first occurrence wins,
///   by equality) instead of the override replacing the default;
/// - recursive descent fans out over the sibling keys of one object level and
///   gathers them in a single join, preserving key order on reassembly. Each
///   branch owns its disjoint key, so there is no shared state between them.
pub async fn merge_values_async(
    defaults: JsonValue,
    overrides: Option<JsonValue>,
    recursive: bool,
    merge_arrays: bool,
) -> JsonValue {
    merge_entry(defaults, overrides, recursive, merge_arrays).await
}

/// Recursion step behind [`merge_values_async`], boxed so the async fn can
/// call itself.
fn merge_entry(
    defaults: JsonValue,
    overrides: Option<JsonValue>,
    recursive: bool,
    merge_arrays: bool,
) -> BoxFuture<'static, JsonValue> {
    async move {
        let default_map = match defaults {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };

        let override_map = match overrides {
            Some(JsonValue::Object(map)) => map,
            _ => return JsonValue::Object(default_map),
        };

        let mut merged = default_map.clone();
        for (key, value) in &override_map {
            merged.insert(key.clone(), value.clone());
        }

        if !recursive {
            return JsonValue::Object(merged);
        }

        let tasks = merged.into_iter().map(|(key, shallow_value)| {
            let default_value = default_map.get(&key).cloned();
            let override_value = override_map.get(&key).cloned();
            async move {
                let resolved = match (default_value, override_value) {
                    (Some(d), Some(o)) if d.is_object() && o.is_object() => {
                        merge_entry(d, Some(o), true, merge_arrays).await
                    }
                    (Some(JsonValue::Array(d)), Some(JsonValue::Array(o))) if merge_arrays => {
                        concat_dedup(d, o)
                    }
                    _ => shallow_value,
                };
                (key, resolved)
            }
        });

        let entries: Map<String, JsonValue> = join_all(tasks).await.into_iter().collect();
        JsonValue::Object(entries)
    }
    .boxed()
}

/// Concatenate two arrays, dropping every repeated element after its first
/// occurrence.
fn concat_dedup(first: Vec<JsonValue>, second: Vec<JsonValue>) -> JsonValue {
    let mut out: Vec<JsonValue> = Vec::with_capacity(first.len() + second.len());
    for item in first.into_iter().chain(second) {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    JsonValue::Array(out)
}
