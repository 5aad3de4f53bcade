//! Property-based tests for the configuration merge engine.
//!
//! These tests use proptest to generate random configuration values and
//! verify that the merge laws hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::merge::merge_values;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value as JsonValue};

    /// Strategy producing arbitrary plain-data JSON values up to a bounded
    /// depth, biased toward objects so recursion actually happens.
    fn value_strategy() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::from),
            any::<i32>().prop_map(JsonValue::from),
            "[a-z]{0,6}".prop_map(JsonValue::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|entries| {
                    JsonValue::Object(entries.into_iter().collect::<Map<_, _>>())
                }),
            ]
        })
    }

    /// Strategy producing arbitrary objects (the shape defaults take).
    fn object_strategy() -> impl Strategy<Value = JsonValue> {
        prop::collection::btree_map("[a-z]{1,4}", value_strategy(), 0..5)
            .prop_map(|entries| JsonValue::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    proptest! {
        /// Property: merging nothing over defaults returns the defaults, in
        /// both modes.
        #[test]
        fn merge_with_absent_overrides_is_identity(
            defaults in object_strategy(),
            recursive in any::<bool>(),
        ) {
            prop_assert_eq!(merge_values(&defaults, None, recursive), defaults.clone());
            prop_assert_eq!(merge_values(&defaults, Some(&json!({})), recursive), defaults);
        }

        /// Property: a complete, same-shape override wins wholesale, in both
        /// modes.
        #[test]
        fn complete_override_wins_regardless_of_recursion(overrides in object_strategy()) {
            // Any object is a complete override of itself-shaped defaults.
            let defaults = overrides.clone();
            prop_assert_eq!(merge_values(&defaults, Some(&overrides), false), overrides.clone());
            prop_assert_eq!(merge_values(&defaults, Some(&overrides), true), overrides);
        }

        /// Property: the merge result carries every default key and every
        /// override key.
        #[test]
        fn merged_key_set_is_the_union(
            defaults in object_strategy(),
            overrides in object_strategy(),
            recursive in any::<bool>(),
        ) {
            let merged = merge_values(&defaults, Some(&overrides), recursive);
            let merged = merged.as_object().unwrap();
            for key in defaults.as_object().unwrap().keys() {
                prop_assert!(merged.contains_key(key), "default key '{}' lost", key);
            }
            for key in overrides.as_object().unwrap().keys() {
                prop_assert!(merged.contains_key(key), "override key '{}' lost", key);
            }
        }

        /// Property: shallow merge takes every override entry verbatim.
        #[test]
        fn shallow_merge_takes_override_entries_verbatim(
            defaults in object_strategy(),
            overrides in object_strategy(),
        ) {
            let merged = merge_values(&defaults, Some(&overrides), false);
            for (key, value) in overrides.as_object().unwrap() {
                prop_assert_eq!(&merged[key], value);
            }
        }

        /// Property: merging is deterministic (same inputs, same output).
        #[test]
        fn merge_is_deterministic(
            defaults in object_strategy(),
            overrides in object_strategy(),
            recursive in any::<bool>(),
        ) {
            let first = merge_values(&defaults, Some(&overrides), recursive);
            let second = merge_values(&defaults, Some(&overrides), recursive);
            prop_assert_eq!(first, second);
        }

        /// Property: default keys keep their positions, override-only keys
        /// append after them.
        #[test]
        fn key_order_is_defaults_then_new_overrides(
            defaults in object_strategy(),
            overrides in object_strategy(),
            recursive in any::<bool>(),
        ) {
            let merged = merge_values(&defaults, Some(&overrides), recursive);
            let default_keys: Vec<&String> = defaults.as_object().unwrap().keys().collect();
            let new_keys: Vec<&String> = overrides
                .as_object()
                .unwrap()
                .keys()
                .filter(|key| !defaults.as_object().unwrap().contains_key(*key))
                .collect();
            let expected: Vec<&String> = default_keys.into_iter().chain(new_keys).collect();
            let actual: Vec<&String> = merged.as_object().unwrap().keys().collect();
            prop_assert_eq!(actual, expected);
        }

        /// Property: under recursion, array-valued override entries replace
        /// the default wholesale, never concatenate.
        #[test]
        fn arrays_replace_under_recursion(
            default_items in prop::collection::vec(any::<i32>(), 0..5),
            override_items in prop::collection::vec(any::<i32>(), 0..5),
        ) {
            let defaults = json!({ "list": default_items });
            let overrides = json!({ "list": override_items.clone() });
            let merged = merge_values(&defaults, Some(&overrides), true);
            prop_assert_eq!(&merged["list"], &json!(override_items));
        }

        /// Property: non-object defaults act as an empty object, so the
        /// result is exactly the overrides.
        #[test]
        fn non_object_defaults_act_as_empty(
            bad in prop_oneof![
                Just(json!(null)),
                any::<i32>().prop_map(JsonValue::from),
                "[a-z]{0,6}".prop_map(JsonValue::from),
            ],
            overrides in object_strategy(),
            recursive in any::<bool>(),
        ) {
            let merged = merge_values(&bad, Some(&overrides), recursive);
            prop_assert_eq!(merged, overrides);
        }
    }
}
