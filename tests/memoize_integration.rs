//! Integration tests for memoized collection transforms.
//!
//! Covers each target mode, result reuse across calls and across versions
//! of a persistent tree, error handling, and weak cache keys.

use immutable_memo::prelude::*;
use std::cell::Cell;

fn doubled(field: &'static str) -> impl FnMut(&Value) -> Value {
    move |value: &Value| Value::Int(value.get(field).and_then(Value::as_i64).unwrap_or(0) * 2)
}

fn record(field: &str, n: i64) -> Value {
    Value::from(Map::from_iter([(field, n)]))
}

fn two_records(field: &str) -> Value {
    Value::from(Map::from_iter([("a", record(field, 1)), ("b", record(field, 2))]))
}

/// A map of `size` small records keyed `id-<n>`.
fn large_map(size: usize) -> Map {
    (0..size)
        .map(|i| {
            let id = format!("id-{i}");
            let entry = Map::from_iter([
                ("id", Value::from(id.as_str())),
                ("payload", Value::from(format!("payload-{i}"))),
            ]);
            (id, entry)
        })
        .collect()
}

#[test]
fn test_map_in_same_mode() {
    let mut transform = memoize_transform(doubled("v"), TargetMode::Same);
    let result = transform.call(&two_records("v")).unwrap();

    assert_eq!(result.kind(), ValueKind::Map);
    assert_eq!(result.len(), Some(2));
    assert_eq!(result.get("a"), Some(&Value::Int(2)));
    assert_eq!(result.get("b"), Some(&Value::Int(4)));
}

#[test]
fn test_set_in_same_mode() {
    let mut transform = memoize_transform(doubled("v"), None::<&str>);
    let data = Value::from(Set::from_iter([record("v", 1), record("v", 2)]));
    let result = transform.call(&data).unwrap();

    let set = result.as_set().expect("set in, set out");
    assert_eq!(set.len(), 2);
    assert!(set.contains(&Value::Int(2)));
    assert!(set.contains(&Value::Int(4)));
}

#[test]
fn test_list_in_same_mode() {
    let mut transform = memoize_transform(doubled("v"), "same");
    let data = Value::from(List::from_iter([record("v", 1), record("v", 2)]));
    let result = transform.call(&data).unwrap();

    let list = result.as_list().expect("list in, list out");
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(0), Some(&Value::Int(2)));
    assert_eq!(list.get(1), Some(&Value::Int(4)));
}

#[test]
fn test_map_to_array() {
    let mut transform = memoize_transform(doubled("val"), "array");
    let result = transform.call(&two_records("val")).unwrap();

    let array = result.as_array().expect("array output");
    assert_eq!(array.iter().collect::<Vec<_>>(), vec![&Value::Int(2), &Value::Int(4)]);
}

#[test]
fn test_map_to_object() {
    let mut transform = memoize_transform(doubled("val"), "object");
    let result = transform.call(&two_records("val")).unwrap();

    let object = result.as_object().expect("object output");
    assert_eq!(object.get("a"), Some(&Value::Int(2)));
    assert_eq!(object.get("b"), Some(&Value::Int(4)));
}

#[test]
fn test_map_to_list() {
    let mut transform = memoize_transform(doubled("val"), "list");
    let result = transform.call(&two_records("val")).unwrap();

    let list = result.as_list().expect("list output");
    assert_eq!(list.get(0), Some(&Value::Int(2)));
    assert_eq!(list.get(1), Some(&Value::Int(4)));
}

#[test]
fn test_set_to_map_keys_by_member() {
    let mut transform = memoize_transform(doubled("val"), "map");
    let a = record("val", 1);
    let b = record("val", 2);
    let data = Value::from(Set::from_iter([a.clone(), b.clone()]));
    let result = transform.call(&data).unwrap();

    let map = result.as_map().expect("map output");
    assert_eq!(map.get(&a), Some(&Value::Int(2)));
    assert_eq!(map.get(&b), Some(&Value::Int(4)));
}

#[test]
fn test_set_to_seq() {
    let mut transform = memoize_transform(doubled("val"), "seq");
    let data = Value::from(Set::from_iter([record("val", 1), record("val", 2)]));
    let result = transform.call(&data).unwrap();

    let seq = result.as_seq().expect("seq output");
    assert_eq!(seq.kind(), SeqKind::Set);

    let mut values: Vec<i64> = seq.values().filter_map(Value::as_i64).collect();
    values.sort_unstable();
    assert_eq!(values, vec![2, 4]);
}

#[test]
fn test_same_mode_on_plain_containers() {
    let mut transform = memoize_transform(doubled("v"), TargetMode::Same);

    let array = Value::from(Array::from_iter([record("v", 3)]));
    assert_eq!(
        transform.call(&array).unwrap(),
        Value::from(Array::from_iter([6]))
    );

    let object = Value::from(Object::from_iter([("x", record("v", 5))]));
    assert_eq!(
        transform.call(&object).unwrap(),
        Value::from(Object::from_iter([("x", 10)]))
    );
}

#[test]
fn test_mode_names_ignore_case() {
    let mut transform = memoize_transform(doubled("val"), "ARRAY");
    assert_eq!(transform.mode(), TargetMode::Array);
    assert_eq!(
        transform.call(&two_records("val")).unwrap().kind(),
        ValueKind::Array
    );

    let fallback = memoize_transform(doubled("val"), "hashmap");
    assert_eq!(fallback.mode(), TargetMode::Same);
}

#[test]
fn test_null_input() {
    let mut transform = memoize_transform(doubled("v"), "object");

    assert_eq!(transform.call(&Value::Null).unwrap(), Value::Null);
    assert_eq!(transform.call_opt(None).unwrap(), None);
    assert_eq!(transform.stats().misses, 0);
}

#[test]
fn test_null_entries_skip_the_leaf() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |value: &Value| {
            calls.set(calls.get() + 1);
            value.clone()
        },
        "list",
    );
    let data = Value::from(List::from_iter([Value::Null, record("v", 1), Value::Null]));

    let result = transform.call(&data).unwrap();
    assert_eq!(result.get(0usize), Some(&Value::Null));
    assert_eq!(result.get(2usize), Some(&Value::Null));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_reuses_full_result() {
    let large = Value::from(large_map(5000));
    let mut transform = memoize_transform(|v: &Value| v.to_plain(), "object");

    let slow: Vec<Value> = (0..2).map(|_| large.to_plain()).collect();
    let fast: Vec<Value> = (0..5).map(|_| transform.call(&large).unwrap()).collect();

    assert!(!slow[0].ptr_eq(&slow[1]));
    assert!(fast.windows(2).all(|w| w[0].ptr_eq(&w[1])));
    assert_eq!(fast[0], slow[0]);
    assert_eq!(transform.stats().hits, 4);
}

#[test]
fn test_reuses_nested_results() {
    let base = large_map(5000);
    let calls = Cell::new(0usize);
    let mut transform = memoize_transform(
        |v: &Value| {
            calls.set(calls.get() + 1);
            v.to_plain()
        },
        "object",
    );

    let mut slow = Vec::new();
    let mut fast = Vec::new();
    for cycle in 0..5 {
        // Each version adds one fresh key to the shared base.
        let version = Value::from(base.set(format!("extra-{cycle}"), Map::new()));
        slow.push(version.to_plain());
        fast.push(transform.call(&version).unwrap());
    }

    for key in base.keys() {
        let key = key.to_key_string();
        let slow_first = slow[0].get(key.as_str()).unwrap();
        let slow_second = slow[1].get(key.as_str()).unwrap();
        assert!(!slow_first.ptr_eq(slow_second));

        let fast_first = fast[0].get(key.as_str()).unwrap();
        let fast_second = fast[1].get(key.as_str()).unwrap();
        assert!(fast_first.ptr_eq(fast_second));
    }

    // 5000 shared entries once, plus one fresh entry per version.
    assert_eq!(calls.get(), 5000 + 5);
}

#[test]
fn test_leaf_runs_once_per_container() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |v: &Value| {
            calls.set(calls.get() + 1);
            v.to_plain()
        },
        "array",
    );
    let shared = record("v", 1);
    let first = Value::from(List::from_iter([shared.clone(), record("v", 2)]));
    let second = Value::from(List::from_iter([shared.clone()]));

    transform.call(&first).unwrap();
    transform.call(&second).unwrap();
    transform.call(&first).unwrap();

    assert_eq!(calls.get(), 2);
}

#[test]
fn test_scalar_entries_reach_the_leaf_every_time() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |v: &Value| {
            calls.set(calls.get() + 1);
            Value::Int(v.as_i64().unwrap_or(0) + 1)
        },
        "list",
    );

    let first = Value::from(List::from_iter([1, 2, 3]));
    let second = Value::from(List::from_iter([1, 2, 3]));
    transform.call(&first).unwrap();
    transform.call(&second).unwrap();

    assert_eq!(calls.get(), 6);
}

#[test]
fn test_structurally_equal_containers_are_distinct_keys() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |v: &Value| {
            calls.set(calls.get() + 1);
            v.to_plain()
        },
        "same",
    );

    let first = Value::from(List::from_iter([record("v", 1)]));
    let second = Value::from(List::from_iter([record("v", 1)]));
    assert_eq!(first, second);

    let out_first = transform.call(&first).unwrap();
    let out_second = transform.call(&second).unwrap();

    assert_eq!(out_first, out_second);
    assert!(!out_first.ptr_eq(&out_second));
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_one_level_of_recursion() {
    let mut seen = Vec::new();
    let mut transform = memoize_transform(
        |v: &Value| {
            seen.push(v.clone());
            Value::from("leaf")
        },
        "same",
    );
    let deepest = Value::from(List::from_iter([1]));
    let middle = Value::from(List::from_iter([deepest.clone()]));
    let outer = Value::from(List::from_iter([middle.clone()]));

    let result = transform.call(&outer).unwrap();
    drop(transform);

    assert_eq!(result, Value::from(List::from_iter(["leaf"])));
    assert_eq!(seen.len(), 1);
    assert!(seen[0].ptr_eq(&middle));
}

#[test]
fn test_leaf_error_propagates_without_caching() {
    #[derive(Debug, PartialEq)]
    enum ConvertError {
        Negative(i64),
        Collection(CollectionError),
    }

    impl From<CollectionError> for ConvertError {
        fn from(e: CollectionError) -> Self {
            ConvertError::Collection(e)
        }
    }

    let mut transform = try_memoize_transform(
        |v: &Value| match v.get("n").and_then(Value::as_i64) {
            Some(n) if n < 0 => Err(ConvertError::Negative(n)),
            Some(n) => Ok(Value::Int(n)),
            None => Ok(Value::Null),
        },
        "seq",
    );

    let good = Value::from(Map::from_iter([("n", 1)]));
    let bad = Value::from(Map::from_iter([("n", -4)]));
    let data = Value::from(List::from_iter([good.clone(), bad.clone()]));

    assert_eq!(transform.call(&data), Err(ConvertError::Negative(-4)));
    assert!(!transform.cache().contains(&data));
    assert!(!transform.cache().contains(&bad));
    assert!(transform.cache().contains(&good));

    // Scalars at the top level are rejected by the pipeline.
    assert_eq!(
        transform.call(&Value::from("text")),
        Err(ConvertError::Collection(CollectionError::NotACollection(
            ValueKind::Str
        )))
    );
}

#[test]
fn test_dropped_keys_do_not_pin_entries() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |v: &Value| {
            calls.set(calls.get() + 1);
            v.to_plain()
        },
        "object",
    );

    {
        let temp = two_records("v");
        transform.call(&temp).unwrap();
        assert_eq!(transform.cache().live_len(), 3);
    }

    // No insert since the drop, so nothing has been swept yet.
    assert_eq!(transform.cache().live_len(), 0);
    assert_eq!(transform.cache().len(), 3);
    assert_eq!(transform.purge_dead(), 3);
    assert!(transform.cache().is_empty());

    let fresh = two_records("v");
    transform.call(&fresh).unwrap();
    assert_eq!(calls.get(), 4);
}

#[test]
fn test_cached_result_outlives_dropped_input() {
    let mut transform = memoize_transform(|v: &Value| v.to_plain(), "array");
    let result = {
        let temp = Value::from(List::from_iter([record("v", 1)]));
        transform.call(&temp).unwrap()
    };

    transform.purge_dead();
    assert_eq!(
        result,
        Value::from(Array::from_iter([Value::from(Object::from_iter([("v", 1)]))]))
    );
}

#[test]
fn test_independent_transforms_do_not_share_caches() {
    let data = two_records("v");
    let mut first = memoize_transform(doubled("v"), "object");
    let mut second = memoize_transform(doubled("v"), "object");

    let a = first.call(&data).unwrap();
    let b = second.call(&data).unwrap();

    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
    assert_eq!(second.stats().hits, 0);
}

#[test]
fn test_builder_transform() {
    let mut transform = TransformBuilder::new()
        .leaf(LeafFn::new(doubled("v")))
        .mode("map")
        .sweep_threshold(8)
        .build()
        .unwrap();

    let data = Value::from(List::from_iter([record("v", 1), record("v", 2)]));
    let result = transform.call(&data).unwrap();

    let map = result.as_map().expect("map output");
    assert_eq!(map.get(&Value::Int(0)), Some(&Value::Int(2)));
    assert_eq!(map.get(&Value::Int(1)), Some(&Value::Int(4)));
}

#[test]
fn test_null_leaf_results_are_cache_hits() {
    let calls = Cell::new(0);
    let mut transform = memoize_transform(
        |_: &Value| {
            calls.set(calls.get() + 1);
            Value::Null
        },
        "same",
    );
    let child = record("v", 1);
    let first = Value::from(List::from_iter([child.clone()]));
    let second = Value::from(List::from_iter([child.clone(), child.clone()]));

    assert_eq!(transform.call(&first).unwrap(), Value::from(List::from_iter([Value::Null])));
    transform.call(&second).unwrap();
    assert_eq!(transform.map_contents(&child).unwrap(), Value::Null);

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_identity_leaf_releases_inputs() {
    let mut transform = memoize_transform(|v: &Value| v.clone(), "same");
    let mut watched = Vec::new();

    for i in 0..100 {
        let input = Value::from(List::from_iter([record("v", i)]));
        let output = transform.call(&input).unwrap();
        assert_eq!(output, input);
        watched.push(input.get(0usize).and_then(Value::weak_key).unwrap());
    }

    // Earlier inserts may already have swept some of them.
    transform.purge_dead();
    assert_eq!(transform.stats().purged, 200);
    assert!(transform.cache().is_empty());
    assert!(watched.iter().all(|key| !key.is_live()));
}

#[test]
fn test_identity_leaf_hit_returns_the_input() {
    let mut transform = memoize_transform(|v: &Value| v.clone(), "list");
    let child = record("v", 1);
    let input = Value::from(List::from_iter([child.clone()]));

    transform.call(&input).unwrap();
    let again = transform.map_contents(&child).unwrap();

    assert!(again.ptr_eq(&child));
    assert_eq!(transform.stats().hits, 1);
}
