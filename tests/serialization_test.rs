//! JSON fixtures through memoized transforms.

#[cfg(feature = "serialization")]
mod serialization_tests {
    use immutable_memo::prelude::*;
    use serde_json::json;

    fn fixture() -> Value {
        Value::from(json!({
            "ada": { "born": 1815, "langs": ["analytical engine"] },
            "grace": { "born": 1906, "langs": ["cobol", "flow-matic"] }
        }))
    }

    #[test]
    fn test_fixture_becomes_persistent_tree() {
        let tree = fixture();

        assert_eq!(tree.kind(), ValueKind::Map);
        let grace = tree.get("grace").unwrap();
        assert_eq!(grace.kind(), ValueKind::Map);
        assert_eq!(grace.get("langs").unwrap().kind(), ValueKind::List);
    }

    #[test]
    fn test_transform_output_serializes() {
        let mut names = memoize_transform(
            |v: &Value| v.get("langs").cloned().unwrap_or(Value::Null),
            "object",
        );

        let out = names.call(&fixture()).unwrap();
        assert_eq!(
            out.to_json().unwrap(),
            json!({
                "ada": ["analytical engine"],
                "grace": ["cobol", "flow-matic"]
            })
        );
    }

    #[test]
    fn test_plain_conversion_matches_source_json() {
        let source = json!({ "a": [1, 2.5, null, true], "b": { "c": "d" } });
        let tree = Value::from_json(&source);

        assert_eq!(tree.to_plain().to_json().unwrap(), source);
        assert_eq!(tree.to_json().unwrap(), source);
    }

    #[test]
    fn test_target_mode_from_config() {
        let mode: TargetMode = serde_json::from_str("\"seq\"").unwrap();
        assert_eq!(mode, TargetMode::Seq);
        assert_eq!(serde_json::to_string(&TargetMode::Object).unwrap(), "\"object\"");
    }

    #[test]
    fn test_non_string_map_keys_are_stringified() {
        let tree = Value::from(Map::from_iter([(1, "one"), (2, "two")]));

        assert_eq!(tree.to_json().unwrap(), json!({ "1": "one", "2": "two" }));
    }
}
