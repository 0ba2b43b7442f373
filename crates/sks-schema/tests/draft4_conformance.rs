//! Differential check against the `jsonschema` crate: with the ban off, the
//! Draft 4 verdict for standard keywords must match the reference
//! implementation.

use proptest::prelude::*;
use serde_json::{json, Value};
use sks_core::ValidatorConfig;
use sks_schema::{SchemaValidator, Validator};

fn schemas() -> Vec<Value> {
    vec![
        json!({
            "type": "object",
            "properties": {"a": {"type": "integer", "minimum": 0}},
            "required": ["a"]
        }),
        json!({"items": {"type": "string", "maxLength": 3}, "uniqueItems": true, "maxItems": 3}),
        json!({"items": [{"type": "integer"}, {"type": "boolean"}], "additionalItems": false}),
        json!({"anyOf": [{"type": "string"}, {"type": "array", "minItems": 1}]}),
        json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}),
        json!({"not": {"enum": [null, true]}}),
        json!({"patternProperties": {"^a": {"type": "integer"}}, "additionalProperties": false}),
        json!({"dependencies": {"a": ["b"], "b": {"minProperties": 2}}}),
        json!({"allOf": [{"type": "object"}, {"maxProperties": 2}]}),
        json!({"maximum": 10, "exclusiveMaximum": true, "multipleOf": 5}),
        json!({
            "definitions": {"tag": {"type": "string", "pattern": "^[a-c]+$"}},
            "type": "array",
            "items": {"$ref": "#/definitions/tag"}
        }),
    ]
}

fn instance_strategy() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-20i64..20).prop_map(Value::from),
        "[a-e]{0,4}".prop_map(Value::String),
    ];
    scalar.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

#[test]
fn test_reference_implementation_accepts_fixtures() {
    for schema in schemas() {
        assert!(
            jsonschema::options()
                .with_draft(jsonschema::Draft::Draft4)
                .build(&schema)
                .is_ok(),
            "fixture rejected: {schema}"
        );
    }
}

proptest! {
    #[test]
    fn prop_verdict_matches_reference(instance in instance_strategy()) {
        for schema in schemas() {
            let reference = jsonschema::options()
                .with_draft(jsonschema::Draft::Draft4)
                .build(&schema)
                .unwrap();
            let ours = Validator::new(schema.clone()).unwrap();
            let verdict = ours.is_valid(&instance, ValidatorConfig::permissive()).unwrap();
            prop_assert_eq!(
                verdict,
                reference.is_valid(&instance),
                "schema {} instance {}",
                schema,
                instance
            );
        }
    }
}
