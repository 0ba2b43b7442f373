//! `$ref` resolution: scope preservation versus `resetUri`, the document
//! cache, `file://` loading (JSON and YAML) and structural failures.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use sks_core::{SchemaError, SksError, ValidatorConfig};
use sks_schema::{SchemaFetcher, SchemaValidator, Validator};
use url::Url;

/// Serves fixed documents and records every fetch.
#[derive(Clone, Default)]
struct MemoryFetcher {
    documents: Arc<HashMap<String, String>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    fn new(documents: &[(&str, Value)]) -> Self {
        Self {
            documents: Arc::new(
                documents
                    .iter()
                    .map(|(uri, doc)| (uri.to_string(), doc.to_string()))
                    .collect(),
            ),
            fetched: Arc::default(),
        }
    }

    fn fetch_count(&self, uri: &str) -> usize {
        self.fetched.lock().iter().filter(|u| u.as_str() == uri).count()
    }
}

impl SchemaFetcher for MemoryFetcher {
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, SchemaError> {
        self.fetched.lock().push(uri.to_string());
        self.documents
            .get(uri.as_str())
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| SchemaError::Fetch {
                uri: uri.to_string(),
                reason: "not found".to_string(),
            })
    }
}

const ROOT: &str = "http://store.test/schemas/root.json";
const OTHER: &str = "http://store.test/schemas/other.json";

/// `other.json` is served from store.test but declares an `id` on
/// example; each host's `sibling.json` demands a different type.
fn store() -> MemoryFetcher {
    MemoryFetcher::new(&[
        (ROOT, json!({"properties": {"x": {"$ref": "other.json"}}})),
        (
            OTHER,
            json!({
                "id": "http://example/other.json",
                "properties": {"v": {"$ref": "sibling.json"}}
            }),
        ),
        ("http://store.test/schemas/sibling.json", json!({"type": "string"})),
        ("http://example/sibling.json", json!({"type": "integer"})),
    ])
}

#[test]
fn test_default_keeps_caller_scope() {
    let fetcher = store();
    let validator = Validator::options()
        .with_fetcher(fetcher.clone())
        .from_schema_uri(ROOT)
        .unwrap();
    let config = ValidatorConfig::default();

    assert!(validator.is_valid(&json!({"x": {"v": "text"}}), config).unwrap());
    assert!(!validator.is_valid(&json!({"x": {"v": 7}}), config).unwrap());
    assert_eq!(fetcher.fetch_count("http://store.test/schemas/sibling.json"), 1);
    assert_eq!(fetcher.fetch_count("http://example/sibling.json"), 0);
}

#[test]
fn test_reset_uri_follows_declared_id() {
    let fetcher = store();
    let validator = Validator::options()
        .reset_uri(true)
        .with_fetcher(fetcher.clone())
        .from_schema_uri(ROOT)
        .unwrap();
    let config = ValidatorConfig::default();

    assert!(validator.is_valid(&json!({"x": {"v": 7}}), config).unwrap());
    assert!(!validator.is_valid(&json!({"x": {"v": "text"}}), config).unwrap());
    assert_eq!(fetcher.fetch_count("http://example/sibling.json"), 1);
    assert_eq!(fetcher.fetch_count("http://store.test/schemas/sibling.json"), 0);
}

#[test]
fn test_each_document_fetched_once() {
    let fetcher = store();
    let validator = Validator::options()
        .with_fetcher(fetcher.clone())
        .from_schema_uri(ROOT)
        .unwrap();
    for _ in 0..3 {
        validator
            .list_errors(&json!({"x": {"v": "a"}}), ValidatorConfig::default())
            .unwrap();
    }
    assert_eq!(fetcher.fetch_count(ROOT), 1);
    assert_eq!(fetcher.fetch_count(OTHER), 1);
    assert_eq!(validator.resolver().cached_documents(), 3);
}

#[test]
fn test_loaded_root_has_id_stripped() {
    let fetcher = MemoryFetcher::new(&[(ROOT, json!({"id": "http://elsewhere/", "type": "object"}))]);
    let validator = Validator::options()
        .with_fetcher(fetcher)
        .from_schema_uri(ROOT)
        .unwrap();
    assert!(validator.schema().get("id").is_none());
}

#[test]
fn test_error_paths_do_not_accumulate_ref_hops() {
    let validator = Validator::options()
        .with_fetcher(store())
        .from_schema_uri(ROOT)
        .unwrap();
    let errors = validator
        .list_errors(&json!({"x": {"v": 7}}), ValidatorConfig::default())
        .unwrap();
    assert_eq!(errors.len(), 1);
    let err = &errors.errors()[0];
    assert_eq!(err.absolute_path().dotted(), "x.v");
    assert_eq!(err.schema_path().dotted(), "properties.x.properties.v.type");
}

#[test]
fn test_fragment_pointer_with_escapes() {
    let schema = json!({
        "definitions": {"a/b": {"type": "string"}, "list": [{"type": "integer"}]},
        "properties": {
            "slash": {"$ref": "#/definitions/a~1b"},
            "indexed": {"$ref": "#/definitions/list/0"}
        }
    });
    let validator = Validator::new(schema).unwrap();
    let config = ValidatorConfig::default();
    assert!(validator.is_valid(&json!({"slash": "s", "indexed": 1}), config).unwrap());
    assert_eq!(
        validator
            .list_errors(&json!({"slash": 1, "indexed": "i"}), config)
            .unwrap()
            .len(),
        2
    );
}

// ---------------------------------------------------------------------------
// Structural failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_fragment_is_structural() {
    let validator = Validator::new(json!({"$ref": "#/definitions/nowhere"})).unwrap();
    let err = validator
        .assert_is_valid(&json!(1), ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        SksError::Schema(SchemaError::UnresolvableFragment { .. })
    ));
}

#[test]
fn test_fetch_failure_propagates() {
    let fetcher = MemoryFetcher::new(&[(ROOT, json!({"$ref": "missing.json"}))]);
    let validator = Validator::options()
        .with_fetcher(fetcher.clone())
        .from_schema_uri(ROOT)
        .unwrap();
    let err = validator
        .list_errors(&json!({}), ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::Fetch { .. }));
    assert_eq!(fetcher.fetch_count("http://store.test/schemas/missing.json"), 1);
}

#[test]
fn test_malformed_document_is_distinct() {
    #[derive(Clone)]
    struct Garbage;
    impl SchemaFetcher for Garbage {
        fn fetch(&self, _uri: &Url) -> Result<Vec<u8>, SchemaError> {
            Ok(b"{not json".to_vec())
        }
    }
    let err = Validator::options()
        .with_fetcher(Garbage)
        .from_schema_uri(ROOT)
        .unwrap_err();
    assert!(matches!(err, SchemaError::MalformedJson { .. }));
}

#[test]
fn test_invalid_uri_rejected() {
    let err = Validator::from_schema_uri("not a uri").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidUri { .. }));
}

#[test]
fn test_unsupported_scheme() {
    let validator = Validator::new(json!({"$ref": "ftp://host/schema.json"})).unwrap();
    let err = validator
        .list_errors(&json!(1), ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnsupportedScheme { .. }));
}

#[test]
fn test_non_string_ref_is_structural() {
    let validator = Validator::new(json!({"$ref": 5})).unwrap();
    let err = validator
        .list_errors(&json!(1), ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidReference { .. }));
}

#[test]
fn test_structural_error_outranks_earlier_violations() {
    let validator = Validator::new(json!({
        "properties": {
            "a": {"type": "string"},
            "b": {"$ref": "#/definitions/missing"}
        }
    }))
    .unwrap();
    let instance = json!({"a": 1, "b": 1});
    let config = ValidatorConfig::default();
    assert!(matches!(
        validator.list_errors(&instance, config),
        Err(SchemaError::UnresolvableFragment { .. })
    ));
    assert!(matches!(
        validator.is_valid(&instance, config),
        Err(SchemaError::UnresolvableFragment { .. })
    ));
}

#[test]
fn test_reference_cycle_is_structural() {
    let validator = Validator::new(json!({
        "definitions": {
            "a": {"$ref": "#/definitions/b"},
            "b": {"$ref": "#/definitions/a"}
        },
        "properties": {"x": {"$ref": "#/definitions/a"}}
    }))
    .unwrap();
    let err = validator
        .assert_is_valid(&json!({"x": 1}), ValidatorConfig::default())
        .unwrap_err();
    let SksError::Schema(SchemaError::InvalidReference { reason, .. }) = err else {
        panic!("expected reference cycle, got {err}");
    };
    assert_eq!(reason, "reference cycle");
}

#[test]
fn test_self_reference_at_root_is_structural() {
    let validator = Validator::new(json!({"$ref": "#"})).unwrap();
    let err = validator
        .list_errors(&json!(1), ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidReference { .. }));
}

#[test]
fn test_recursive_schema_descending_into_instance_is_not_a_cycle() {
    let validator = Validator::new(json!({
        "type": "object",
        "properties": {
            "value": {"type": "integer"},
            "next": {"$ref": "#"}
        }
    }))
    .unwrap();
    let instance = json!({"value": 1, "next": {"value": 2, "next": {"value": "three"}}});
    let errors = validator
        .list_errors(&instance, ValidatorConfig::default())
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].absolute_path().dotted(), "next.next.value");
}

// ---------------------------------------------------------------------------
// file:// documents
// ---------------------------------------------------------------------------

#[test]
fn test_file_schema_with_relative_yaml_ref() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("root.json"),
        json!({
            "properties": {
                "name": {"$ref": "defs.yaml#/definitions/name"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("defs.yaml"),
        "definitions:\n  name:\n    type: string\n    minLength: 2\n",
    )
    .unwrap();

    let validator = Validator::from_schema_path(dir.path().join("root.json")).unwrap();
    let config = ValidatorConfig::default();
    assert!(validator
        .is_valid(&json!({"name": "ok", "tags": ["a"]}), config)
        .unwrap());

    let errors = validator
        .list_errors(&json!({"name": "x", "tags": [1]}), config)
        .unwrap();
    let messages: Vec<&str> = errors.iter().map(|e| e.message()).collect();
    assert_eq!(messages, vec!["\"x\" is too short", "1 is not of type 'string'"]);
}

#[test]
fn test_missing_file_is_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let uri = Url::from_file_path(dir.path().join("absent.json")).unwrap();
    let err = Validator::from_schema_uri(uri.as_str()).unwrap_err();
    assert!(matches!(err, SchemaError::Fetch { .. }));
}

#[test]
fn test_malformed_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::write(&path, "key: [unclosed\n").unwrap();
    let err = Validator::from_schema_path(&path).unwrap_err();
    assert!(matches!(err, SchemaError::MalformedYaml { .. }));
}
