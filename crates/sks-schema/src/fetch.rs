//! # Document Fetching
//!
//! Turns a URI into a parsed schema document. Retrieval is behind the
//! [`SchemaFetcher`] trait so tests and embedders can serve documents from
//! memory; [`UriFetcher`] is the default and knows `file://` and
//! `http(s)://`.
//!
//! Documents whose path ends in `.yaml` or `.yml` are decoded as YAML and
//! converted to the equivalent JSON tree. Everything else is JSON.

use serde_json::Value;
use sks_core::SchemaError;
use url::Url;

/// Retrieves raw schema bytes for a URI (without fragment).
pub trait SchemaFetcher: Send + Sync {
    /// Fetch the document at `uri`.
    ///
    /// # Errors
    ///
    /// Any transport or filesystem failure. Callers treat it as fatal and
    /// do not retry.
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, SchemaError>;
}

/// Default fetcher: local files and plain HTTP(S).
#[derive(Debug, Default, Clone)]
pub struct UriFetcher {
    client: Option<reqwest::blocking::Client>,
}

impl UriFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn fetch_file(uri: &Url) -> Result<Vec<u8>, SchemaError> {
        let path = uri.to_file_path().map_err(|()| SchemaError::Fetch {
            uri: uri.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        std::fs::read(&path).map_err(|e| SchemaError::Fetch {
            uri: uri.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })
    }

    fn fetch_http(&self, uri: &Url) -> Result<Vec<u8>, SchemaError> {
        let http_err = |e: reqwest::Error| SchemaError::Fetch {
            uri: uri.to_string(),
            reason: e.to_string(),
        };
        let response = match &self.client {
            Some(client) => client.get(uri.clone()).send(),
            None => reqwest::blocking::get(uri.clone()),
        }
        .map_err(http_err)?;
        let response = response.error_for_status().map_err(http_err)?;
        let body = response.bytes().map_err(http_err)?;
        Ok(body.to_vec())
    }
}

impl SchemaFetcher for UriFetcher {
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, SchemaError> {
        match uri.scheme() {
            "file" => Self::fetch_file(uri),
            "http" | "https" => self.fetch_http(uri),
            _ => Err(SchemaError::UnsupportedScheme {
                uri: uri.to_string(),
            }),
        }
    }
}

/// Decode fetched bytes into a JSON tree, choosing YAML or JSON by the
/// URI's path extension.
///
/// # Errors
///
/// [`SchemaError::MalformedYaml`] or [`SchemaError::MalformedJson`].
pub fn decode_document(uri: &Url, bytes: &[u8]) -> Result<Value, SchemaError> {
    let path = uri.path();
    if path.ends_with(".yaml") || path.ends_with(".yml") {
        let yaml: serde_yaml::Value =
            serde_yaml::from_slice(bytes).map_err(|e| SchemaError::MalformedYaml {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        yaml_to_json_value(&yaml).map_err(|reason| SchemaError::MalformedYaml {
            uri: uri.to_string(),
            reason,
        })
    } else {
        serde_json::from_slice(bytes).map_err(|source| SchemaError::MalformedJson {
            uri: uri.to_string(),
            source,
        })
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped in favour of their inner value; scalar map keys are
/// stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
