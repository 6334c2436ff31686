use std::collections::HashMap;

use url::Url;

use crate::casing::to_camel_case;
use crate::error::{DecodeError, DecodeErrorKind};

/// The value passed to a data source's `setContext`.
///
/// `resource_locator` is parsed eagerly so a capability can read
/// scheme/authority/path without re-parsing; the original string is kept
/// alongside for round-tripping and logging.
#[derive(Debug, Clone)]
pub struct DataSourceContext {
    pub resource_locator: Url,
    pub system_configuration: Option<HashMap<String, String>>,
    pub source_configuration: Option<HashMap<String, String>>,
    pub request_configuration: Option<HashMap<String, String>>,
}

impl DataSourceContext {
    /// Decodes the positional `setContextAsync` parameter object.
    ///
    /// Accepts the correctly spelled `requestConfiguration` key. The Python
    /// original checks the misspelled `requestonfiguration`, which makes
    /// `request_configuration` permanently `None` in practice — treated here
    /// as a bug, not behavior to reproduce.
    pub fn decode(raw: &serde_json::Value) -> Result<Self, DecodeError> {
        let object = raw.as_object().ok_or_else(|| {
            DecodeError::type_mismatch("params[0]", "object", json_type_name(raw))
        })?;

        let resource_locator_key = to_camel_case("resource_locator");
        let locator_text = object
            .get(&resource_locator_key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DecodeError::new(
                    format!("params[0].{resource_locator_key}"),
                    DecodeErrorKind::UnsupportedShape(format!("missing {resource_locator_key}")),
                )
            })?;

        let resource_locator = Url::parse(locator_text).map_err(|e| {
            DecodeError::new(
                format!("params[0].{resource_locator_key}"),
                DecodeErrorKind::UnsupportedShape(e.to_string()),
            )
        })?;

        Ok(Self {
            resource_locator,
            system_configuration: decode_string_map(object, &to_camel_case("system_configuration"))?,
            source_configuration: decode_string_map(object, &to_camel_case("source_configuration"))?,
            request_configuration: decode_string_map(object, &to_camel_case("request_configuration"))?,
        })
    }
}

fn decode_string_map(
    object: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<HashMap<String, String>>, DecodeError> {
    match object.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => {
            let mut out = HashMap::with_capacity(map.len());
            for (k, v) in map {
                let s = v.as_str().ok_or_else(|| {
                    DecodeError::type_mismatch(
                        &format!("params[0].{key}.{k}"),
                        "string",
                        json_type_name(v),
                    )
                })?;
                out.insert(k.clone(), s.to_owned());
            }
            Ok(Some(out))
        }
        Some(other) => Err(DecodeError::type_mismatch(
            &format!("params[0].{key}"),
            "object",
            json_type_name(other),
        )),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_resource_locator_and_configuration_maps() {
        let raw = serde_json::json!({
            "resourceLocator": "file:///tmp/testdata",
            "sourceConfiguration": {"foo": "bar"},
        });
        let context = DataSourceContext::decode(&raw).unwrap();
        assert_eq!(context.resource_locator.scheme(), "file");
        assert_eq!(context.resource_locator.path(), "/tmp/testdata");
        assert_eq!(
            context.source_configuration.unwrap().get("foo").map(String::as_str),
            Some("bar")
        );
        assert!(context.system_configuration.is_none());
        assert!(context.request_configuration.is_none());
    }

    #[test]
    fn decodes_correctly_spelled_request_configuration() {
        let raw = serde_json::json!({
            "resourceLocator": "file:///tmp/testdata",
            "requestConfiguration": {"a": "1"},
        });
        let context = DataSourceContext::decode(&raw).unwrap();
        assert_eq!(
            context.request_configuration.unwrap().get("a").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn rejects_missing_resource_locator() {
        let raw = serde_json::json!({});
        assert!(DataSourceContext::decode(&raw).is_err());
    }
}
