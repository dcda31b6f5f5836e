//! Response envelope negotiation.
//!
//! Some endpoints answer with the bare entity, others wrap it as
//! `{ "material": { ... } }`. Which one a deployment uses is configuration,
//! not something the client hard-codes.

use super::{decode, ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How single entities and collections are wrapped in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEnvelope {
    /// Accept both wrapped and bare shapes
    #[default]
    Auto,
    /// The entity (or array) is the whole body
    Bare,
    /// The entity sits under a resource-named key
    Wrapped,
}

impl ResponseEnvelope {
    /// Extract a single entity stored under `key` (e.g. `material`).
    pub fn unwrap_entity<T: DeserializeOwned>(&self, value: Value, key: &str) -> ApiResult<T> {
        let inner = match self {
            ResponseEnvelope::Bare => value,
            ResponseEnvelope::Wrapped => take_key(value, key)?
                .ok_or_else(|| ApiError::Decode(format!("response is missing '{}'", key)))?,
            ResponseEnvelope::Auto => match value {
                Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
                    map.remove(key).unwrap_or(Value::Null)
                }
                other => other,
            },
        };
        decode(inner, key)
    }

    /// Extract a collection stored under `key` (e.g. `materials`).
    ///
    /// A missing or null collection is treated as empty.
    pub fn unwrap_collection<T: DeserializeOwned>(
        &self,
        value: Value,
        key: &str,
    ) -> ApiResult<Vec<T>> {
        let items = match (self, value) {
            (_, Value::Null) => return Ok(Vec::new()),
            (ResponseEnvelope::Bare | ResponseEnvelope::Auto, Value::Array(items)) => {
                Value::Array(items)
            }
            (ResponseEnvelope::Wrapped | ResponseEnvelope::Auto, Value::Object(map)) => {
                match take_key(Value::Object(map), key)? {
                    Some(Value::Null) | None => return Ok(Vec::new()),
                    Some(items) => items,
                }
            }
            (envelope, other) => {
                return Err(ApiError::Decode(format!(
                    "unexpected {} response shape for '{}': {}",
                    envelope.label(),
                    key,
                    kind_of(&other)
                )))
            }
        };
        decode(items, key)
    }

    fn label(&self) -> &'static str {
        match self {
            ResponseEnvelope::Auto => "auto",
            ResponseEnvelope::Bare => "bare",
            ResponseEnvelope::Wrapped => "wrapped",
        }
    }
}

fn take_key(value: Value, key: &str) -> ApiResult<Option<Value>> {
    match value {
        Value::Object(mut map) => Ok(map.remove(key)),
        other => Err(ApiError::Decode(format!(
            "expected an object with '{}', got {}",
            key,
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comicmaker_types::Material;
    use serde_json::json;

    #[test]
    fn test_auto_accepts_wrapped_and_bare_entities() {
        let wrapped = json!({"material": {"id": 1, "name": "Hero"}});
        let bare = json!({"id": 1, "name": "Hero"});

        let a: Material = ResponseEnvelope::Auto.unwrap_entity(wrapped, "material").unwrap();
        let b: Material = ResponseEnvelope::Auto.unwrap_entity(bare, "material").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrapped_requires_key() {
        let bare = json!({"id": 1, "name": "Hero"});
        let result: ApiResult<Material> = ResponseEnvelope::Wrapped.unwrap_entity(bare, "material");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_absent_collection_is_empty() {
        let items: Vec<Material> = ResponseEnvelope::Auto
            .unwrap_collection(json!({}), "materials")
            .unwrap();
        assert!(items.is_empty());

        let items: Vec<Material> = ResponseEnvelope::Wrapped
            .unwrap_collection(json!({"materials": null}), "materials")
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_bare_collection_rejects_object() {
        let result: ApiResult<Vec<Material>> =
            ResponseEnvelope::Bare.unwrap_collection(json!({"materials": []}), "materials");
        assert!(result.is_err());
    }
}
