//! Wire types for the document store's REST API.
//!
//! The store wraps every field in a typed value envelope
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). This module owns
//! the translation between that envelope and plain JSON; domain decoding
//! happens on the plain-JSON side so the envelope never leaks inward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One typed field value in a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FirestoreValue {
    /// UTF-8 string.
    #[serde(rename = "stringValue")]
    String(String),
    /// 64-bit integer, transported as a decimal string.
    #[serde(rename = "integerValue")]
    Integer(String),
    /// IEEE double.
    #[serde(rename = "doubleValue")]
    Double(f64),
    /// Boolean.
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    /// RFC 3339 timestamp.
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    /// Explicit null.
    #[serde(rename = "nullValue")]
    Null(Value),
    /// Nested document.
    #[serde(rename = "mapValue")]
    Map(MapValue),
    /// Ordered list.
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
}

/// Nested map payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapValue {
    /// Nested fields; absent on the wire when empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FirestoreValue>,
}

/// Array payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrayValue {
    /// Elements; absent on the wire when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FirestoreValue>,
}

impl FirestoreValue {
    /// Unwrap the envelope into plain JSON.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::String(s) => Value::String(s),
            Self::Integer(raw) => raw
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::String(raw)),
            Self::Double(d) => Number::from_f64(d).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(b),
            Self::Timestamp(ts) => Value::String(ts),
            Self::Null(_) => Value::Null,
            Self::Map(map) => Value::Object(
                map.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
            Self::Array(array) => {
                Value::Array(array.values.into_iter().map(Self::into_json).collect())
            }
        }
    }

    /// Wrap plain JSON into the envelope.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null(Value::Null),
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => n.as_i64().map_or_else(
                || Self::Double(n.as_f64().unwrap_or(0.0)),
                |i| Self::Integer(i.to_string()),
            ),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(ArrayValue {
                values: items.into_iter().map(Self::from_json).collect(),
            }),
            Value::Object(map) => Self::Map(MapValue {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            }),
        }
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name, `projects/.../documents/{collection}/{id}`.
    #[serde(default)]
    pub name: String,
    /// Field envelope.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl Document {
    /// The id segment of the resource name.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Unwrap the whole document into a plain JSON object.
    #[must_use]
    pub fn into_json_map(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .map(|(k, v)| (k, v.into_json()))
            .collect()
    }

    /// Build the field envelope from a plain JSON object.
    #[must_use]
    pub fn fields_from_json(map: Map<String, Value>) -> BTreeMap<String, FirestoreValue> {
        map.into_iter()
            .map(|(k, v)| (k, FirestoreValue::from_json(v)))
            .collect()
    }
}

/// One entry in a `runQuery` response stream.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryEntry {
    /// Matched document; absent on bookkeeping entries.
    #[serde(default)]
    pub document: Option<Document>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_decodes_the_wire_shape() {
        let wire = json!({
            "name": "projects/p/databases/(default)/documents/donations/abc123",
            "fields": {
                "senderId": { "stringValue": "u1" },
                "amount": { "doubleValue": 50.5 },
                "rewardPoints": { "integerValue": "12" },
                "timestamp": { "timestampValue": "2024-01-01T00:00:00Z" },
                "flags": { "mapValue": { "fields": { "verified": { "booleanValue": true } } } },
                "imageUrls": { "arrayValue": { "values": [ { "stringValue": "https://x/1" } ] } }
            }
        });

        let document: Document = serde_json::from_value(wire).expect("document decodes");
        assert_eq!(document.doc_id(), "abc123");

        let plain = Value::Object(document.into_json_map());
        assert_eq!(plain["senderId"], "u1");
        assert_eq!(plain["amount"], 50.5);
        assert_eq!(plain["rewardPoints"], 12);
        assert_eq!(plain["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(plain["flags"]["verified"], true);
        assert_eq!(plain["imageUrls"][0], "https://x/1");
    }

    #[test]
    fn json_round_trips_through_the_envelope() {
        let original = json!({
            "name": "Pak Abu",
            "points": 5,
            "ratio": 0.5,
            "ok": true,
            "tags": ["a", "b"],
            "nested": { "k": "v" }
        });
        let Value::Object(map) = original.clone() else {
            panic!("fixture is an object")
        };

        let envelope = Document::fields_from_json(map);
        let document = Document {
            name: String::new(),
            fields: envelope,
        };
        assert_eq!(Value::Object(document.into_json_map()), original);
    }

    #[test]
    fn envelope_serialises_with_typed_keys() {
        let value = FirestoreValue::from_json(json!(42));
        assert_eq!(
            serde_json::to_value(&value).expect("serialises"),
            json!({ "integerValue": "42" })
        );
    }
}
