//! Result rows returned by executed queries

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One message or record from a search job
///
/// Only `map` matters for completion. A row whose `map` is missing, null or
/// not an object deserializes fine and simply contributes no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(
        default,
        deserialize_with = "object_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub map: Option<Map<String, Value>>,
}

fn object_or_none<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

impl ResultRow {
    /// Build a row from string key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { map: Some(map) }
    }

    /// Field names carried by this row
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.iter().flat_map(|map| map.keys().map(String::as_str))
    }

    /// Display text for a field value
    ///
    /// Strings are returned as-is; other JSON values use their JSON rendering.
    /// Null values have no display text.
    pub fn value_text(&self, key: &str) -> Option<String> {
        match self.map.as_ref()?.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
