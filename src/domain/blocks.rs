//! Raw block payloads submitted by the editor.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque, stable identifier of a block within its page (usually a `umb://element/...` udi).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured block data as posted by the editor on every edit.
///
/// Only the content-type alias and the block identifier are interpreted here;
/// every other key is kept verbatim as a raw property value because its shape
/// depends on the content type. The identifier is read from `udi`, then `key`,
/// then `id`, and the alias from `contentTypeAlias`, then `alias`; a lower
/// ranked key that is not used stays a property.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockData {
    #[serde(rename = "contentTypeAlias")]
    pub content_type_alias: String,
    #[serde(rename = "udi")]
    pub id: BlockId,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

const ALIAS_KEYS: [&str; 2] = ["contentTypeAlias", "alias"];
const ID_KEYS: [&str; 3] = ["udi", "key", "id"];

fn take_text(values: &mut Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find(|key| matches!(values.get(**key), Some(Value::String(_))))
        .and_then(|key| values.remove(*key))
        .and_then(|value| match value {
            Value::String(text) => Some(text),
            _ => None,
        })
        .unwrap_or_default()
}

impl From<Map<String, Value>> for BlockData {
    fn from(mut values: Map<String, Value>) -> Self {
        let content_type_alias = take_text(&mut values, &ALIAS_KEYS);
        let id = BlockId::new(take_text(&mut values, &ID_KEYS));
        Self {
            content_type_alias,
            id,
            values,
        }
    }
}

impl<'de> Deserialize<'de> for BlockData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(Self::from)
    }
}

impl BlockData {
    pub fn new(content_type_alias: impl Into<String>, id: BlockId) -> Self {
        Self {
            content_type_alias: content_type_alias.into(),
            id,
            values: Map::new(),
        }
    }

    pub fn with_value(mut self, alias: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(alias.into(), value.into());
        self
    }

    pub fn raw_value(&self, alias: &str) -> Option<&Value> {
        self.values.get(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_editor_payload_with_flattened_properties() {
        let data: BlockData = serde_json::from_value(json!({
            "contentTypeAlias": "hero",
            "udi": "umb://element/5b1c",
            "title": "Welcome",
            "link": "https://x"
        }))
        .expect("valid block data");

        assert_eq!(data.content_type_alias, "hero");
        assert_eq!(data.id.as_str(), "umb://element/5b1c");
        assert_eq!(data.raw_value("title"), Some(&json!("Welcome")));
        assert_eq!(data.values.len(), 2);
    }

    #[test]
    fn accepts_short_field_aliases() {
        let data: BlockData = serde_json::from_value(json!({
            "alias": "hero",
            "id": "b1",
            "title": "Welcome"
        }))
        .expect("valid block data");

        assert_eq!(data.content_type_alias, "hero");
        assert_eq!(data.id, BlockId::new("b1"));
    }

    #[test]
    fn unused_identifier_keys_stay_properties() {
        let data: BlockData = serde_json::from_value(json!({
            "contentTypeAlias": "hero",
            "alias": "shadow",
            "udi": "umb://element/5b1c",
            "id": "b1",
            "key": 7
        }))
        .expect("valid block data");

        assert_eq!(data.content_type_alias, "hero");
        assert_eq!(data.id.as_str(), "umb://element/5b1c");
        assert_eq!(data.raw_value("alias"), Some(&json!("shadow")));
        assert_eq!(data.raw_value("id"), Some(&json!("b1")));
        assert_eq!(data.raw_value("key"), Some(&json!(7)));
    }

    #[test]
    fn missing_alias_defaults_to_empty() {
        let data: BlockData =
            serde_json::from_value(json!({ "title": "orphan" })).expect("valid block data");
        assert!(data.content_type_alias.is_empty());
        assert!(data.id.is_empty());
    }
}
