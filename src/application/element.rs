//! Read-only typed view over raw block data.
//!
//! A property is culture-variant when its raw value is a JSON object whose keys
//! are all cultures configured on the page being previewed, e.g.
//! `{"en-US": "Welcome", "da-DK": "Velkommen"}`. Any other value is invariant.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    application::{context::RenderContext, fallback::ValueFallback, models::ModelError},
    domain::{
        blocks::{BlockData, BlockId},
        locale::{Locale, VariationContext},
    },
};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("block `{block_id}` does not declare a content type alias")]
    MissingContentType { block_id: BlockId },
}

#[derive(Clone, Debug)]
pub struct ContentElement {
    content_type_alias: String,
    key: BlockId,
    variation: VariationContext,
    cultures: BTreeSet<String>,
    properties: Map<String, Value>,
}

impl ContentElement {
    pub fn new(
        content_type_alias: impl Into<String>,
        key: BlockId,
        variation: VariationContext,
        cultures: BTreeSet<String>,
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            content_type_alias: content_type_alias.into(),
            key,
            variation,
            cultures,
            properties,
        }
    }

    pub fn content_type_alias(&self) -> &str {
        &self.content_type_alias
    }

    pub fn key(&self) -> &BlockId {
        &self.key
    }

    pub fn variation(&self) -> &VariationContext {
        &self.variation
    }

    /// Value of `alias` for the element's variation, without consulting any fallback.
    pub fn raw_value(&self, alias: &str) -> Option<&Value> {
        let raw = self.properties.get(alias)?;
        if self.is_variant(raw) {
            let culture = self.variation.culture()?;
            return self.variant_entry(alias, culture);
        }
        has_value(raw).then_some(raw)
    }

    /// Value stored for a specific culture of a variant property.
    pub fn variant_entry(&self, alias: &str, culture: &Locale) -> Option<&Value> {
        let Value::Object(entries) = self.properties.get(alias)? else {
            return None;
        };
        let wanted = culture.key();
        entries
            .iter()
            .find(|(code, _)| code.to_ascii_lowercase() == wanted)
            .map(|(_, value)| value)
            .filter(|value| has_value(value))
    }

    /// Typed property access; falls back through `fallback` when the variation has no value.
    pub fn value<T: DeserializeOwned>(
        &self,
        alias: &str,
        fallback: &dyn ValueFallback,
    ) -> Result<Option<T>, ModelError> {
        let resolved = match self.raw_value(alias) {
            Some(value) => Some(value.clone()),
            None => fallback.fallback_value(self, alias),
        };

        resolved
            .map(|value| {
                serde_json::from_value(value).map_err(|err| ModelError::InvalidProperty {
                    alias: alias.to_string(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    fn is_variant(&self, raw: &Value) -> bool {
        match raw {
            Value::Object(entries) if !entries.is_empty() && !self.cultures.is_empty() => entries
                .keys()
                .all(|code| self.cultures.contains(&code.to_ascii_lowercase())),
            _ => false,
        }
    }
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Turns submitted block data into a [`ContentElement`].
pub trait ElementConverter: Send + Sync {
    fn convert(
        &self,
        block: &BlockData,
        context: &RenderContext,
    ) -> Result<ContentElement, ConversionError>;
}

/// Converter for editor JSON. Never caches: preview data is unsaved and changes on every edit.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonElementConverter;

impl ElementConverter for JsonElementConverter {
    fn convert(
        &self,
        block: &BlockData,
        context: &RenderContext,
    ) -> Result<ContentElement, ConversionError> {
        let alias = block.content_type_alias.trim();
        if alias.is_empty() {
            return Err(ConversionError::MissingContentType {
                block_id: block.id.clone(),
            });
        }

        let cultures = context.page.cultures.keys().cloned().collect();

        Ok(ContentElement::new(
            alias,
            block.id.clone(),
            context.variation.clone(),
            cultures,
            block.values.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fallback::{FallbackPolicy, PublishedValueFallback};
    use serde_json::json;

    fn element(culture: Option<&str>, properties: Value) -> ContentElement {
        let variation = match culture {
            Some(code) => VariationContext::for_culture(Locale::parse(code).unwrap()),
            None => VariationContext::invariant(),
        };
        let Value::Object(properties) = properties else {
            panic!("properties must be an object");
        };
        ContentElement::new(
            "hero",
            BlockId::new("b1"),
            variation,
            BTreeSet::from(["en-us".to_string(), "da-dk".to_string()]),
            properties,
        )
    }

    #[test]
    fn invariant_values_ignore_culture() {
        let el = element(Some("da-DK"), json!({ "title": "Welcome" }));
        let title: Option<String> = el
            .value("title", &PublishedValueFallback::new(FallbackPolicy::None))
            .unwrap();
        assert_eq!(title.as_deref(), Some("Welcome"));
    }

    #[test]
    fn variant_values_follow_the_bound_culture() {
        let el = element(
            Some("da-DK"),
            json!({ "title": { "en-US": "Welcome", "da-DK": "Velkommen" } }),
        );
        let title: Option<String> = el
            .value("title", &PublishedValueFallback::new(FallbackPolicy::None))
            .unwrap();
        assert_eq!(title.as_deref(), Some("Velkommen"));
    }

    #[test]
    fn objects_with_non_culture_keys_are_invariant() {
        let el = element(Some("en-US"), json!({ "link": { "url": "/", "name": "Home" } }));
        assert_eq!(el.raw_value("link"), Some(&json!({ "url": "/", "name": "Home" })));
    }

    #[test]
    fn missing_culture_uses_fallback_language() {
        let el = element(Some("da-DK"), json!({ "title": { "en-US": "Welcome" } }));
        let fallback =
            PublishedValueFallback::new(FallbackPolicy::Language(Locale::parse("en-US").unwrap()));
        let title: Option<String> = el.value("title", &fallback).unwrap();
        assert_eq!(title.as_deref(), Some("Welcome"));

        let none: Option<String> = el
            .value("title", &PublishedValueFallback::new(FallbackPolicy::None))
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let el = element(None, json!({ "title": "   ", "items": [] }));
        assert!(el.raw_value("title").is_none());
        assert!(el.raw_value("items").is_none());
    }

    #[test]
    fn shape_mismatch_is_reported_per_property() {
        let el = element(None, json!({ "count": "many" }));
        let err = el
            .value::<u32>("count", &PublishedValueFallback::new(FallbackPolicy::None))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidProperty { ref alias, .. } if alias == "count"));
    }
}
