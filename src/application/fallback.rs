use serde_json::Value;

use crate::{application::element::ContentElement, domain::locale::Locale};

/// Consulted when a property has no value for the current variation.
pub trait ValueFallback: Send + Sync {
    fn fallback_value(&self, element: &ContentElement, alias: &str) -> Option<Value>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    #[default]
    None,
    /// Read the value stored for another culture.
    Language(Locale),
}

#[derive(Clone, Debug, Default)]
pub struct PublishedValueFallback {
    policy: FallbackPolicy,
}

impl PublishedValueFallback {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }
}

impl ValueFallback for PublishedValueFallback {
    fn fallback_value(&self, element: &ContentElement, alias: &str) -> Option<Value> {
        match &self.policy {
            FallbackPolicy::None => None,
            FallbackPolicy::Language(culture) => {
                if element.variation().culture() == Some(culture) {
                    return None;
                }
                element.variant_entry(alias, culture).cloned()
            }
        }
    }
}
