//! Pages as seen by the preview pipeline: identity, cultures and domain bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Culture variant configured on a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCulture {
    /// Canonical culture code, e.g. `en-US`.
    pub culture: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Hostname assigned to a page (or one of its ancestors) together with its culture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBinding {
    pub host: String,
    pub culture: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub published: bool,
    /// Keyed by lower-cased culture code.
    #[serde(default)]
    pub cultures: BTreeMap<String, PageCulture>,
    #[serde(default)]
    pub domains: Vec<DomainBinding>,
}

impl PageRecord {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            published: false,
            cultures: BTreeMap::new(),
            domains: Vec::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        let culture = culture.into();
        self.cultures.insert(
            culture.to_ascii_lowercase(),
            PageCulture {
                culture,
                name: None,
            },
        );
        self
    }

    pub fn with_domain(mut self, host: impl Into<String>, culture: impl Into<String>) -> Self {
        self.domains.push(DomainBinding {
            host: host.into(),
            culture: culture.into(),
        });
        self
    }

    /// A page without configured cultures belongs to a single-locale site.
    pub fn is_culture_variant(&self) -> bool {
        !self.cultures.is_empty()
    }

    pub fn culture(&self, code: &str) -> Option<&PageCulture> {
        self.cultures.get(&code.trim().to_ascii_lowercase())
    }

    /// Culture assigned through the page's domains; the first binding wins.
    pub fn culture_from_domains(&self) -> Option<&str> {
        self.domains
            .iter()
            .map(|binding| binding.culture.trim())
            .find(|culture| !culture.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culture_lookup_ignores_case() {
        let page = PageRecord::new(1, "Home").with_culture("en-US");
        assert_eq!(
            page.culture("EN-us").map(|c| c.culture.as_str()),
            Some("en-US")
        );
        assert!(page.culture("da-DK").is_none());
    }

    #[test]
    fn domain_culture_skips_blank_bindings() {
        let page = PageRecord::new(1, "Home")
            .with_domain("example.com", " ")
            .with_domain("example.dk", "da-DK");
        assert_eq!(page.culture_from_domains(), Some("da-DK"));
    }

    #[test]
    fn single_locale_page_is_not_variant() {
        assert!(!PageRecord::new(3, "About").is_culture_variant());
    }
}
