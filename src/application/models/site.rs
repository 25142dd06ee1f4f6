//! Block models shipped with the site.

use crate::application::{element::ContentElement, fallback::ValueFallback};

use super::{Link, LinkPicker, MediaRef, ModelError, ModelType, ModelTypeRegistryBuilder};

const DEFAULT_LINK_TEXT: &str = "more";

/// Registers every site model with `builder`.
pub fn register_site_models(builder: ModelTypeRegistryBuilder) -> ModelTypeRegistryBuilder {
    builder
        .register::<HeroBlock>()
        .register::<RichTextRow>()
        .register::<ImageRow>()
        .register::<CodeSnippetRow>()
        .register::<IconLinkRow>()
        .register::<VideoRow>()
}

fn text(
    element: &ContentElement,
    alias: &str,
    fallback: &dyn ValueFallback,
) -> Result<String, ModelError> {
    Ok(element.value::<String>(alias, fallback)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeroBlock {
    pub title: String,
    pub subtitle: Option<String>,
    pub link: Option<Link>,
    pub link_text: String,
    pub background: Option<MediaRef>,
}

impl ModelType for HeroBlock {
    const CONTENT_TYPE_ALIAS: &'static str = "hero";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            title: text(element, "title", fallback)?,
            subtitle: element.value("subtitle", fallback)?,
            link: element
                .value::<LinkPicker>("link", fallback)?
                .and_then(LinkPicker::first),
            link_text: element
                .value("linkText", fallback)?
                .unwrap_or_else(|| DEFAULT_LINK_TEXT.to_string()),
            background: element.value("backgroundImage", fallback)?,
        })
    }
}

/// Editor-authored HTML, rendered as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RichTextRow {
    pub content: String,
}

impl ModelType for RichTextRow {
    const CONTENT_TYPE_ALIAS: &'static str = "richTextRow";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            content: text(element, "content", fallback)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRow {
    pub image: Option<MediaRef>,
    pub caption: Option<String>,
}

impl ModelType for ImageRow {
    const CONTENT_TYPE_ALIAS: &'static str = "imageRow";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            image: element.value("image", fallback)?,
            caption: element.value("caption", fallback)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeSnippetRow {
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: String,
}

impl ModelType for CodeSnippetRow {
    const CONTENT_TYPE_ALIAS: &'static str = "codeSnippetRow";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            title: element.value("title", fallback)?,
            language: element.value("language", fallback)?,
            code: text(element, "code", fallback)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconLinkRow {
    pub links: Vec<Link>,
}

impl ModelType for IconLinkRow {
    const CONTENT_TYPE_ALIAS: &'static str = "iconLinkRow";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            links: element
                .value::<LinkPicker>("links", fallback)?
                .map(LinkPicker::into_links)
                .unwrap_or_default(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRow {
    pub video_url: Option<String>,
    pub caption: Option<String>,
}

impl ModelType for VideoRow {
    const CONTENT_TYPE_ALIAS: &'static str = "videoRow";

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            video_url: element.value("videoUrl", fallback)?,
            caption: element.value("caption", fallback)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::{Value, json};

    use super::*;
    use crate::{
        application::fallback::PublishedValueFallback,
        domain::{blocks::BlockId, locale::VariationContext},
    };

    fn element(alias: &str, properties: Value) -> ContentElement {
        let Value::Object(properties) = properties else {
            panic!("properties must be an object");
        };
        ContentElement::new(
            alias,
            BlockId::new("b1"),
            VariationContext::invariant(),
            BTreeSet::new(),
            properties,
        )
    }

    #[test]
    fn hero_defaults_link_text() {
        let hero = HeroBlock::from_element(
            &element("hero", json!({ "title": "Welcome", "link": "https://x" })),
            &PublishedValueFallback::default(),
        )
        .unwrap();

        assert_eq!(hero.title, "Welcome");
        assert_eq!(hero.link.map(|link| link.url).as_deref(), Some("https://x"));
        assert_eq!(hero.link_text, "more");
        assert!(hero.subtitle.is_none());
    }

    #[test]
    fn icon_links_read_picker_arrays() {
        let row = IconLinkRow::from_element(
            &element(
                "iconLinkRow",
                json!({ "links": [
                    { "name": "GitHub", "url": "https://github.com", "target": "_blank" },
                    { "name": "Home", "url": "/", "id": 1 }
                ] }),
            ),
            &PublishedValueFallback::default(),
        )
        .unwrap();

        assert_eq!(row.links.len(), 2);
        assert_eq!(row.links[1].page_id, Some(1));
    }

    #[test]
    fn half_filled_link_pickers_are_skipped() {
        let hero = HeroBlock::from_element(
            &element("hero", json!({ "title": "Welcome", "link": [{ "name": "x" }] })),
            &PublishedValueFallback::default(),
        )
        .unwrap();
        assert_eq!(hero.title, "Welcome");
        assert!(hero.link.is_none());

        let row = IconLinkRow::from_element(
            &element(
                "iconLinkRow",
                json!({ "links": [{ "name": "Draft" }, { "name": "Home", "url": "/" }] }),
            ),
            &PublishedValueFallback::default(),
        )
        .unwrap();
        assert_eq!(row.links.len(), 1);
        assert_eq!(row.links[0].url, "/");
    }

    #[test]
    fn malformed_property_fails_binding() {
        let err = CodeSnippetRow::from_element(
            &element("codeSnippetRow", json!({ "code": { "nested": true } })),
            &PublishedValueFallback::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidProperty { ref alias, .. } if alias == "code"));
    }
}
