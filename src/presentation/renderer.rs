use std::collections::HashMap;

use crate::application::{
    context::RenderContext,
    models::{BlockViewModel, ModelType},
    template::{TemplateError, TemplateNaming, TemplateOutcome, TemplateRenderer},
};

use super::views::{
    BlockTemplate, CodeSnippetTemplate, HeroTemplate, IconLinkTemplate, ImageTemplate,
    RichTextTemplate, VideoTemplate,
};

type RenderFn = fn(&str, &BlockViewModel, &RenderContext) -> Result<String, TemplateError>;

/// Compiled askama block templates, looked up by template name.
pub struct AskamaTemplateRenderer {
    naming: TemplateNaming,
    templates: HashMap<String, RenderFn>,
}

impl AskamaTemplateRenderer {
    pub fn new(naming: TemplateNaming) -> Self {
        Self {
            naming,
            templates: HashMap::new(),
        }
    }

    /// Renderer with a template for every shipped block model.
    pub fn site(naming: TemplateNaming) -> Self {
        Self::new(naming)
            .register::<HeroTemplate>()
            .register::<RichTextTemplate>()
            .register::<ImageTemplate>()
            .register::<CodeSnippetTemplate>()
            .register::<IconLinkTemplate>()
            .register::<VideoTemplate>()
    }

    pub fn register<V: BlockTemplate>(mut self) -> Self {
        let name = self
            .naming
            .template_name(<V::Model as ModelType>::CONTENT_TYPE_ALIAS);
        self.templates.insert(name, render_block::<V>);
        self
    }

    pub fn naming(&self) -> &TemplateNaming {
        &self.naming
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

fn render_block<V: BlockTemplate>(
    name: &str,
    view: &BlockViewModel,
    context: &RenderContext,
) -> Result<String, TemplateError> {
    let model = view
        .content_as::<V::Model>()
        .ok_or_else(|| TemplateError::ModelMismatch {
            template: name.to_string(),
            expected: crate::application::models::short_type_name::<V::Model>(),
            actual: view.content.type_name(),
        })?;

    V::from_model(model, view, context)
        .render()
        .map_err(|err| TemplateError::Render {
            template: name.to_string(),
            source: Box::new(err),
        })
}

impl TemplateRenderer for AskamaTemplateRenderer {
    fn render(
        &self,
        name: &str,
        view: &BlockViewModel,
        context: &RenderContext,
    ) -> Result<TemplateOutcome, TemplateError> {
        match self.templates.get(name) {
            Some(render) => render(name, view, context).map(TemplateOutcome::Found),
            None => Ok(TemplateOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        application::{
            element::{ElementConverter, JsonElementConverter},
            fallback::PublishedValueFallback,
            models::{HeroBlock, ImageRow},
        },
        domain::{blocks::BlockData, pages::PageRecord},
    };

    fn context() -> RenderContext {
        RenderContext::new(PageRecord::new(4, "Docs"), "/")
    }

    fn view<T: ModelType>(data: serde_json::Value) -> BlockViewModel {
        let block: BlockData = serde_json::from_value(data).unwrap();
        let element = JsonElementConverter.convert(&block, &context()).unwrap();
        let model = T::from_element(&element, &PublishedValueFallback::default()).unwrap();
        BlockViewModel::new(block.id, Box::new(model))
    }

    #[test]
    fn renders_hero_markup() {
        let renderer = AskamaTemplateRenderer::site(TemplateNaming::default());
        let outcome = renderer
            .render(
                "blocks/components/hero.html",
                &view::<HeroBlock>(json!({ "alias": "hero", "title": "Welcome", "link": "https://x" })),
                &context(),
            )
            .unwrap();

        assert_eq!(
            outcome.into_markup().trim(),
            r#"<h1>Welcome</h1><a href="https://x">more</a>"#
        );
    }

    #[test]
    fn unknown_template_is_not_found() {
        let renderer = AskamaTemplateRenderer::site(TemplateNaming::default());
        let outcome = renderer
            .render(
                "blocks/components/quote.html",
                &view::<HeroBlock>(json!({ "alias": "quote" })),
                &context(),
            )
            .unwrap();
        assert_eq!(outcome, TemplateOutcome::NotFound);
    }

    #[test]
    fn mismatched_model_is_an_error() {
        let renderer = AskamaTemplateRenderer::site(TemplateNaming::default());
        let err = renderer
            .render(
                "blocks/components/hero.html",
                &view::<ImageRow>(json!({ "alias": "imageRow" })),
                &context(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::ModelMismatch { expected: "HeroBlock", actual: "ImageRow", .. }
        ));
    }

    #[test]
    fn custom_naming_changes_lookup_keys() {
        let renderer = AskamaTemplateRenderer::site(TemplateNaming::new("partials", "htm"));
        assert!(renderer.contains("partials/iconLinkRow.htm"));
        assert!(!renderer.contains("blocks/components/iconLinkRow.html"));
    }
}
