use std::error::Error as StdError;

use thiserror::Error;

use crate::application::{context::RenderContext, models::BlockViewModel};

pub const DEFAULT_PARTIAL_BASE: &str = "blocks/components";
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "html";

/// A missing template is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateOutcome {
    Found(String),
    NotFound,
}

impl TemplateOutcome {
    pub fn into_markup(self) -> String {
        match self {
            TemplateOutcome::Found(markup) => markup,
            TemplateOutcome::NotFound => String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{template}` expects a `{expected}` model but received `{actual}`")]
    ModelMismatch {
        template: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("template `{template}` failed to render")]
    Render {
        template: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Maps a content-type alias to the name of its block template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateNaming {
    partial_base: String,
    extension: String,
}

impl TemplateNaming {
    pub fn new(partial_base: impl Into<String>, extension: impl Into<String>) -> Self {
        let partial_base = partial_base.into();
        let extension = extension.into();
        Self {
            partial_base: partial_base.trim_matches('/').to_string(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn template_name(&self, alias: &str) -> String {
        if self.partial_base.is_empty() {
            format!("{alias}.{}", self.extension)
        } else {
            format!("{}/{alias}.{}", self.partial_base, self.extension)
        }
    }
}

impl Default for TemplateNaming {
    fn default() -> Self {
        Self::new(DEFAULT_PARTIAL_BASE, DEFAULT_TEMPLATE_EXTENSION)
    }
}

pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        name: &str,
        view: &BlockViewModel,
        context: &RenderContext,
    ) -> Result<TemplateOutcome, TemplateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_targets_block_components() {
        assert_eq!(
            TemplateNaming::default().template_name("hero"),
            "blocks/components/hero.html"
        );
    }

    #[test]
    fn naming_tolerates_stray_separators() {
        let naming = TemplateNaming::new("/partials/blocks/", ".cshtml");
        assert_eq!(naming.template_name("quote"), "partials/blocks/quote.cshtml");
        assert_eq!(TemplateNaming::new("", "html").template_name("quote"), "quote.html");
    }

    #[test]
    fn not_found_renders_nothing() {
        assert_eq!(TemplateOutcome::NotFound.into_markup(), "");
    }
}
