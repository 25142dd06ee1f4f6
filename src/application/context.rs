//! Per-request rendering context: the page being previewed and its culture binding.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    application::{error::PreviewError, repos::ContentRepo},
    domain::{
        locale::{Locale, VariationContext},
        pages::PageRecord,
    },
};

/// The "current request" a template sees while rendering a preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedRequest {
    pub page_id: i64,
    pub uri: String,
}

/// Everything downstream steps need to know about the page; passed explicitly, never stored globally.
#[derive(Clone, Debug)]
pub struct RenderContext {
    pub page: PageRecord,
    pub locale: Option<Locale>,
    pub variation: VariationContext,
    pub request: PublishedRequest,
}

impl RenderContext {
    pub fn new(page: PageRecord, request_uri: impl Into<String>) -> Self {
        let request = PublishedRequest {
            page_id: page.id,
            uri: request_uri.into(),
        };
        Self {
            page,
            locale: None,
            variation: VariationContext::invariant(),
            request,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.variation = VariationContext::for_culture(locale.clone());
        self.locale = Some(locale);
        self
    }

    pub fn is_current_page(&self, page_id: Option<i64>) -> bool {
        page_id == Some(self.request.page_id)
    }

    pub fn culture_label(&self) -> &str {
        self.locale.as_ref().map(Locale::as_str).unwrap_or("")
    }
}

#[derive(Clone)]
pub struct ContextResolver {
    content: Arc<dyn ContentRepo>,
}

impl ContextResolver {
    pub fn new(content: Arc<dyn ContentRepo>) -> Self {
        Self { content }
    }

    pub async fn resolve(
        &self,
        page_id: i64,
        locale_hint: &str,
        request_uri: &str,
    ) -> Result<RenderContext, PreviewError> {
        if page_id <= 0 {
            return Err(PreviewError::NotReady);
        }

        let page = match self.content.find_published(page_id).await? {
            Some(page) => page,
            None => self
                .content
                .find_draft(page_id)
                .await?
                .ok_or(PreviewError::PageNotFound { page_id })?,
        };

        let context = RenderContext::new(page, request_uri);
        match bind_locale(&context.page, locale_hint) {
            Some(locale) => Ok(context.with_locale(locale)),
            None => Ok(context),
        }
    }
}

fn bind_locale(page: &PageRecord, hint: &str) -> Option<Locale> {
    if !page.is_culture_variant() {
        return None;
    }

    let hint = hint.trim();
    let requested = if hint.is_empty() {
        page.culture_from_domains()?
    } else {
        hint
    };

    let Some(culture) = page.culture(requested) else {
        debug!(
            target = "blockpreview::application::context",
            page_id = page.id,
            culture = requested,
            "Requested culture is not configured on the page; rendering invariant"
        );
        return None;
    };

    match Locale::parse(&culture.culture) {
        Ok(locale) => Some(locale),
        Err(err) => {
            warn!(
                target = "blockpreview::application::context",
                page_id = page.id,
                culture = %culture.culture,
                error = %err,
                "Skipping culture binding for unparsable culture code"
            );
            None
        }
    }
}
