//! Preview orchestration: context → model → template → sanitised markup.
//!
//! Every failure is contained here and mapped to one of the fixed messages the
//! editor understands, so callers never see an error.

use std::{sync::Arc, time::Duration};

use metrics::{counter, histogram};
use tokio::{
    task::spawn_blocking,
    time::{Instant, timeout},
};
use tracing::{debug, error};

use crate::{
    application::{
        builder::BlockModelBuilder,
        context::ContextResolver,
        error::{PreviewError, error_chain},
        sanitize::sanitize_markup,
        template::{TemplateNaming, TemplateRenderer},
    },
    domain::blocks::BlockData,
};

pub const NOT_SAVED_MESSAGE: &str =
    "The page is not saved yet, so we can't create a preview. Save the page first.";
pub const FAILURE_MESSAGE: &str = "Something went wrong rendering a preview.";

pub const METRIC_PREVIEW_TOTAL: &str = "blockpreview_preview_total";
pub const METRIC_PREVIEW_MS: &str = "blockpreview_preview_ms";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Default)]
pub struct PreviewRequest {
    pub page_id: i64,
    pub culture: String,
    pub request_uri: String,
    /// `None` when the submitted body could not be decoded.
    pub block: Option<BlockData>,
}

impl PreviewRequest {
    pub fn new(page_id: i64, culture: impl Into<String>, block: BlockData) -> Self {
        Self {
            page_id,
            culture: culture.into(),
            request_uri: String::new(),
            block: Some(block),
        }
    }

    pub fn with_request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = uri.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewOutcome {
    Markup(String),
    NotSaved,
    Failed,
}

impl PreviewOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewOutcome::Markup(_) => "rendered",
            PreviewOutcome::NotSaved => "not_saved",
            PreviewOutcome::Failed => "failed",
        }
    }

    /// Text returned to the editor.
    pub fn into_body(self) -> String {
        match self {
            PreviewOutcome::Markup(markup) => markup,
            PreviewOutcome::NotSaved => NOT_SAVED_MESSAGE.to_string(),
            PreviewOutcome::Failed => FAILURE_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PreviewService {
    resolver: ContextResolver,
    builder: BlockModelBuilder,
    templates: Arc<dyn TemplateRenderer>,
    naming: TemplateNaming,
    timeout: Duration,
}

impl PreviewService {
    pub fn new(
        resolver: ContextResolver,
        builder: BlockModelBuilder,
        templates: Arc<dyn TemplateRenderer>,
        naming: TemplateNaming,
    ) -> Self {
        Self {
            resolver,
            builder,
            templates,
            naming,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn preview(&self, request: PreviewRequest) -> PreviewOutcome {
        let started_at = Instant::now();

        let result = match timeout(self.timeout, self.render(&request)).await {
            Ok(result) => result,
            Err(_) => Err(PreviewError::TimedOut(self.timeout)),
        };

        let outcome = match result {
            Ok(markup) => PreviewOutcome::Markup(markup),
            Err(PreviewError::NotReady) => {
                debug!(
                    target = "blockpreview::application::preview",
                    page_id = request.page_id,
                    "Preview requested for an unsaved page"
                );
                PreviewOutcome::NotSaved
            }
            Err(err) => {
                let (block_id, alias) = match request.block.as_ref() {
                    Some(block) => (block.id.as_str(), block.content_type_alias.as_str()),
                    None => ("", ""),
                };
                error!(
                    target = "blockpreview::application::preview",
                    block_id,
                    alias,
                    page_id = request.page_id,
                    culture = %request.culture,
                    kind = err.kind(),
                    error = ?error_chain(&err),
                    "Failed to render block preview"
                );
                PreviewOutcome::Failed
            }
        };

        counter!(METRIC_PREVIEW_TOTAL, "outcome" => outcome.label()).increment(1);
        histogram!(METRIC_PREVIEW_MS, "outcome" => outcome.label())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        outcome
    }

    async fn render(&self, request: &PreviewRequest) -> Result<String, PreviewError> {
        let context = self
            .resolver
            .resolve(request.page_id, &request.culture, &request.request_uri)
            .await?;

        let block = request
            .block
            .clone()
            .ok_or(PreviewError::MissingBlockData)?;

        // Model binding, templating and rewriting never yield; run them off the
        // async workers so the timeout can still fire.
        let builder = self.builder.clone();
        let templates = Arc::clone(&self.templates);
        let naming = self.naming.clone();
        spawn_blocking(move || -> Result<String, PreviewError> {
            let view = builder.build(&block, &context)?;
            let name = naming.template_name(view.content.content_type_alias());
            let markup = templates.render(&name, &view, &context)?.into_markup();
            Ok(sanitize_markup(&markup)?)
        })
        .await?
    }
}
