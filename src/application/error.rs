use std::{error::Error as StdError, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        element::ConversionError, models::ModelError, models::RegistryError, repos::RepoError,
        sanitize::SanitizeError, template::TemplateError,
    },
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Flatten an error and its sources into display strings, outermost first.
pub fn error_chain(error: &dyn StdError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    messages
}

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        Self {
            source,
            status,
            messages: error_chain(error),
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Everything that can stop a single block preview. Contained by the orchestrator.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("page is not saved yet")]
    NotReady,
    #[error("page {page_id} exists neither in published nor in draft content")]
    PageNotFound { page_id: i64 },
    #[error("request body did not contain decodable block data")]
    MissingBlockData,
    #[error("no rendering model is registered for content type `{alias}`")]
    UnknownType { alias: String },
    #[error("failed to convert block data")]
    Conversion(#[from] ConversionError),
    #[error("failed to construct block model")]
    Model(#[from] ModelError),
    #[error("failed to render block template")]
    Template(#[from] TemplateError),
    #[error("failed to sanitise rendered markup")]
    Sanitize(#[from] SanitizeError),
    #[error("content repository failure")]
    Repository(#[from] RepoError),
    #[error("render task did not complete")]
    RenderTask(#[from] tokio::task::JoinError),
    #[error("preview rendering exceeded {0:?}")]
    TimedOut(Duration),
}

impl PreviewError {
    pub fn kind(&self) -> &'static str {
        match self {
            PreviewError::NotReady => "not_ready",
            PreviewError::PageNotFound { .. } => "page_not_found",
            PreviewError::MissingBlockData => "missing_block_data",
            PreviewError::UnknownType { .. } => "unknown_type",
            PreviewError::Conversion(_)
            | PreviewError::Model(_)
            | PreviewError::Template(_)
            | PreviewError::Sanitize(_)
            | PreviewError::RenderTask(_) => "render_failure",
            PreviewError::Repository(_) => "repository",
            PreviewError::TimedOut(_) => "timed_out",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
