use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("site file `{path}` is invalid: {message}")]
    SiteFile { path: String, message: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("preview server request failed: {0}")]
    Client(String),
}

impl InfraError {
    pub fn site_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SiteFile {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::Client(message.into())
    }
}
