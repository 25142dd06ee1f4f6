use thiserror::Error;

use super::locale::LocaleError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("page {id} is defined more than once")]
    DuplicatePage { id: i64 },
    #[error("page {id} is invalid: {message}")]
    InvalidPage { id: i64, message: String },
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

impl DomainError {
    pub fn invalid_page(id: i64, message: impl Into<String>) -> Self {
        Self::InvalidPage {
            id,
            message: message.into(),
        }
    }
}
