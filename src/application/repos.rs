//! Repository traits describing the host's content store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pages::PageRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Read access to published and draft (preview) copies of pages.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn find_published(&self, id: i64) -> Result<Option<PageRecord>, RepoError>;

    async fn find_draft(&self, id: i64) -> Result<Option<PageRecord>, RepoError>;
}
