//! In-memory content store loaded from a TOML site file.
//!
//! ```toml
//! [[pages]]
//! id = 1
//! name = "Home"
//! published = true
//! cultures = ["en-US", { culture = "da-DK", name = "Forside" }]
//! domains = [{ host = "example.dk", culture = "da-DK" }]
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::{
    application::repos::{ContentRepo, RepoError},
    domain::{
        error::DomainError,
        locale::Locale,
        pages::{DomainBinding, PageCulture, PageRecord},
    },
};

use super::error::InfraError;

#[derive(Deserialize)]
struct SiteFile {
    #[serde(default)]
    pages: Vec<PageRow>,
}

#[derive(Deserialize)]
struct PageRow {
    id: i64,
    name: String,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    cultures: Vec<CultureRow>,
    #[serde(default)]
    domains: Vec<DomainBinding>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CultureRow {
    Code(String),
    Named {
        culture: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl TryFrom<PageRow> for PageRecord {
    type Error = DomainError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        let mut cultures = BTreeMap::new();
        for culture in row.cultures {
            let (code, name) = match culture {
                CultureRow::Code(code) => (code, None),
                CultureRow::Named { culture, name } => (culture, name),
            };
            let locale = Locale::parse(&code)?;
            cultures.insert(
                locale.key(),
                PageCulture {
                    culture: locale.to_string(),
                    name,
                },
            );
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            published: row.published,
            cultures,
            domains: row.domains,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SiteContentStore {
    pages: HashMap<i64, PageRecord>,
}

impl SiteContentStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: impl IntoIterator<Item = PageRecord>) -> Result<Self, DomainError> {
        let mut store = HashMap::new();
        for page in pages {
            validate(&page)?;
            if store.contains_key(&page.id) {
                return Err(DomainError::DuplicatePage { id: page.id });
            }
            store.insert(page.id, page);
        }
        Ok(Self { pages: store })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, InfraError> {
        let file: SiteFile = toml::from_str(source)
            .map_err(|err| InfraError::site_file("<inline>", err.to_string()))?;
        let pages = file
            .pages
            .into_iter()
            .map(PageRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_pages(pages)?)
    }

    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let source = tokio::fs::read_to_string(path).await?;
        let store = Self::from_toml_str(&source).map_err(|err| match err {
            InfraError::SiteFile { message, .. } => {
                InfraError::site_file(path.display().to_string(), message)
            }
            other => other,
        })?;

        info!(
            target = "blockpreview::infra::content",
            path = %path.display(),
            pages = store.len(),
            "Loaded site content"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn validate(page: &PageRecord) -> Result<(), DomainError> {
    if page.id <= 0 {
        return Err(DomainError::invalid_page(page.id, "page ids must be positive"));
    }
    if page.name.trim().is_empty() {
        return Err(DomainError::invalid_page(page.id, "page name is empty"));
    }
    for binding in &page.domains {
        if page.culture(&binding.culture).is_none() {
            return Err(DomainError::invalid_page(
                page.id,
                format!(
                    "domain `{}` is bound to culture `{}` which the page does not define",
                    binding.host, binding.culture
                ),
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl ContentRepo for SiteContentStore {
    async fn find_published(&self, id: i64) -> Result<Option<PageRecord>, RepoError> {
        Ok(self.pages.get(&id).filter(|page| page.published).cloned())
    }

    /// Every page has a draft copy, published or not.
    async fn find_draft(&self, id: i64) -> Result<Option<PageRecord>, RepoError> {
        Ok(self.pages.get(&id).cloned())
    }
}
