use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::info;

use crate::application::{element::ContentElement, fallback::ValueFallback};

use super::{BlockModel, ModelError, ModelType, register_site_models, short_type_name};

/// Binding constructor stored per alias.
pub type ModelFactory =
    fn(&ContentElement, &dyn ValueFallback) -> Result<Box<dyn BlockModel>, ModelError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("content type alias `{alias}` is claimed by both `{first}` and `{second}`")]
    DuplicateAlias {
        alias: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("model type `{type_name}` declares an empty content type alias")]
    EmptyAlias { type_name: &'static str },
}

#[derive(Clone, Copy)]
pub struct ModelTypeEntry {
    pub alias: &'static str,
    pub type_name: &'static str,
    factory: ModelFactory,
}

impl ModelTypeEntry {
    pub fn construct(
        &self,
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Box<dyn BlockModel>, ModelError> {
        (self.factory)(element, fallback)
    }
}

impl std::fmt::Debug for ModelTypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTypeEntry")
            .field("alias", &self.alias)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn construct<T: ModelType>(
    element: &ContentElement,
    fallback: &dyn ValueFallback,
) -> Result<Box<dyn BlockModel>, ModelError> {
    let model = T::from_element(element, fallback)?;
    Ok(Box::new(model))
}

/// Immutable alias → model type lookup, built once and shared read-only.
#[derive(Debug, Default)]
pub struct ModelTypeRegistry {
    entries: HashMap<&'static str, ModelTypeEntry>,
}

impl ModelTypeRegistry {
    pub fn builder() -> ModelTypeRegistryBuilder {
        ModelTypeRegistryBuilder::default()
    }

    /// Exact, case-sensitive alias lookup.
    pub fn resolve(&self, alias: &str) -> Option<&ModelTypeEntry> {
        self.entries.get(alias)
    }

    pub fn aliases(&self) -> Vec<&'static str> {
        let mut aliases: Vec<_> = self.entries.keys().copied().collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
pub struct ModelTypeRegistryBuilder {
    entries: Vec<ModelTypeEntry>,
}

impl ModelTypeRegistryBuilder {
    pub fn register<T: ModelType>(mut self) -> Self {
        self.entries.push(ModelTypeEntry {
            alias: T::CONTENT_TYPE_ALIAS,
            type_name: short_type_name::<T>(),
            factory: construct::<T>,
        });
        self
    }

    /// Fails on the first alias that is empty or claimed twice.
    pub fn build(self) -> Result<ModelTypeRegistry, RegistryError> {
        let mut entries = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            if entry.alias.trim().is_empty() {
                return Err(RegistryError::EmptyAlias {
                    type_name: entry.type_name,
                });
            }
            match entries.entry(entry.alias) {
                Entry::Occupied(existing) => {
                    let existing: &ModelTypeEntry = existing.get();
                    return Err(RegistryError::DuplicateAlias {
                        alias: entry.alias,
                        first: existing.type_name,
                        second: entry.type_name,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }
        Ok(ModelTypeRegistry { entries })
    }
}

static MODEL_REGISTRY: OnceCell<Arc<ModelTypeRegistry>> = OnceCell::new();

/// Access the process-wide registry of site models, built on first use.
pub fn model_registry() -> Result<Arc<ModelTypeRegistry>, RegistryError> {
    MODEL_REGISTRY
        .get_or_try_init(|| {
            let registry = register_site_models(ModelTypeRegistry::builder()).build()?;
            info!(
                target = "blockpreview::models",
                aliases = ?registry.aliases(),
                "Registered block model types"
            );
            Ok(Arc::new(registry))
        })
        .map(Arc::clone)
}
