//! Strongly-typed rendering models for block content types.
//!
//! Each model declares the content-type alias it renders and a binding
//! constructor from a [`ContentElement`]. The [`ModelTypeRegistry`] maps
//! aliases carried by editor data to these constructors at runtime.

mod registry;
mod site;
mod values;

use std::{any::Any, fmt};

use thiserror::Error;

use crate::{
    application::{element::ContentElement, fallback::ValueFallback},
    domain::blocks::BlockId,
};

pub use registry::{
    ModelFactory, ModelTypeEntry, ModelTypeRegistry, ModelTypeRegistryBuilder, RegistryError,
    model_registry,
};
pub use site::{
    CodeSnippetRow, HeroBlock, IconLinkRow, ImageRow, RichTextRow, VideoRow, register_site_models,
};
pub use values::{Link, LinkPicker, MediaRef};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("property `{alias}` has an unexpected shape: {message}")]
    InvalidProperty { alias: String, message: String },
}

/// Binding contract implemented by every rendering model type.
pub trait ModelType: fmt::Debug + Send + Sync + Sized + 'static {
    const CONTENT_TYPE_ALIAS: &'static str;

    fn from_element(
        element: &ContentElement,
        fallback: &dyn ValueFallback,
    ) -> Result<Self, ModelError>;
}

/// Object-safe face of a constructed model instance.
pub trait BlockModel: fmt::Debug + Send + Sync {
    fn content_type_alias(&self) -> &'static str;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl<T: ModelType> BlockModel for T {
    fn content_type_alias(&self) -> &'static str {
        T::CONTENT_TYPE_ALIAS
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// The generic per-block view model handed to templates.
#[derive(Debug)]
pub struct BlockViewModel {
    pub id: BlockId,
    pub content: Box<dyn BlockModel>,
    /// Settings models are not built by the preview pipeline.
    pub settings: Option<Box<dyn BlockModel>>,
}

impl BlockViewModel {
    pub fn new(id: BlockId, content: Box<dyn BlockModel>) -> Self {
        Self {
            id,
            content,
            settings: None,
        }
    }

    pub fn content_as<T: ModelType>(&self) -> Option<&T> {
        self.content.as_any().downcast_ref::<T>()
    }
}
