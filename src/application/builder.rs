use std::sync::Arc;

use tracing::debug;

use crate::{
    application::{
        context::RenderContext,
        element::ElementConverter,
        error::PreviewError,
        fallback::ValueFallback,
        models::{BlockViewModel, ModelTypeRegistry},
    },
    domain::blocks::BlockData,
};

/// Turns raw block data into the view model a block template renders.
#[derive(Clone)]
pub struct BlockModelBuilder {
    registry: Arc<ModelTypeRegistry>,
    converter: Arc<dyn ElementConverter>,
    fallback: Arc<dyn ValueFallback>,
}

impl BlockModelBuilder {
    pub fn new(
        registry: Arc<ModelTypeRegistry>,
        converter: Arc<dyn ElementConverter>,
        fallback: Arc<dyn ValueFallback>,
    ) -> Self {
        Self {
            registry,
            converter,
            fallback,
        }
    }

    pub fn registry(&self) -> &ModelTypeRegistry {
        &self.registry
    }

    pub fn build(
        &self,
        block: &BlockData,
        context: &RenderContext,
    ) -> Result<BlockViewModel, PreviewError> {
        let element = self.converter.convert(block, context)?;
        let alias = element.content_type_alias();

        let entry = self
            .registry
            .resolve(alias)
            .ok_or_else(|| PreviewError::UnknownType {
                alias: alias.to_string(),
            })?;

        let content = entry.construct(&element, self.fallback.as_ref())?;
        debug!(
            target = "blockpreview::application::builder",
            block_id = %block.id,
            alias,
            model = entry.type_name,
            "Built block model"
        );

        Ok(BlockViewModel::new(block.id.clone(), content))
    }
}
