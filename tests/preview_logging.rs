use std::{
    io,
    sync::{Arc, Mutex},
};

use blockpreview::{
    application::{
        builder::BlockModelBuilder,
        context::ContextResolver,
        element::JsonElementConverter,
        fallback::PublishedValueFallback,
        models::model_registry,
        preview::{FAILURE_MESSAGE, PreviewRequest, PreviewService},
        template::TemplateNaming,
    },
    domain::blocks::{BlockData, BlockId},
    infra::content::SiteContentStore,
    presentation::AskamaTemplateRenderer,
};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer lock")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn service() -> PreviewService {
    let naming = TemplateNaming::default();
    PreviewService::new(
        ContextResolver::new(Arc::new(SiteContentStore::empty())),
        BlockModelBuilder::new(
            model_registry().expect("registry should build"),
            Arc::new(JsonElementConverter),
            Arc::new(PublishedValueFallback::default()),
        ),
        Arc::new(AskamaTemplateRenderer::site(naming.clone())),
        naming,
    )
}

#[tokio::test]
async fn missing_page_is_logged_with_block_context() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let block = BlockData::new("hero", BlockId::new("umb://element/b7"));
    let outcome = service()
        .preview(PreviewRequest::new(42, "en-US", block))
        .await;
    assert_eq!(outcome.into_body(), FAILURE_MESSAGE);

    let output = logs.contents();
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("Failed to render block preview"), "{output}");
    assert!(output.contains("umb://element/b7"), "{output}");
    assert!(output.contains("page_not_found"), "{output}");
    assert!(output.contains("page_id=42"), "{output}");
}

#[tokio::test]
async fn unsaved_page_is_not_an_error() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    service()
        .preview(PreviewRequest::new(0, "", BlockData::new("hero", BlockId::default())))
        .await;

    let output = logs.contents();
    assert!(!output.contains("ERROR"), "{output}");
    assert!(output.contains("unsaved page"), "{output}");
}
