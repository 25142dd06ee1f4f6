use std::{future::IntoFuture, process, sync::Arc};

use blockpreview::{
    application::{
        builder::BlockModelBuilder,
        context::ContextResolver,
        element::JsonElementConverter,
        error::AppError,
        fallback::PublishedValueFallback,
        models::model_registry,
        preview::{PreviewRequest, PreviewService},
        repos::ContentRepo,
    },
    client::{ClientPreviewRequest, HttpPreviewTransport, PreviewTransport},
    config,
    domain::blocks::BlockData,
    infra::{
        content::SiteContentStore,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::AskamaTemplateRenderer,
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(settings, args).await,
        config::Command::Post(args) => run_post(args).await,
    }
}

async fn build_preview_service(settings: &config::Settings) -> Result<PreviewService, AppError> {
    let registry = model_registry()?;

    let content: Arc<dyn ContentRepo> = match settings.content.site_file.as_deref() {
        Some(path) => Arc::new(SiteContentStore::load(path).await?),
        None => {
            warn!(
                target = "blockpreview::startup",
                "No site file configured; every preview will report a missing page"
            );
            Arc::new(SiteContentStore::empty())
        }
    };

    let builder = BlockModelBuilder::new(
        registry,
        Arc::new(JsonElementConverter),
        Arc::new(PublishedValueFallback::new(settings.preview.fallback.clone())),
    );
    let templates = Arc::new(AskamaTemplateRenderer::site(settings.preview.naming.clone()));

    Ok(PreviewService::new(
        ContextResolver::new(content),
        builder,
        templates,
        settings.preview.naming.clone(),
    )
    .with_timeout(settings.preview.timeout))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let preview = build_preview_service(&settings).await?;

    let state = HttpState {
        preview: Arc::new(preview),
        preview_path: Arc::from(settings.preview.path.as_str()),
        debounce_ms: u64::try_from(settings.client.debounce.as_millis()).unwrap_or(u64::MAX),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "blockpreview::startup",
        addr = %settings.server.addr,
        preview_path = %settings.preview.path,
        "Preview service listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }

    info!(
        target = "blockpreview::startup",
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining in-flight previews"
    );
    shutdown.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target = "blockpreview::startup",
                "Graceful shutdown window elapsed; aborting remaining connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn read_block_file(path: &std::path::Path) -> Result<BlockData, AppError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    serde_json::from_str(&source).map_err(|err| {
        AppError::validation(format!(
            "`{}` is not valid block data: {err}",
            path.display()
        ))
    })
}

async fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let preview = build_preview_service(&settings).await?;
    let block = read_block_file(&args.file).await?;

    let outcome = preview
        .preview(
            PreviewRequest::new(args.page_id, args.culture, block)
                .with_request_uri(format!("file://{}", args.file.display())),
        )
        .await;

    info!(
        target = "blockpreview::render",
        outcome = outcome.label(),
        "Rendered block preview"
    );
    println!("{}", outcome.into_body());
    Ok(())
}

async fn run_post(args: config::PostArgs) -> Result<(), AppError> {
    let block = read_block_file(&args.file).await?;

    let transport = HttpPreviewTransport::discover(&args.server)
        .await
        .map_err(|err| AppError::from(InfraError::client(err.to_string())))?;
    info!(
        target = "blockpreview::post",
        endpoint = %transport.endpoint(),
        "Discovered preview endpoint"
    );

    let body = transport
        .fetch_preview(&ClientPreviewRequest::new(args.page_id, args.culture, block))
        .await
        .map_err(|err| AppError::from(InfraError::client(err.to_string())))?;
    println!("{body}");
    Ok(())
}
