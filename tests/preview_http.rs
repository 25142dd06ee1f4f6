use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use blockpreview::{
    application::{
        builder::BlockModelBuilder,
        context::ContextResolver,
        element::JsonElementConverter,
        fallback::{FallbackPolicy, PublishedValueFallback},
        models::model_registry,
        preview::{FAILURE_MESSAGE, NOT_SAVED_MESSAGE, PreviewService},
        template::TemplateNaming,
    },
    domain::pages::PageRecord,
    infra::{
        content::SiteContentStore,
        http::{HEALTH_PATH, HttpState, SERVER_VARIABLES_PATH, build_router},
    },
    presentation::AskamaTemplateRenderer,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const PREVIEW_PATH: &str = "/api/preview";

fn app() -> Router {
    let content = SiteContentStore::from_pages([
        PageRecord::new(1, "Home").published().with_culture("en-US"),
        PageRecord::new(7, "Draft").with_culture("en-US"),
    ])
    .expect("pages should be valid");

    let builder = BlockModelBuilder::new(
        model_registry().expect("registry should build"),
        Arc::new(JsonElementConverter),
        Arc::new(PublishedValueFallback::new(FallbackPolicy::None)),
    );
    let naming = TemplateNaming::default();
    let preview = PreviewService::new(
        ContextResolver::new(Arc::new(content)),
        builder,
        Arc::new(AskamaTemplateRenderer::site(naming.clone())),
        naming,
    );

    build_router(HttpState {
        preview: Arc::new(preview),
        preview_path: Arc::from(PREVIEW_PATH),
        debounce_ms: 500,
    })
}

async fn post(uri: &str, body: impl Into<Body>, json_content: bool) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if json_content {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let response = app()
        .oneshot(request.body(body.into()).expect("request should build"))
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (status, bytes.to_vec())
}

async fn preview(query: &str, block: Value) -> String {
    let (status, body) = post(
        &format!("{PREVIEW_PATH}?{query}"),
        block.to_string(),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).expect("preview body is a JSON string")
}

#[tokio::test]
async fn hero_preview_renders_with_inert_links() {
    let markup = preview(
        "pageId=1&culture=en-US",
        json!({ "contentTypeAlias": "hero", "udi": "umb://element/b1", "title": "Welcome", "link": "https://x" }),
    )
    .await;
    assert_eq!(markup, r#"<h1>Welcome</h1><a href="javascript:;">more</a>"#);
}

#[tokio::test]
async fn draft_pages_can_be_previewed() {
    let markup = preview(
        "pageId=7",
        json!({ "contentTypeAlias": "hero", "title": "Soon" }),
    )
    .await;
    assert_eq!(markup, "<h1>Soon</h1>");
}

#[tokio::test]
async fn unsaved_page_reports_save_first() {
    let markup = preview("pageId=0&culture=", json!({ "contentTypeAlias": "hero" })).await;
    assert_eq!(markup, NOT_SAVED_MESSAGE);

    let markup = preview("culture=en-US", json!({ "contentTypeAlias": "hero" })).await;
    assert_eq!(markup, NOT_SAVED_MESSAGE);
}

#[tokio::test]
async fn failures_share_one_generic_message() {
    let missing_page = preview("pageId=99", json!({ "contentTypeAlias": "hero" })).await;
    assert_eq!(missing_page, FAILURE_MESSAGE);

    let unknown_type = preview("pageId=1", json!({ "contentTypeAlias": "quote" })).await;
    assert_eq!(unknown_type, FAILURE_MESSAGE);

    let (status, body) = post(&format!("{PREVIEW_PATH}?pageId=1"), "not json", false).await;
    assert_eq!(status, StatusCode::OK);
    let body: String = serde_json::from_slice(&body).expect("preview body is a JSON string");
    assert_eq!(body, FAILURE_MESSAGE);
}

#[tokio::test]
async fn oversized_body_still_answers_with_the_failure_message() {
    let content = "<p>lorem ipsum</p>".repeat(200_000);
    let block = json!({ "contentTypeAlias": "richTextRow", "content": content });
    let (status, body) = post(&format!("{PREVIEW_PATH}?pageId=1"), block.to_string(), true).await;

    assert_eq!(status, StatusCode::OK);
    let body: String = serde_json::from_slice(&body).expect("preview body is a JSON string");
    assert_eq!(body, FAILURE_MESSAGE);
}

#[tokio::test]
async fn half_filled_link_picker_renders_without_anchor() {
    let markup = preview(
        "pageId=1",
        json!({ "contentTypeAlias": "hero", "title": "Welcome", "link": [{ "name": "Read more" }] }),
    )
    .await;
    assert_eq!(markup, "<h1>Welcome</h1>");
}

#[tokio::test]
async fn block_property_named_id_stays_a_property() {
    let markup = preview(
        "pageId=1",
        json!({ "contentTypeAlias": "hero", "udi": "umb://element/b1", "id": "b1", "title": "Welcome" }),
    )
    .await;
    assert_eq!(markup, "<h1>Welcome</h1>");
}

#[tokio::test]
async fn visibility_dims_hidden_blocks() {
    let (status, body) = post(
        &format!("{PREVIEW_PATH}/visibility"),
        json!({ "hideBlock": "1" }).to_string(),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).expect("visibility body is JSON");
    assert_eq!(body, json!({ "opacity": 0.25 }));

    let (status, _) = post(&format!("{PREVIEW_PATH}/visibility"), "{", true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn server_variables_advertise_the_preview_endpoint() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(SERVER_VARIABLES_PATH)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let body: Value = serde_json::from_slice(&bytes).expect("variables are JSON");
    assert_eq!(
        body,
        json!({ "blockPreview": { "previewApi": PREVIEW_PATH, "debounceMs": 500 } })
    );
}

#[tokio::test]
async fn health_answers_no_content() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(HEALTH_PATH)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
