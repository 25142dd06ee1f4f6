use axum::{
    Json,
    body::Bytes,
    extract::{
        OriginalUri, RawQuery, State,
        rejection::{BytesRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    application::{error::HttpError, preview::PreviewRequest},
    domain::{
        blocks::BlockData,
        visibility::{VisibilitySettings, block_opacity},
    },
};

use super::HttpState;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct PreviewQuery {
    pub page_id: i64,
    pub culture: String,
}

impl PreviewQuery {
    /// Lenient parse: unknown keys are ignored, a missing or non-numeric page id is 0.
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "pageId" => query.page_id = value.trim().parse().unwrap_or(0),
                "culture" => query.culture = value.trim().to_string(),
                _ => {}
            }
        }
        query
    }
}

pub(super) async fn preview_markup(
    State(state): State<HttpState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw_query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let query = PreviewQuery::parse(raw_query.as_deref());

    let block = match body {
        Ok(body) => match serde_json::from_slice::<BlockData>(&body) {
            Ok(block) => Some(block),
            Err(err) => {
                warn!(
                    target = "blockpreview::http::preview",
                    page_id = query.page_id,
                    error = %err,
                    "Preview body is not decodable block data"
                );
                None
            }
        },
        Err(rejection) => {
            warn!(
                target = "blockpreview::http::preview",
                page_id = query.page_id,
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "Preview body could not be read"
            );
            None
        }
    };

    let request = PreviewRequest {
        page_id: query.page_id,
        culture: query.culture,
        request_uri: uri.to_string(),
        block,
    };

    let outcome = state.preview.preview(request).await;
    Json(outcome.into_body()).into_response()
}

#[derive(Debug, Serialize)]
pub(super) struct OpacityResponse {
    pub opacity: f32,
}

pub(super) async fn block_visibility(
    payload: Result<Json<VisibilitySettings>, JsonRejection>,
) -> Result<Json<OpacityResponse>, HttpError> {
    let Json(settings) = payload.map_err(|rejection| {
        HttpError::from_error(
            "infra::http::preview::block_visibility",
            rejection.status(),
            "Invalid visibility settings",
            &rejection,
        )
    })?;

    Ok(Json(OpacityResponse {
        opacity: block_opacity(&settings, OffsetDateTime::now_utc()),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BlockPreviewVariables {
    pub preview_api: String,
    pub debounce_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ServerVariables {
    pub block_preview: BlockPreviewVariables,
}

pub(super) async fn server_variables(State(state): State<HttpState>) -> Json<ServerVariables> {
    Json(ServerVariables {
        block_preview: BlockPreviewVariables {
            preview_api: state.preview_path.to_string(),
            debounce_ms: state.debounce_ms,
        },
    })
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parsing_is_lenient() {
        assert_eq!(PreviewQuery::parse(None), PreviewQuery::default());
        assert_eq!(
            PreviewQuery::parse(Some("pageId=12&culture=da-DK&cache=1")),
            PreviewQuery {
                page_id: 12,
                culture: "da-DK".to_string()
            }
        );
        assert_eq!(PreviewQuery::parse(Some("pageId=abc")).page_id, 0);
        assert_eq!(PreviewQuery::parse(Some("pageId=-4")).page_id, -4);
        assert_eq!(
            PreviewQuery::parse(Some("culture=en%2DUS&pageId=")).culture,
            "en-US"
        );
    }
}
