use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{domain::blocks::BlockData, infra::http::SERVER_VARIABLES_PATH};

/// One preview call as the editor issues it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientPreviewRequest {
    pub page_id: i64,
    pub culture: String,
    pub block: BlockData,
}

impl ClientPreviewRequest {
    pub fn new(page_id: i64, culture: impl Into<String>, block: BlockData) -> Self {
        Self {
            page_id,
            culture: culture.into(),
            block,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid preview server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("preview request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Sends block data to the preview endpoint and returns the body to display.
#[async_trait]
pub trait PreviewTransport: Send + Sync {
    async fn fetch_preview(&self, request: &ClientPreviewRequest) -> Result<String, TransportError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerVariables {
    block_preview: BlockPreviewVariables,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockPreviewVariables {
    preview_api: String,
    debounce_ms: u64,
}

#[derive(Clone, Debug)]
pub struct HttpPreviewTransport {
    client: reqwest::Client,
    endpoint: Url,
    debounce: Option<Duration>,
}

impl HttpPreviewTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            debounce: None,
        }
    }

    /// Looks up the preview endpoint from the server variables published by `base`.
    pub async fn discover(base: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base)?;
        let client = reqwest::Client::new();

        let variables: ServerVariables = client
            .get(base.join(SERVER_VARIABLES_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Self {
            endpoint: base.join(&variables.block_preview.preview_api)?,
            debounce: Some(Duration::from_millis(variables.block_preview.debounce_ms)),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Debounce window advertised by the server, when discovered.
    pub fn debounce(&self) -> Option<Duration> {
        self.debounce
    }

    fn request_url(&self, request: &ClientPreviewRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("pageId", &request.page_id.to_string())
            .append_pair("culture", &request.culture);
        url
    }
}

#[async_trait]
impl PreviewTransport for HttpPreviewTransport {
    async fn fetch_preview(&self, request: &ClientPreviewRequest) -> Result<String, TransportError> {
        let body = self
            .client
            .post(self.request_url(request))
            .json(&request.block)
            .send()
            .await?
            .error_for_status()?
            .json::<String>()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_carries_page_and_culture() {
        let transport =
            HttpPreviewTransport::new(Url::parse("http://localhost:3000/api/preview").unwrap());
        let request = ClientPreviewRequest::new(12, "da-DK", BlockData::default());
        assert_eq!(
            transport.request_url(&request).as_str(),
            "http://localhost:3000/api/preview?pageId=12&culture=da-DK"
        );
    }

    #[test]
    fn server_variables_shape() {
        let variables: ServerVariables = serde_json::from_str(
            r#"{"blockPreview":{"previewApi":"/api/preview","debounceMs":250}}"#,
        )
        .unwrap();
        assert_eq!(variables.block_preview.preview_api, "/api/preview");
        assert_eq!(variables.block_preview.debounce_ms, 250);
    }
}
