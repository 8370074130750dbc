//! Transport implementation over a reqwest client.

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use tracing::debug;

use reqcache_core::{
    Body, BodyKind, Transport, TransportError, TransportRequest, TransportResponse,
};

/// [`Transport`] backed by a [`reqwest::Client`].
///
/// Performs exactly one attempt per [`send`](Transport::send) call; retry,
/// timeout, and redirect behavior is whatever the wrapped client was
/// configured with. The response body is resolved once, either to the
/// request's pinned `response_kind` or to the kind inferred from the
/// response `content-type` ([`BodyKind::from_content_type`]); responses
/// with no recognizable kind come back as [`Body::Empty`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport over a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport over a caller-configured client (timeouts, proxies,
    /// redirect policy).
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
            response_kind,
        } = request;

        let mut builder = self.client.request(method, &url).headers(headers);
        builder = match body {
            Some(Body::Json(value)) => {
                builder.body(serde_json::to_vec(&value).map_err(TransportError::decode)?)
            }
            Some(Body::Text(text)) => builder.body(text),
            Some(Body::Blob(bytes)) => builder.body(bytes),
            Some(Body::Empty) | None => builder,
        };

        let response = builder.send().await.map_err(TransportError::connection)?;
        let status = response.status();
        let kind = response_kind.or_else(|| {
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .and_then(BodyKind::from_content_type)
        });
        debug!(url = %url, status = %status, kind = ?kind, "transport response");

        let body = match kind {
            Some(BodyKind::Json) => {
                let bytes = response.bytes().await.map_err(TransportError::connection)?;
                if bytes.is_empty() {
                    Body::Empty
                } else {
                    Body::Json(serde_json::from_slice(&bytes).map_err(TransportError::decode)?)
                }
            }
            Some(BodyKind::Text) => {
                Body::Text(response.text().await.map_err(TransportError::connection)?)
            }
            Some(BodyKind::Blob) => {
                Body::Blob(response.bytes().await.map_err(TransportError::connection)?)
            }
            None => Body::Empty,
        };

        Ok(TransportResponse { status, body, kind })
    }
}
