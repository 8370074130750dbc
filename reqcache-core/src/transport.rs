//! Transport boundary: the collaborator that performs the actual network I/O.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};

use crate::body::{Body, BodyKind};
use crate::error::TransportError;

/// The fully merged request handed to a transport.
///
/// Headers arrive already merged (orchestrator defaults overlaid with
/// per-request headers) and the URL already resolved against any base URL.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Merged headers.
    pub headers: HeaderMap,
    /// Request payload, if any.
    pub body: Option<Body>,
    /// Expected response shape; when `None` the transport infers it from
    /// the response `content-type`.
    pub response_kind: Option<BodyKind>,
}

/// The raw result of one network attempt: status, resolved body, body kind.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response payload, resolved once by the transport.
    pub body: Body,
    /// The kind the payload was resolved to, when one was determined.
    pub kind: Option<BodyKind>,
}

/// A single-attempt, promise-returning network dependency.
///
/// The orchestrator assumes nothing about retries, timeouts, or redirects -
/// one call to [`Transport::send`] is one attempt, and its outcome is taken
/// as-is. Implementers may back this with any async network primitive; see
/// `reqcache-reqwest` for the reqwest-based implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one network call and resolves the response body by content
    /// type (or by the request's pinned `response_kind`).
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
