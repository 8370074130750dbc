//! Error taxonomy raised to callers.
//!
//! Three distinct failure classes exist, and nothing in the engine retries
//! any of them - retry policy belongs to callers:
//!
//! - [`CacheMissError`] - a `CacheOnly` request found no cache entry;
//! - [`StatusError`] - the network call completed but the status failed the
//!   success-code contract;
//! - [`TransportError`] - the network call itself failed (connectivity,
//!   payload decoding).
//!
//! Every variant is `Clone`: deduplicated callers share a single settled
//! result, so errors must be distributable to all of them. Transport error
//! sources are held behind `Arc` for exactly this reason.

use std::sync::Arc;

use http::{Method, StatusCode};
use thiserror::Error;

use crate::body::{Body, BodyKind};

/// Any failure surfaced by a `request` call.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Cache-only semantics were demanded and no entry existed.
    #[error(transparent)]
    CacheMiss(#[from] CacheMissError),
    /// The call completed with a status outside the success set.
    #[error(transparent)]
    Status(#[from] StatusError),
    /// The transport failed before producing a classified response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A `CacheOnly` request found nothing in the cache.
///
/// Never retried automatically and never broadcast on the error channel:
/// the request never reached the network path.
#[derive(Debug, Clone, Error)]
#[error("no cached response for {method} {url}")]
pub struct CacheMissError {
    /// Method of the request that missed.
    pub method: Method,
    /// URL of the request that missed.
    pub url: String,
}

/// The network call completed but failed the success-code contract.
///
/// Carries enough context for caller-side discrimination; the response body
/// is preserved exactly as the transport (and any response transform hook)
/// produced it, never re-parsed.
#[derive(Debug, Clone, Error)]
#[error("{method} {url} responded with unexpected status {status}")]
pub struct StatusError {
    /// Method of the failing request.
    pub method: Method,
    /// URL of the failing request.
    pub url: String,
    /// The response status.
    pub status: StatusCode,
    /// The response payload, as resolved by the transport.
    pub body: Body,
    /// The resolved payload kind, when one was determined.
    pub kind: Option<BodyKind>,
}

/// A failure below the status/body level.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network interaction failed (DNS, connect, TLS, mid-stream).
    #[error("connection failed: {0}")]
    Connection(Arc<dyn std::error::Error + Send + Sync>),
    /// The payload could not be decoded into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a connection-level failure.
    pub fn connection<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TransportError::Connection(Arc::new(source))
    }

    /// Wraps a body-decoding failure.
    pub fn decode<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TransportError::Decode(Arc::new(source))
    }
}
