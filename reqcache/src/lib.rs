#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// The request orchestrator facade and its builder.
///
/// [`Api`](api::Api) applies fetch-policy semantics per call: cache
/// consultation, in-flight deduplication, transport dispatch, response
/// classification, write-through, and error broadcasting.
pub mod api;

/// In-memory response cache with per-key update notification.
///
/// Whole response bodies keyed by request identity; no TTL, no eviction.
/// Every write fans out synchronously to the key's subscribers.
pub mod cache;

/// Response classification against the success-code contract.
pub mod classify;

/// In-flight request registry.
///
/// Shares one pending network call across concurrent identical requests
/// and guards cleanup with identity tokens so a late settle can never
/// evict a newer in-flight entry for the same key.
pub mod in_flight;

/// Listener subscriptions for cache updates and the error channel.
pub mod notify;

pub use api::{Api, ApiBuilder, RequestOptions, ResponseTransform};
pub use cache::ResponseCache;
pub use classify::classify;
pub use in_flight::{InFlightRegistry, SharedResponse};
pub use notify::Subscription;

pub use reqcache_core::{
    Body, BodyKind, CacheMissError, Error, FetchPolicy, RequestDescriptor, RequestKey, StatusError,
    Transport, TransportError, TransportRequest, TransportResponse,
};
