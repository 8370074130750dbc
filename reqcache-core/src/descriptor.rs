//! Declarative description of one logical HTTP call.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::body::{Body, BodyKind};

/// A caller-supplied description of one logical HTTP call.
///
/// Descriptors are immutable values: the orchestrator never mutates one, it
/// only reads fields and derives a [`RequestKey`](crate::RequestKey) from
/// them. Construction is builder-style:
///
/// ```
/// use http::Method;
/// use reqcache_core::{BodyKind, RequestDescriptor};
///
/// let descriptor = RequestDescriptor::new("/users/42")
///     .method(Method::GET)
///     .response_kind(BodyKind::Json);
/// assert_eq!(descriptor.method, Method::GET);
/// ```
///
/// `method` defaults to `GET`. The `body` is excluded from the cache key;
/// callers that need per-body cache separation set `extra_key`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Target URL, absolute or relative to the orchestrator's base URL.
    pub url: String,
    /// HTTP method. Defaults to `GET`.
    pub method: Method,
    /// Per-request headers, overlaid on the orchestrator's default headers.
    pub headers: HeaderMap,
    /// Optional request payload. Not part of the cache key.
    pub body: Option<Body>,
    /// Expected response shape. When absent the transport infers it from
    /// the response `content-type`.
    pub response_kind: Option<BodyKind>,
    /// Status codes treated as success. When absent, success is `2xx`.
    pub success_codes: Option<Vec<u16>>,
    /// Extra discriminator mixed into the cache key.
    pub extra_key: Option<String>,
}

impl RequestDescriptor {
    /// Creates a `GET` descriptor for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        RequestDescriptor {
            url: url.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            response_kind: None,
            success_codes: None,
            extra_key: None,
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header. Replaces any previous value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request payload.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON request payload.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    /// Pins the expected response shape.
    pub fn response_kind(mut self, kind: BodyKind) -> Self {
        self.response_kind = Some(kind);
        self
    }

    /// Overrides which status codes count as success.
    pub fn success_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.success_codes = Some(codes.into());
        self
    }

    /// Mixes an extra discriminator into the cache key.
    pub fn extra_key(mut self, extra: impl Into<String>) -> Self {
        self.extra_key = Some(extra.into());
        self
    }
}
