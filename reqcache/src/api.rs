//! The request orchestrator facade.
//!
//! [`Api`] owns the response cache, the in-flight registry, the process-wide
//! default headers, and the error channel. One explicitly constructed
//! instance replaces any ambient singleton; it is cheap to clone and every
//! clone shares the same state.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tracing::{debug, warn};

use reqcache_core::{
    Body, CacheMissError, Error, FetchPolicy, RequestDescriptor, RequestKey, Transport,
    TransportRequest, TransportResponse,
};

use crate::cache::ResponseCache;
use crate::classify::classify;
use crate::in_flight::{InFlightRegistry, SharedResponse};
use crate::notify::{ListenerRegistry, Subscription};

/// Hook applied to every response body before classification.
pub type ResponseTransform = Arc<dyn Fn(Body) -> Body + Send + Sync>;

/// Per-call options: fetch policy and deduplication override.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Cache read/write behavior for this call.
    pub fetch_policy: FetchPolicy,
    /// Overrides deduplication. Defaults to `true` for read-like methods
    /// (`GET`, `HEAD`, `OPTIONS`) and `false` otherwise.
    pub deduplicate: Option<bool>,
}

impl RequestOptions {
    /// Options with the given fetch policy and default deduplication.
    pub fn policy(fetch_policy: FetchPolicy) -> Self {
        RequestOptions {
            fetch_policy,
            deduplicate: None,
        }
    }

    /// Overrides the deduplication default.
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = Some(deduplicate);
        self
    }
}

struct ApiInner {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    in_flight: InFlightRegistry,
    default_headers: Mutex<HeaderMap>,
    errors: ListenerRegistry<(), Error>,
    transform: Option<ResponseTransform>,
    base_url: Option<String>,
}

/// The request orchestrator.
///
/// Applies fetch-policy semantics for each call: consults the
/// [`ResponseCache`], joins or registers in-flight network calls, invokes
/// the [`Transport`], classifies the result, writes successes back, and
/// broadcasts failures on the error channel.
///
/// `Api` is a cheap handle (`Arc` inner); clone it freely into tasks.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    transport: Arc<dyn Transport>,
    base_url: Option<String>,
    default_headers: HeaderMap,
    transform: Option<ResponseTransform>,
}

impl ApiBuilder {
    /// Prefix joined onto descriptor URLs that start with `/`.
    ///
    /// Absolute URLs pass through untouched.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Seeds a process-wide default header. Per-request headers win on
    /// conflict.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Installs a hook applied to every response body before
    /// classification. Status errors therefore carry the transformed body.
    pub fn response_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Body) -> Body + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> Api {
        Api {
            inner: Arc::new(ApiInner {
                transport: self.transport,
                cache: ResponseCache::new(),
                in_flight: InFlightRegistry::new(),
                default_headers: Mutex::new(self.default_headers),
                errors: ListenerRegistry::new(),
                transform: self.transform,
                base_url: self.base_url,
            }),
        }
    }
}

impl Api {
    /// Starts building an orchestrator over the given transport.
    pub fn builder<T>(transport: T) -> ApiBuilder
    where
        T: Transport + 'static,
    {
        ApiBuilder {
            transport: Arc::new(transport),
            base_url: None,
            default_headers: HeaderMap::new(),
            transform: None,
        }
    }

    /// Orchestrator over the given transport with default construction
    /// parameters.
    pub fn new<T>(transport: T) -> Api
    where
        T: Transport + 'static,
    {
        Api::builder(transport).build()
    }

    /// Performs one logical request under the given options.
    ///
    /// See [`FetchPolicy`] for the cache semantics of each policy. Network
    /// failures resolve the returned future *and* are broadcast on the
    /// error channel; a background `CacheAndFetch` refresh failure is only
    /// observable on the error channel, never through the already-resolved
    /// caller future.
    pub async fn request(
        &self,
        descriptor: RequestDescriptor,
        options: RequestOptions,
    ) -> Result<Body, Error> {
        let key = RequestKey::from_descriptor(&descriptor);
        let policy = options.fetch_policy;
        let deduplicate = options
            .deduplicate
            .unwrap_or_else(|| is_read_like(&descriptor.method));

        if policy.reads_cache() {
            if let Some(cached) = self.inner.cache.get(&key) {
                debug!(key = %key, policy = ?policy, "cache hit");
                if policy == FetchPolicy::CacheAndFetch {
                    let refresh = self.network(descriptor, key, policy, deduplicate);
                    tokio::spawn(async move {
                        // Outcome already handled inside the shared future:
                        // write-through on success, error channel on failure.
                        let _ = refresh.await;
                    });
                }
                return Ok(cached);
            }
            if policy == FetchPolicy::CacheOnly {
                debug!(key = %key, "cache miss under cache-only policy");
                return Err(CacheMissError {
                    method: descriptor.method,
                    url: descriptor.url,
                }
                .into());
            }
            debug!(key = %key, policy = ?policy, "cache miss");
        }

        self.network(descriptor, key, policy, deduplicate).await
    }

    /// Returns `true` if a network call for this descriptor is in flight.
    pub fn request_in_progress(&self, descriptor: &RequestDescriptor) -> bool {
        self.inner
            .in_flight
            .in_progress(&RequestKey::from_descriptor(descriptor))
    }

    /// Synchronously reads the cached response for this descriptor.
    pub fn read_cached(&self, descriptor: &RequestDescriptor) -> Option<Body> {
        self.inner.cache.get(&RequestKey::from_descriptor(descriptor))
    }

    /// Writes a response body for this descriptor, notifying subscribers
    /// exactly like a network write-through.
    pub fn write_cached(&self, descriptor: &RequestDescriptor, body: Body) {
        self.inner
            .cache
            .insert(&RequestKey::from_descriptor(descriptor), body);
    }

    /// Removes the cached response for this descriptor, if any.
    pub fn remove_cached(&self, descriptor: &RequestDescriptor) -> Option<Body> {
        self.inner.cache.remove(&RequestKey::from_descriptor(descriptor))
    }

    /// Registers a listener invoked on every cache write for this
    /// descriptor's key.
    pub fn subscribe<F>(&self, descriptor: &RequestDescriptor, listener: F) -> Subscription
    where
        F: Fn(&Body) + Send + Sync + 'static,
    {
        self.inner
            .cache
            .subscribe(RequestKey::from_descriptor(descriptor), listener)
    }

    /// Sets a process-wide default header for subsequent requests.
    pub fn set_default_header(&self, name: HeaderName, value: HeaderValue) {
        self.inner
            .default_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// Registers a listener for every network-path failure, foreground or
    /// background. Centralized handling (auth-expiry detection and the
    /// like) hangs off this channel.
    pub fn subscribe_errors<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.inner.errors.subscribe((), listener)
    }

    /// Direct access to the response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Dispatches the network path for `descriptor`, joining an existing
    /// in-flight call when `deduplicate` allows it.
    ///
    /// Everything up to the first poll of the returned future is
    /// synchronous: key-based dispatch decisions cannot interleave.
    fn network(
        &self,
        descriptor: RequestDescriptor,
        key: RequestKey,
        policy: FetchPolicy,
        deduplicate: bool,
    ) -> SharedResponse {
        let inner = self.inner.clone();
        let fut_key = key.clone();
        self.inner.in_flight.acquire(&key, deduplicate, move |token| {
            let key = fut_key;
            async move {
                let result = inner.perform(descriptor).await;
                match &result {
                    Ok(body) if policy.writes_cache() => {
                        inner.cache.insert(&key, body.clone());
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(key = %key, error = %error, "network path failed");
                        inner.errors.notify(&(), error);
                    }
                }
                // Identity-guarded: a newer owner of this key is left alone.
                inner.in_flight.complete(&key, token);
                result
            }
            .boxed()
            .shared()
        })
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("cache", &self.inner.cache)
            .field("in_flight", &self.inner.in_flight)
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl ApiInner {
    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url.to_owned(),
        }
    }

    /// One network attempt: merge headers, call the transport, apply the
    /// response transform, classify.
    async fn perform(&self, descriptor: RequestDescriptor) -> Result<Body, Error> {
        let RequestDescriptor {
            url,
            method,
            headers,
            body,
            response_kind,
            success_codes,
            ..
        } = descriptor;
        let url = self.resolve_url(&url);

        let mut merged = self
            .default_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (name, value) in headers.iter() {
            merged.insert(name.clone(), value.clone());
        }
        if matches!(body, Some(Body::Json(_))) && !merged.contains_key(CONTENT_TYPE) {
            merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        debug!(method = %method, url = %url, "dispatching transport call");
        let request = TransportRequest {
            method: method.clone(),
            url: url.clone(),
            headers: merged,
            body,
            response_kind,
        };
        let response = self.transport.send(request).await.map_err(Error::from)?;

        let response = match &self.transform {
            Some(transform) => {
                let TransportResponse { status, body, kind } = response;
                TransportResponse {
                    status,
                    body: transform(body),
                    kind,
                }
            }
            None => response,
        };
        classify(&method, &url, response, success_codes.as_deref())
    }
}

fn is_read_like(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}
