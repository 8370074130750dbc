//! Fetch-policy semantics, classification, and header handling through the
//! public orchestrator surface.

mod common;

use common::{StubTransport, json_response, leak};
use http::{HeaderName, HeaderValue, Method};
use reqcache::{
    Api, Body, Error, FetchPolicy, RequestDescriptor, RequestOptions, TransportError,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn fetch_first_resolves_and_populates_cache() {
    let transport = leak(StubTransport::always(json_response(
        200,
        json!({"test": "data"}),
    )));
    let api = Api::new(transport);
    let descriptor = RequestDescriptor::new("/endpoint");

    let body = api
        .request(
            descriptor.clone(),
            RequestOptions::policy(FetchPolicy::FetchFirst),
        )
        .await
        .unwrap();
    assert_eq!(body, Body::Json(json!({"test": "data"})));

    // A subsequent cache-only call resolves from the cache without a new
    // transport call.
    let cached = api
        .request(descriptor, RequestOptions::policy(FetchPolicy::CacheOnly))
        .await
        .unwrap();
    assert_eq!(cached, Body::Json(json!({"test": "data"})));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn cache_only_with_empty_cache_rejects_without_transport_call() {
    let transport = leak(StubTransport::always(json_response(200, json!({}))));
    let api = Api::new(transport);

    let err = api
        .request(
            RequestDescriptor::new("/missing"),
            RequestOptions::policy(FetchPolicy::CacheOnly),
        )
        .await
        .unwrap_err();
    match err {
        Error::CacheMiss(miss) => {
            assert_eq!(miss.method, Method::GET);
            assert_eq!(miss.url, "/missing");
        }
        other => panic!("expected cache miss, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn cache_first_fetches_only_on_miss() {
    let transport = leak(StubTransport::always(json_response(200, json!(1))));
    let api = Api::new(transport);
    let descriptor = RequestDescriptor::new("/counter");
    let options = RequestOptions::policy(FetchPolicy::CacheFirst);

    api.request(descriptor.clone(), options).await.unwrap();
    api.request(descriptor.clone(), options).await.unwrap();
    api.request(descriptor, options).await.unwrap();
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn no_cache_policy_never_writes_back() {
    let transport = leak(StubTransport::always(json_response(200, json!(1))));
    let api = Api::new(transport);
    let descriptor = RequestDescriptor::new("/volatile");

    api.request(
        descriptor.clone(),
        RequestOptions::policy(FetchPolicy::NoCache),
    )
    .await
    .unwrap();
    assert!(api.read_cached(&descriptor).is_none());
}

#[tokio::test]
async fn success_code_override_inverts_the_contract() {
    let transport = leak(StubTransport::sequence(vec![
        json_response(400, json!({"error": "expected"})),
        json_response(200, json!({"ok": true})),
    ]));
    let api = Api::new(transport);
    let descriptor = RequestDescriptor::new("/login").success_codes(vec![400, 401]);
    let options = RequestOptions::policy(FetchPolicy::NoCache);

    // 400 is a success under the override.
    let body = api.request(descriptor.clone(), options).await.unwrap();
    assert_eq!(body, Body::Json(json!({"error": "expected"})));

    // A 200 with the same override fails classification.
    let err = api.request(descriptor, options).await.unwrap_err();
    match err {
        Error::Status(status) => assert_eq!(status.status.as_u16(), 200),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn default_headers_are_merged_and_per_request_wins() {
    let transport = leak(StubTransport::always(json_response(200, json!({}))));
    let api = Api::new(transport);
    api.set_default_header(
        HeaderName::from_static("x-auth"),
        HeaderValue::from_static("t"),
    );

    api.request(
        RequestDescriptor::new("/a"),
        RequestOptions::policy(FetchPolicy::NoCache),
    )
    .await
    .unwrap();
    api.request(
        RequestDescriptor::new("/b").header(
            HeaderName::from_static("x-auth"),
            HeaderValue::from_static("override"),
        ),
        RequestOptions::policy(FetchPolicy::NoCache),
    )
    .await
    .unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].headers.get("x-auth").unwrap(), "t");
    assert_eq!(requests[1].headers.get("x-auth").unwrap(), "override");
}

#[tokio::test]
async fn structured_bodies_get_a_json_content_type() {
    let transport = leak(StubTransport::always(json_response(200, json!({}))));
    let api = Api::new(transport);

    api.request(
        RequestDescriptor::new("/items")
            .method(Method::POST)
            .json(json!({"name": "widget"})),
        RequestOptions::policy(FetchPolicy::NoCache),
    )
    .await
    .unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json",
    );
}

#[tokio::test]
async fn base_url_prefixes_relative_urls_only() {
    let transport = leak(StubTransport::always(json_response(200, json!({}))));
    let api = Api::builder(transport)
        .base_url("https://api.example.com/")
        .build();
    let options = RequestOptions::policy(FetchPolicy::NoCache);

    api.request(RequestDescriptor::new("/users"), options)
        .await
        .unwrap();
    api.request(RequestDescriptor::new("https://other.example.com/x"), options)
        .await
        .unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].url, "https://api.example.com/users");
    assert_eq!(requests[1].url, "https://other.example.com/x");
}

#[tokio::test]
async fn response_transform_runs_before_classification() {
    let transport = leak(StubTransport::always(json_response(
        404,
        json!({"raw": true}),
    )));
    let api = Api::builder(transport)
        .response_transform(|body| match body {
            Body::Json(value) => Body::Json(json!({"wrapped": value})),
            other => other,
        })
        .build();

    let err = api
        .request(
            RequestDescriptor::new("/x"),
            RequestOptions::policy(FetchPolicy::NoCache),
        )
        .await
        .unwrap_err();
    match err {
        Error::Status(status) => {
            assert_eq!(status.body, Body::Json(json!({"wrapped": {"raw": true}})));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn manual_cache_writes_round_trip_and_notify() {
    let transport = leak(StubTransport::always(json_response(200, json!({}))));
    let api = Api::new(transport);
    let descriptor = RequestDescriptor::new("/manual");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let _subscription = {
        let seen = seen.clone();
        api.subscribe(&descriptor, move |body| {
            seen.lock().unwrap().push(body.clone());
        })
    };

    api.write_cached(&descriptor, Body::Text("value".into()));
    assert_eq!(api.read_cached(&descriptor), Some(Body::Text("value".into())));
    assert_eq!(*seen.lock().unwrap(), vec![Body::Text("value".into())]);

    assert_eq!(api.remove_cached(&descriptor), Some(Body::Text("value".into())));
    assert!(api.read_cached(&descriptor).is_none());
}

#[tokio::test]
async fn failures_reach_caller_and_error_channel() {
    let transport = leak(StubTransport::failing(TransportError::connection(
        std::io::Error::other("connection refused"),
    )));
    let api = Api::new(transport);
    let errors = Arc::new(Mutex::new(Vec::new()));

    let _subscription = {
        let errors = errors.clone();
        api.subscribe_errors(move |error| {
            errors.lock().unwrap().push(error.to_string());
        })
    };

    let err = api
        .request(RequestDescriptor::new("/down"), RequestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("connection refused"));

    // Nothing was cached for the failed request.
    assert!(api.read_cached(&RequestDescriptor::new("/down")).is_none());
}
