//! Response classification against the success-code contract.

use http::Method;
use reqcache_core::{Body, Error, StatusError, TransportResponse};

/// Turns a transport result into success or a typed error.
///
/// With `success_codes` present, success is exactly membership of the
/// status in that set; otherwise any `2xx` status succeeds. The body is
/// passed through as the transport (and any response transform hook)
/// produced it - classification never re-parses it.
pub fn classify(
    method: &Method,
    url: &str,
    response: TransportResponse,
    success_codes: Option<&[u16]>,
) -> Result<Body, Error> {
    let TransportResponse { status, body, kind } = response;
    let success = match success_codes {
        Some(codes) => codes.contains(&status.as_u16()),
        None => status.is_success(),
    };
    if success {
        Ok(body)
    } else {
        Err(StatusError {
            method: method.clone(),
            url: url.to_owned(),
            status,
            body,
            kind,
        }
        .into())
    }
}
