//! Response and request payloads as a tagged union.
//!
//! HTTP bodies reach the orchestrator in exactly one of three shapes:
//!
//! - [`Body::Json`] - structured data, kept as [`serde_json::Value`]
//! - [`Body::Text`] - plain text
//! - [`Body::Blob`] - opaque binary data, kept as [`Bytes`]
//!
//! plus [`Body::Empty`] for responses whose body was absent or deliberately
//! left unparsed. The transport adapter resolves the wire payload into one
//! of these variants exactly once; the orchestrator and cache never
//! re-inspect raw bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request or response payload, resolved to one of the supported shapes.
///
/// `Body` is cheap to clone: the JSON variant shares its tree through
/// [`serde_json::Value`]'s internal allocation, and the blob variant clones
/// [`Bytes`] by reference count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// Structured data parsed from (or serialized to) JSON.
    Json(serde_json::Value),
    /// Plain text payload.
    Text(String),
    /// Opaque binary payload.
    Blob(Bytes),
    /// No payload, or a payload the transport chose not to parse.
    Empty,
}

impl Body {
    /// Returns the kind of this body, or `None` for [`Body::Empty`].
    pub fn kind(&self) -> Option<BodyKind> {
        match self {
            Body::Json(_) => Some(BodyKind::Json),
            Body::Text(_) => Some(BodyKind::Text),
            Body::Blob(_) => Some(BodyKind::Blob),
            Body::Empty => None,
        }
    }

    /// Returns the JSON value if this is a [`Body::Json`].
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text if this is a [`Body::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the bytes if this is a [`Body::Blob`].
    pub fn as_blob(&self) -> Option<&Bytes> {
        match self {
            Body::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns `true` for [`Body::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_owned())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Blob(bytes)
    }
}

/// The expected (or inferred) shape of a response payload.
///
/// Callers may pin the shape on the descriptor; otherwise the transport
/// adapter infers it from the response `content-type` via
/// [`BodyKind::from_content_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// Parse the payload as JSON.
    Json,
    /// Read the payload as text.
    Text,
    /// Keep the payload as raw bytes.
    Blob,
}

impl BodyKind {
    /// Infers the body kind from a `content-type` header value.
    ///
    /// - containing `application/json` -> [`BodyKind::Json`]
    /// - `text/*` -> [`BodyKind::Text`]
    /// - `application/*`, `image/*`, `video/*` -> [`BodyKind::Blob`]
    /// - anything else -> `None` (leave the payload unparsed)
    ///
    /// ```
    /// use reqcache_core::BodyKind;
    ///
    /// assert_eq!(
    ///     BodyKind::from_content_type("application/json; charset=utf-8"),
    ///     Some(BodyKind::Json),
    /// );
    /// assert_eq!(BodyKind::from_content_type("text/html"), Some(BodyKind::Text));
    /// assert_eq!(BodyKind::from_content_type("image/png"), Some(BodyKind::Blob));
    /// assert_eq!(BodyKind::from_content_type("multipart/form-data"), None);
    /// ```
    pub fn from_content_type(content_type: &str) -> Option<BodyKind> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.contains("application/json") {
            Some(BodyKind::Json)
        } else if content_type.starts_with("text/") {
            Some(BodyKind::Text)
        } else if content_type.starts_with("application/")
            || content_type.starts_with("image/")
            || content_type.starts_with("video/")
        {
            Some(BodyKind::Blob)
        } else {
            None
        }
    }

    /// Stable lowercase name used in cache key serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Json => "json",
            BodyKind::Text => "text",
            BodyKind::Blob => "blob",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
