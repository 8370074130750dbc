//! Cache key derivation and representation.
//!
//! This module provides types for building and representing request keys:
//!
//! - [`RequestKey`] - The canonical identity of a request for caching and
//!   deduplication
//! - [`KeyPart`] - A single key-value component of a request key
//!
//! ## Canonicalization
//!
//! [`RequestKey::from_descriptor`] is a pure function of the descriptor's
//! `(method, url, response kind, headers, extra key, success codes)`:
//!
//! - header names are compared lower-cased and pairs are sorted by
//!   name-then-value, so neither casing nor insertion order affects the key;
//! - success codes are de-duplicated and sorted ascending;
//! - the request body is deliberately excluded - callers needing per-body
//!   cache separation pass `extra_key` instead;
//! - `method` defaults to `GET` at the descriptor level, so an implicit and
//!   an explicit `GET` key identically.
//!
//! ## Format
//!
//! When serialized to string, keys follow the format
//! `key1=value1&key2=value2`:
//!
//! ```
//! use reqcache_core::{RequestDescriptor, RequestKey};
//!
//! let key = RequestKey::from_descriptor(&RequestDescriptor::new("/ping"));
//! assert_eq!(format!("{}", key), "method=GET&url=/ping");
//! ```
//!
//! ## Performance
//!
//! [`RequestKey`] uses `Arc` internally for cheap cloning, and [`KeyPart`]
//! uses [`SmolStr`] so typical components ("method", "GET", short paths)
//! stay inline without heap allocation.

use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::RequestDescriptor;

/// A single component of a request key.
///
/// Each part is a key-value pair; the value is optional for flag-like
/// components.
#[derive(Debug, Clone, Eq, PartialEq, Hash, serde::Serialize)]
pub struct KeyPart {
    key: SmolStr,
    value: Option<SmolStr>,
}

impl KeyPart {
    /// Creates a new key part.
    pub fn new<K: AsRef<str>, V: AsRef<str>>(key: K, value: Option<V>) -> Self {
        KeyPart {
            key: SmolStr::new(key),
            value: value.map(SmolStr::new),
        }
    }

    /// Returns the key name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the optional value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(ref value) = self.value {
            write!(f, "={}", value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Eq, PartialEq, Hash, serde::Serialize)]
struct RequestKeyInner {
    parts: Vec<KeyPart>,
}

/// The canonical cache/deduplication identity of a request.
///
/// Two descriptors that are equivalent for caching purposes (same
/// method/url/header set/response kind/extra key/success-code set, body
/// excluded) always produce equal keys; see the
/// [module docs](self) for the normalization rules.
///
/// # Cheap cloning
///
/// `RequestKey` wraps its parts in [`Arc`], making `clone()` an O(1)
/// reference-count bump. Keys are passed around freely during cache and
/// registry operations.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(into = "RequestKeyInner")]
pub struct RequestKey {
    inner: Arc<RequestKeyInner>,
}

impl From<RequestKey> for RequestKeyInner {
    fn from(key: RequestKey) -> Self {
        RequestKeyInner {
            parts: key.inner.parts.clone(),
        }
    }
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.inner.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl RequestKey {
    /// Creates a key from already-canonical parts.
    pub fn new(parts: Vec<KeyPart>) -> Self {
        RequestKey {
            inner: Arc::new(RequestKeyInner { parts }),
        }
    }

    /// Returns an iterator over the key parts.
    pub fn parts(&self) -> impl Iterator<Item = &KeyPart> {
        self.inner.parts.iter()
    }

    /// Derives the canonical key for a descriptor.
    ///
    /// Pure, total, and stable across processes: the result depends only on
    /// the descriptor's logical content, never on map iteration order.
    pub fn from_descriptor(descriptor: &RequestDescriptor) -> Self {
        let mut parts = Vec::with_capacity(4 + descriptor.headers.len());
        parts.push(KeyPart::new("method", Some(descriptor.method.as_str())));
        parts.push(KeyPart::new("url", Some(descriptor.url.as_str())));
        if let Some(kind) = descriptor.response_kind {
            parts.push(KeyPart::new("type", Some(kind.as_str())));
        }

        // http::HeaderName is already lower-cased; sorting by name then value
        // makes insertion order irrelevant.
        let mut headers: Vec<(String, String)> = descriptor
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        headers.sort();
        for (name, value) in headers {
            parts.push(KeyPart::new(format!("header:{name}"), Some(value)));
        }

        if let Some(ref extra) = descriptor.extra_key {
            parts.push(KeyPart::new("extra", Some(extra.as_str())));
        }

        if let Some(ref codes) = descriptor.success_codes {
            let mut codes = codes.clone();
            codes.sort_unstable();
            codes.dedup();
            let serialized = codes
                .iter()
                .map(|code| code.to_string())
                .collect::<Vec<_>>()
                .join(",");
            parts.push(KeyPart::new("codes", Some(serialized)));
        }

        RequestKey::new(parts)
    }
}
