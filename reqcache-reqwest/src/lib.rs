#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod transport;

pub use transport::ReqwestTransport;

// Re-export the boundary types for convenience
pub use reqcache_core::{
    Body, BodyKind, Transport, TransportError, TransportRequest, TransportResponse,
};
