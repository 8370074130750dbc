#![warn(missing_docs)]
//! # reqcache-core
//!
//! Core types and contracts for the reqcache request/cache orchestration
//! engine.
//!
//! This crate defines the vocabulary shared by the orchestrator
//! (`reqcache`) and transport adapters (`reqcache-reqwest`):
//!
//! - **Describe** a logical HTTP call ([`RequestDescriptor`])
//! - **Identify** equivalent calls for caching and deduplication
//!   ([`RequestKey`])
//! - **Carry** response payloads as a tagged union ([`Body`], [`BodyKind`])
//! - **Decide** cache read/write behavior per call ([`FetchPolicy`])
//! - **Perform** a single network attempt ([`Transport`])
//! - **Classify** failures ([`Error`] and friends)
//!
//! Everything here is a plain value or a trait at a seam; no runtime state
//! lives in this crate.

pub mod body;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod policy;
pub mod transport;

pub use body::{Body, BodyKind};
pub use descriptor::RequestDescriptor;
pub use error::{CacheMissError, Error, StatusError, TransportError};
pub use key::{KeyPart, RequestKey};
pub use policy::FetchPolicy;
pub use transport::{Transport, TransportRequest, TransportResponse};
