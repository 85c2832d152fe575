//! Typed API access layer for the phithiai vendor marketplace.
//!
//! # Overview
//! Every backend call goes through one pipeline: an `ApiRequest<T>`
//! descriptor is built into a plain-data `HttpRequest`, executed by a
//! `Transport` under a deadline, and the `HttpResponse` is decoded from the
//! backend's `{success, data, error}` envelope into `T`. Failures are always
//! an `ApiError` carrying the message, HTTP status and optional code.
//!
//! # Design
//! - `ApiClient` is stateless apart from its config and transport.
//! - `AuthedClient` adds a `TokenStore` and refreshes an expired session at
//!   most once per call before giving up with a session-expired error.
//! - The network sits behind the `Transport` trait. `ReqwestTransport` is
//!   the production implementation; tests script their own.
//! - Resource handles (`client.vendors()`, `authed.bookings()`, ...) declare
//!   paths, payload types and selectors and nothing else.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod authed;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fallbacks;
pub mod http;
pub mod request;
pub mod resources;
pub mod routes;
pub mod token_store;
pub mod transport;
pub mod types;

pub use authed::AuthedClient;
pub use client::ApiClient;
pub use config::ApiConfig;
pub use envelope::{decode, Envelope, ErrorBody, Meta, Pagination, SuccessEnvelope};
pub use error::{ApiError, ErrorKind, SESSION_EXPIRED_MESSAGE};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartValue};
pub use request::{ApiRequest, CacheHint, QueryValue};
pub use resources::vendors::{VendorQuery, VendorSort};
pub use token_store::{MemoryTokenStore, TokenPair, TokenStore, TokenStoreError};
pub use transport::{ReqwestTransport, Transport};
