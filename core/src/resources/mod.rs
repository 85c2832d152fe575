//! Typed endpoint wrappers.
//!
//! Each resource is a borrowed handle obtained from a client
//! (`client.vendors()`, `authed.bookings()`, ...). Public catalogue
//! endpoints hang off `ApiClient`; everything tied to a user session hangs
//! off `AuthedClient` so it goes through the refresh flow.

pub mod auth;
pub mod bookings;
pub mod guests;
pub mod media;
pub mod payments;
pub mod users;
pub mod vendors;

use serde_json::Value;

use crate::envelope::SuccessEnvelope;
use crate::request::{ApiRequest, QueryValue};

/// Selector for payloads wrapped as `data.{key}`.
pub(crate) fn pluck(key: &'static str) -> impl Fn(&SuccessEnvelope) -> Option<Value> + Send + Sync + 'static {
    move |envelope| envelope.data.get(key).cloned()
}

/// Selector for an optional `data.{key}`: absence decodes as `None` instead
/// of falling back to the whole `data`.
pub(crate) fn pluck_optional(
    key: &'static str,
) -> impl Fn(&SuccessEnvelope) -> Option<Value> + Send + Sync + 'static {
    move |envelope| Some(envelope.data.get(key).cloned().unwrap_or(Value::Null))
}

pub(crate) fn with_query<T, I, K, V>(mut request: ApiRequest<T>, query: I) -> ApiRequest<T>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<QueryValue>,
{
    for (key, value) in query {
        request = request.query(key, value);
    }
    request
}
