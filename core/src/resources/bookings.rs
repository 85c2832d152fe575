//! Bookings. Every call goes through the authenticated client.

use serde_json::json;

use crate::authed::AuthedClient;
use crate::error::ApiError;
use crate::request::{ApiRequest, QueryValue};
use crate::resources::{pluck, with_query};
use crate::routes;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::types::{Booking, NewBooking, Record};

pub struct BookingsApi<'a, X, S> {
    client: &'a AuthedClient<X, S>,
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    pub fn bookings(&self) -> BookingsApi<'_, X, S> {
        BookingsApi { client: self }
    }
}

impl<X: Transport, S: TokenStore> BookingsApi<'_, X, S> {
    /// All bookings visible to the caller, filtered by `query`.
    pub async fn list<I, K, V>(&self, query: I) -> Result<Vec<Booking>, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let request = with_query(ApiRequest::get(routes::bookings::LIST), query);
        self.client.fetch_authed(request.select(pluck("bookings"))).await
    }

    /// Bookings owned by the signed-in user.
    pub async fn list_mine<I, K, V>(&self, query: I) -> Result<Vec<Booking>, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let request = with_query(ApiRequest::get(routes::bookings::ME), query);
        self.client.fetch_authed(request.select(pluck("bookings"))).await
    }

    pub async fn statistics(&self) -> Result<Record, ApiError> {
        let request = ApiRequest::get(routes::bookings::STATISTICS).select(pluck("statistics"));
        self.client.fetch_authed(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Booking, ApiError> {
        let request = ApiRequest::get(routes::bookings::detail(id)).select(pluck("booking"));
        self.client.fetch_authed(request).await
    }

    pub async fn create(&self, booking: &NewBooking) -> Result<Booking, ApiError> {
        let request = ApiRequest::post(routes::bookings::LIST)
            .json(booking)?
            .select(pluck("booking"));
        self.client.fetch_authed(request).await
    }

    pub async fn confirm(&self, id: &str) -> Result<Booking, ApiError> {
        let request = ApiRequest::post(routes::bookings::confirm(id)).select(pluck("booking"));
        self.client.fetch_authed(request).await
    }

    pub async fn complete(&self, id: &str) -> Result<Booking, ApiError> {
        let request = ApiRequest::post(routes::bookings::complete(id)).select(pluck("booking"));
        self.client.fetch_authed(request).await
    }

    /// Cancel a booking. The reason is sent only when given.
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Booking, ApiError> {
        let mut request = ApiRequest::post(routes::bookings::cancel(id)).select(pluck("booking"));
        if let Some(reason) = reason {
            request = request.json_value(json!({ "reason": reason }));
        }
        self.client.fetch_authed(request).await
    }
}
