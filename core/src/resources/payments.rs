//! Payment intents. Intents come back bare, not wrapped under a key.

use serde::Serialize;

use crate::authed::AuthedClient;
use crate::error::ApiError;
use crate::request::{ApiRequest, QueryValue};
use crate::resources::with_query;
use crate::routes;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::types::PaymentIntent;

pub struct PaymentsApi<'a, X, S> {
    client: &'a AuthedClient<X, S>,
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    pub fn payments(&self) -> PaymentsApi<'_, X, S> {
        PaymentsApi { client: self }
    }
}

impl<X: Transport, S: TokenStore> PaymentsApi<'_, X, S> {
    /// List intents. List-valued filters (e.g. several statuses) repeat the
    /// key.
    pub async fn list_intents<I, K, V>(&self, query: I) -> Result<Vec<PaymentIntent>, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let request = with_query(ApiRequest::get(routes::payments::INTENTS), query);
        self.client.fetch_authed(request).await
    }

    pub async fn create_intent<B: Serialize + ?Sized>(
        &self,
        intent: &B,
    ) -> Result<PaymentIntent, ApiError> {
        let request = ApiRequest::post(routes::payments::INTENTS).json(intent)?;
        self.client.fetch_authed(request).await
    }

    pub async fn get_intent(&self, id: &str) -> Result<PaymentIntent, ApiError> {
        self.client
            .fetch_authed(ApiRequest::get(routes::payments::intent(id)))
            .await
    }

    pub async fn confirm_intent<B: Serialize + ?Sized>(
        &self,
        id: &str,
        confirmation: &B,
    ) -> Result<PaymentIntent, ApiError> {
        let request = ApiRequest::post(routes::payments::confirm_intent(id)).json(confirmation)?;
        self.client.fetch_authed(request).await
    }

    pub async fn fail_intent<B: Serialize + ?Sized>(
        &self,
        id: &str,
        failure: &B,
    ) -> Result<PaymentIntent, ApiError> {
        let request = ApiRequest::post(routes::payments::fail_intent(id)).json(failure)?;
        self.client.fetch_authed(request).await
    }
}
