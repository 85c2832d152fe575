//! Authenticated fetch client with transparent token refresh.
//!
//! # Design
//! `AuthedClient` wraps an `ApiClient` and a shared `TokenStore`. A call
//! moves through a fixed sequence:
//!
//! 1. first attempt with the descriptor's token, or the stored access token;
//! 2. on 401 only, one refresh using the stored refresh token;
//! 3. on refresh success, the new pair is stored and the original
//!    descriptor is replayed once with the new access token.
//!
//! There is no loop: a 401 on the replay ends the session instead of
//! refreshing again, so one logical call issues at most one refresh and one
//! retry. Once a refresh has been attempted, any failure after it clears the
//! store before the error is returned.
//!
//! The descriptor's fallback applies to each attempt on its own, exactly as
//! in `ApiClient::fetch`. A call with a fallback therefore never reaches the
//! refresh step: its 401 becomes the fallback value and the session is left
//! alone.
//!
//! Concurrent calls that hit a 401 at the same time each refresh on their
//! own; there is no shared in-flight refresh.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::token_store::{MemoryTokenStore, TokenPair, TokenStore, TokenStoreError};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug)]
pub struct AuthedClient<X = ReqwestTransport, S = MemoryTokenStore> {
    client: ApiClient<X>,
    store: Arc<S>,
}

impl<X, S> Clone for AuthedClient<X, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    pub fn new(client: ApiClient<X>, store: Arc<S>) -> Self {
        Self { client, store }
    }

    /// The unauthenticated client underneath.
    pub fn client(&self) -> &ApiClient<X> {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Perform an authenticated call, refreshing the session at most once.
    pub async fn fetch_authed<T: DeserializeOwned>(
        &self,
        request: ApiRequest<T>,
    ) -> Result<T, ApiError> {
        let token = match request.token() {
            Some(token) => Some(token.to_string()),
            None => tolerate(self.store.access_token(), "access"),
        };

        let first = request.clone().with_token(token);
        match self.client.fetch(first).await {
            Err(err) if err.is_unauthorized() => {
                debug!(path = request.path(), error = %err, "access token rejected");
            }
            outcome => return outcome,
        }

        let Some(refresh_token) = tolerate(self.store.refresh_token(), "refresh") else {
            info!(path = request.path(), "no refresh token, session expired");
            self.clear_store();
            return Err(ApiError::session_expired());
        };

        let pair = match self.client.auth().refresh(&refresh_token).await {
            Ok(pair) => pair,
            Err(err) => {
                self.clear_store();
                if err.is_unauthorized() {
                    info!(path = request.path(), "refresh token rejected, session expired");
                    return Err(ApiError::session_expired());
                }
                warn!(path = request.path(), error = %err, "token refresh failed");
                return Err(err);
            }
        };

        info!(path = request.path(), "session refreshed, retrying request");
        let access_token = pair.access_token.clone();
        self.store_pair(pair);

        let retry = request.clone().with_token(Some(access_token));
        match self.client.fetch(retry).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.clear_store();
                if err.is_unauthorized() {
                    info!(path = request.path(), error = %err, "refreshed token rejected, session expired");
                    return Err(ApiError::session_expired());
                }
                warn!(path = request.path(), error = %err, "retry after refresh failed");
                Err(err)
            }
        }
    }

    /// A failed write is logged; the caller still holds the new pair.
    pub(crate) fn store_pair(&self, pair: TokenPair) {
        if let Err(err) = self.store.set_pair(pair) {
            warn!(error = %err, "failed to persist token pair");
        }
    }

    pub(crate) fn clear_store(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear token store");
        }
    }
}

/// A store that cannot be read is treated as holding no token.
fn tolerate(read: Result<Option<String>, TokenStoreError>, which: &str) -> Option<String> {
    match read {
        Ok(token) => token,
        Err(err) => {
            warn!(error = %err, "could not read {which} token, continuing without it");
            None
        }
    }
}
