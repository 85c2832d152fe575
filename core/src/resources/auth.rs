//! Account endpoints: registration, login, refresh, logout, password reset.

use serde_json::{json, Value};

use crate::authed::AuthedClient;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::routes;
use crate::token_store::{TokenPair, TokenStore};
use crate::transport::Transport;
use crate::types::{AuthSession, Credentials, MessageResponse, Registration};

pub struct AuthApi<'a, X> {
    client: &'a ApiClient<X>,
}

impl<X: Transport> ApiClient<X> {
    pub fn auth(&self) -> AuthApi<'_, X> {
        AuthApi { client: self }
    }
}

impl<X: Transport> AuthApi<'_, X> {
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let request = ApiRequest::post(routes::auth::REGISTER).json(registration)?;
        let session: AuthSession = self.client.fetch(request).await?;
        require_tokens(&session.access_token, &session.refresh_token)?;
        Ok(session)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let request = ApiRequest::post(routes::auth::LOGIN).json(credentials)?;
        let session: AuthSession = self.client.fetch(request).await?;
        require_tokens(&session.access_token, &session.refresh_token)?;
        Ok(session)
    }

    /// Exchange a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(routes::auth::REFRESH)
            .json_value(json!({ "refreshToken": refresh_token }));
        let pair: TokenPair = self.client.fetch(request).await?;
        require_tokens(&pair.access_token, &pair.refresh_token)?;
        Ok(pair)
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<Value, ApiError> {
        let request = ApiRequest::post(routes::auth::LOGOUT)
            .json_value(json!({ "refreshToken": refresh_token }));
        self.client.fetch(request).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let request =
            ApiRequest::post(routes::auth::FORGOT_PASSWORD).json_value(json!({ "email": email }));
        self.client.fetch(request).await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let request = ApiRequest::post(routes::auth::RESET_PASSWORD)
            .json_value(json!({ "token": token, "newPassword": new_password }));
        self.client.fetch(request).await
    }
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    /// Log in and keep the issued pair in the token store.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let session = self.client().auth().login(credentials).await?;
        self.store_pair(TokenPair::new(
            session.access_token.clone(),
            session.refresh_token.clone(),
        ));
        Ok(session)
    }

    /// Register and keep the issued pair in the token store.
    pub async fn sign_up(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let session = self.client().auth().register(registration).await?;
        self.store_pair(TokenPair::new(
            session.access_token.clone(),
            session.refresh_token.clone(),
        ));
        Ok(session)
    }

    /// Clear the local session, then revoke the refresh token server-side.
    /// The store is empty afterwards even if the logout call fails.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let refresh_token = self.store().refresh_token().ok().flatten();
        self.clear_store();
        if let Some(token) = refresh_token {
            self.client().auth().logout(&token).await?;
        }
        Ok(())
    }
}

fn require_tokens(access_token: &str, refresh_token: &str) -> Result<(), ApiError> {
    if access_token.is_empty() || refresh_token.is_empty() {
        let err = <serde_json::Error as serde::de::Error>::custom("issued token is empty");
        return Err(ApiError::schema(&err, 200));
    }
    Ok(())
}
