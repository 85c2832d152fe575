//! Signed-in user profile endpoints.

use serde::Deserialize;
use serde_json::json;

use crate::authed::AuthedClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::resources::pluck;
use crate::routes;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::types::{AuthUser, ProfileUpdate};

pub struct UsersApi<'a, X, S> {
    client: &'a AuthedClient<X, S>,
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    pub fn users(&self) -> UsersApi<'_, X, S> {
        UsersApi { client: self }
    }
}

#[derive(Deserialize)]
struct PasswordChanged {
    #[serde(default)]
    message: Option<String>,
}

impl<X: Transport, S: TokenStore> UsersApi<'_, X, S> {
    /// The signed-in user's profile.
    pub async fn me(&self) -> Result<AuthUser, ApiError> {
        let request = ApiRequest::get(routes::users::ME).select(pluck("user"));
        self.client.fetch_authed(request).await
    }

    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        let request = ApiRequest::patch(routes::users::ME)
            .json(update)?
            .select(pluck("user"));
        self.client.fetch_authed(request).await
    }

    /// Returns the server's confirmation message, if it sent one.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Option<String>, ApiError> {
        let request = ApiRequest::<PasswordChanged>::post(routes::users::CHANGE_PASSWORD)
            .json_value(json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            }));
        Ok(self.client.fetch_authed(request).await?.message)
    }
}
