//! Guest lists, RSVPs, invitations and check-in.
//!
//! Write payloads are caller-defined: any `Serialize` value is sent as the
//! JSON body. Responses wrap their payload under a key (`guest`, `guests`,
//! `summary`, ...), which the selectors unwrap.

use serde::{Deserialize, Serialize};

use crate::authed::AuthedClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::resources::{pluck, pluck_optional};
use crate::routes;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::types::{Guest, Record, RsvpImportSummary, RsvpSummary};

pub struct GuestsApi<'a, X, S> {
    client: &'a AuthedClient<X, S>,
}

impl<X: Transport, S: TokenStore> AuthedClient<X, S> {
    pub fn guests(&self) -> GuestsApi<'_, X, S> {
        GuestsApi { client: self }
    }
}

#[derive(Deserialize)]
struct Deleted {
    #[serde(default)]
    success: Option<bool>,
}

impl<X: Transport, S: TokenStore> GuestsApi<'_, X, S> {
    pub async fn create<B: Serialize + ?Sized>(&self, guest: &B) -> Result<Guest, ApiError> {
        let request = ApiRequest::post(routes::guests::BASE)
            .json(guest)?
            .select(pluck("guest"));
        self.client.fetch_authed(request).await
    }

    pub async fn for_booking(&self, booking_id: &str) -> Result<Vec<Guest>, ApiError> {
        let request =
            ApiRequest::get(routes::guests::for_booking(booking_id)).select(pluck("guests"));
        self.client.fetch_authed(request).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &B,
    ) -> Result<Guest, ApiError> {
        let request = ApiRequest::patch(routes::guests::detail(id))
            .json(changes)?
            .select(pluck("guest"));
        self.client.fetch_authed(request).await
    }

    /// `Some(flag)` when the server reports the outcome, `None` otherwise.
    pub async fn delete(&self, id: &str) -> Result<Option<bool>, ApiError> {
        let request = ApiRequest::<Deleted>::delete(routes::guests::detail(id));
        Ok(self.client.fetch_authed(request).await?.success)
    }

    pub async fn submit_rsvp<B: Serialize + ?Sized>(
        &self,
        rsvp: &B,
    ) -> Result<Option<Record>, ApiError> {
        let request = ApiRequest::post(routes::guests::RSVP)
            .json(rsvp)?
            .select(pluck_optional("rsvp"));
        self.client.fetch_authed(request).await
    }

    pub async fn rsvp_summary(&self, booking_id: &str) -> Result<RsvpSummary, ApiError> {
        let request =
            ApiRequest::get(routes::guests::rsvp_summary(booking_id)).select(pluck("summary"));
        self.client.fetch_authed(request).await
    }

    pub async fn import_rsvp<B: Serialize + ?Sized>(
        &self,
        entries: &B,
    ) -> Result<RsvpImportSummary, ApiError> {
        let request = ApiRequest::post(routes::guests::IMPORT_RSVP)
            .json(entries)?
            .select(pluck("summary"));
        self.client.fetch_authed(request).await
    }

    pub async fn create_invitation<B: Serialize + ?Sized>(
        &self,
        invitation: &B,
    ) -> Result<Option<Record>, ApiError> {
        let request = ApiRequest::post(routes::guests::INVITATIONS)
            .json(invitation)?
            .select(pluck_optional("invitation"));
        self.client.fetch_authed(request).await
    }

    pub async fn check_in<B: Serialize + ?Sized>(
        &self,
        check_in: &B,
    ) -> Result<Option<Record>, ApiError> {
        let request = ApiRequest::post(routes::guests::CHECKIN)
            .json(check_in)?
            .select(pluck_optional("checkIn"));
        self.client.fetch_authed(request).await
    }
}
