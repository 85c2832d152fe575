//! Unauthenticated typed fetch client.
//!
//! # Design
//! `ApiClient` holds only the configuration and a transport, both behind
//! `Arc`, and carries no mutable state between calls. A call runs the same
//! pipeline every time: build the `HttpRequest` from the descriptor, execute
//! it under the configured deadline, decode the envelope into `T`. The
//! descriptor's fallback, if any, is consulted only once the pipeline has
//! failed.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::envelope::decode;
use crate::error::{ApiError, ErrorKind};
use crate::request::ApiRequest;
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug)]
pub struct ApiClient<X = ReqwestTransport> {
    config: Arc<ApiConfig>,
    transport: Arc<X>,
}

impl<X> Clone for ApiClient<X> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

impl<X: Transport> ApiClient<X> {
    pub fn with_transport(config: ApiConfig, transport: X) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Run the call; on failure, hand the error to the descriptor's fallback
    /// if it has one.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest<T>) -> Result<T, ApiError> {
        match self.execute(&request).await {
            Ok(value) => Ok(value),
            Err(err) => recover(&request, err).await,
        }
    }

    /// Run the call without consulting the fallback.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest<T>) -> Result<T, ApiError> {
        let http = request.build(&self.config)?;
        debug!(method = %http.method, url = %http.url, "sending request");

        // The deadline covers connect, headers and body. Dropping the
        // timeout future on any exit path also drops its timer.
        let deadline = self.config.timeout();
        let response = match tokio::time::timeout(deadline, self.transport.execute(http)).await {
            Ok(result) => result?,
            Err(_) => return Err(ApiError::timeout(deadline)),
        };
        debug!(status = response.status, path = request.path(), "response received");

        decode(&response, request.selector()).inspect_err(|err| {
            if err.kind == ErrorKind::Schema {
                error!(
                    path = request.path(),
                    status = err.status,
                    error = %err,
                    "response payload does not match the client schema"
                );
            }
        })
    }
}

/// Apply the descriptor's fallback to `err`, or return `err` unchanged.
async fn recover<T>(request: &ApiRequest<T>, err: ApiError) -> Result<T, ApiError> {
    match request.fallback_fn() {
        Some(fallback) => {
            warn!(
                path = request.path(),
                status = err.status,
                kind = ?err.kind,
                error = %err,
                "request failed, serving fallback"
            );
            fallback(err).await
        }
        None => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Replies with a fixed response and records every request.
    struct Canned {
        status: u16,
        body: String,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: serde_json::Value) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                status_text: String::new(),
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::transport("connection refused"))
        }
    }

    struct Stalled;

    #[async_trait]
    impl Transport for Stalled {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ApiError::transport("unreachable"))
        }
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Review {
        id: String,
        rating: f64,
    }

    fn config() -> ApiConfig {
        ApiConfig::new("http://localhost:3000")
    }

    #[tokio::test]
    async fn fetch_decodes_envelope_and_sends_built_request() {
        let client = ApiClient::with_transport(
            config(),
            Canned::new(200, json!({"success": true, "data": [{"id": "r1", "rating": 4.5}]})),
        );
        let reviews = client
            .fetch(ApiRequest::<Vec<Review>>::get("vendors/v1/reviews"))
            .await
            .unwrap();
        assert_eq!(reviews, vec![Review { id: "r1".into(), rating: 4.5 }]);

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://localhost:3000/api/vendors/v1/reviews");
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_fallback() {
        let client = ApiClient::with_transport(config(), Unreachable);
        let err = client.fetch(ApiRequest::<Vec<Review>>::get("reviews")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.status, 0);
    }

    #[tokio::test]
    async fn fallback_receives_the_error() {
        let client = ApiClient::with_transport(config(), Unreachable);
        let message = client
            .fetch(ApiRequest::<String>::get("reviews").fallback(|err| err.message))
            .await
            .unwrap();
        assert_eq!(message, "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_triggers_fallback() {
        let client = ApiClient::with_transport(
            config().with_timeout(Duration::from_millis(50)),
            Stalled,
        );
        let timed_out = client
            .fetch(ApiRequest::<bool>::get("reviews").fallback(|err| err.kind == ErrorKind::Timeout))
            .await
            .unwrap();
        assert!(timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_without_fallback_is_a_timeout_error() {
        let client = ApiClient::with_transport(
            config().with_timeout(Duration::from_millis(50)),
            Stalled,
        );
        let err = client.fetch(ApiRequest::<Vec<Review>>::get("reviews")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn execute_ignores_fallback() {
        let client = ApiClient::with_transport(config(), Unreachable);
        let request = ApiRequest::<Vec<Review>>::get("reviews").fallback(|_| Vec::new());
        assert!(client.execute(&request).await.is_err());
        assert!(client.fetch(request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn identical_calls_give_identical_results() {
        let client = ApiClient::with_transport(
            config(),
            Canned::new(200, json!({"success": true, "data": [{"id": "r1", "rating": 4.5}]})),
        );
        let request = ApiRequest::<Vec<Review>>::get("vendors/v1/reviews").query("page", 1u32);
        let first = client.fetch(request.clone()).await.unwrap();
        let second = client.fetch(request).await.unwrap();
        assert_eq!(first, second);

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
    }

    #[tokio::test]
    async fn schema_mismatch_goes_to_fallback_when_present() {
        let client = ApiClient::with_transport(
            config(),
            Canned::new(200, json!({"success": true, "data": {"unexpected": true}})),
        );
        let err = client
            .fetch(ApiRequest::<Vec<Review>>::get("reviews"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);

        let reviews = client
            .fetch(ApiRequest::<Vec<Review>>::get("reviews").fallback(|_| Vec::new()))
            .await
            .unwrap();
        assert!(reviews.is_empty());
    }
}
