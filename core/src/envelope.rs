//! Decoder for the backend's response envelope.
//!
//! # Design
//! Most endpoints wrap their payload as
//! `{success, data, error, pagination, meta}`, but some answer with a bare
//! JSON body. `decode` accepts both: a body that does not have the envelope
//! shape is treated as the `data` of a synthetic success envelope (2xx) or
//! mined for `error`/`message`/`code`/`details` fields (non-2xx). Validation
//! against the caller's type happens here too, so untyped JSON never leaves
//! this module.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Pagination block attached to list responses. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// The `error` member of a failed envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Wire form of the uniform response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// A successful envelope as seen by selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessEnvelope {
    pub data: Value,
    pub pagination: Option<Pagination>,
    pub meta: Option<Meta>,
}

/// Plucks the payload out of a success envelope. Returning `None` means
/// "use `data` as is".
pub type Selector = Arc<dyn Fn(&SuccessEnvelope) -> Option<Value> + Send + Sync>;

/// Parse a response body, treating anything that is not JSON as `{}`.
pub fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Match `json` against the envelope shape. Only objects qualify.
pub fn as_envelope(json: &Value) -> Option<Envelope> {
    if !json.is_object() {
        return None;
    }
    serde_json::from_value(json.clone()).ok()
}

/// Decode a response into `T`, following the envelope rules described in the
/// module docs.
pub fn decode<T: DeserializeOwned>(
    response: &HttpResponse,
    selector: Option<&Selector>,
) -> Result<T, ApiError> {
    let json = parse_body(&response.body);

    let envelope = match as_envelope(&json) {
        Some(envelope) => {
            if !response.is_success() || !envelope.success {
                let error = envelope.error.unwrap_or_default();
                return Err(ApiError::http(
                    failure_message(error.message.as_deref(), response),
                    response.status,
                    error.code,
                    error.details,
                ));
            }
            SuccessEnvelope {
                data: envelope.data.unwrap_or(Value::Null),
                pagination: envelope.pagination,
                meta: envelope.meta,
            }
        }
        None => {
            if !response.is_success() {
                return Err(bare_error(&json, response));
            }
            SuccessEnvelope {
                data: json,
                pagination: None,
                meta: Some(Meta {
                    timestamp: Some(chrono::Utc::now().to_rfc3339()),
                    request_id: None,
                }),
            }
        }
    };

    let payload = match selector.and_then(|select| select(&envelope)) {
        Some(selected) => selected,
        None => envelope.data,
    };
    serde_json::from_value(payload).map_err(|e| ApiError::schema(&e, response.status))
}

fn bare_error(json: &Value, response: &HttpResponse) -> ApiError {
    let explicit = json
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| json.get("message").and_then(Value::as_str));
    let code = json.get("code").and_then(Value::as_str).map(str::to_string);
    let details = json.get("details").filter(|d| !d.is_null()).cloned();
    ApiError::http(failure_message(explicit, response), response.status, code, details)
}

fn failure_message(explicit: Option<&str>, response: &HttpResponse) -> String {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| Some(response.status_text.as_str()).filter(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("API request failed with status {}", response.status))
}
