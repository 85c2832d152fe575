//! Error type for the phithiai API client.
//!
//! # Design
//! Every failure leaving the client is an `ApiError`: server rejections,
//! transport failures, timeouts and payloads that do not match the expected
//! type alike. Callers discriminate on `status` and `code` the way they would
//! on an HTTP response; `kind` tells a server-side rejection apart from a
//! network problem or from client/server contract drift.

use std::time::Duration;

use serde_json::Value;

/// Message used whenever the authenticated flow gives up on the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";

/// Where an `ApiError` originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with a non-2xx status or `success: false`.
    Http,
    /// The per-call deadline elapsed before a response arrived.
    Timeout,
    /// No response: connection refused, DNS, TLS, reset.
    Transport,
    /// The payload did not deserialize into the declared type.
    Schema,
    /// The request body or query could not be serialized.
    Serialization,
    /// Invalid configuration, e.g. an unparsable base URL.
    Config,
}

/// The single error type returned by the client surface.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status, or `0` when no response was received.
    pub status: u16,
    pub code: Option<String>,
    pub details: Option<Value>,
    pub kind: ErrorKind,
}

impl ApiError {
    pub fn http(
        message: impl Into<String>,
        status: u16,
        code: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            code,
            details,
            kind: ErrorKind::Http,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            message: format!("request timed out after {} ms", after.as_millis()),
            status: 0,
            code: None,
            details: None,
            kind: ErrorKind::Timeout,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            code: None,
            details: None,
            kind: ErrorKind::Transport,
        }
    }

    /// A 2xx payload that failed validation. `status` keeps the response
    /// status so logs show the server considered the call a success.
    pub fn schema(err: &serde_json::Error, status: u16) -> Self {
        Self {
            message: format!("response did not match the expected schema: {err}"),
            status,
            code: None,
            details: None,
            kind: ErrorKind::Schema,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            code: None,
            details: None,
            kind: ErrorKind::Serialization,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 0,
            code: None,
            details: None,
            kind: ErrorKind::Config,
        }
    }

    /// 401 telling the caller to authenticate again. Code and details are
    /// intentionally empty.
    pub fn session_expired() -> Self {
        Self::http(SESSION_EXPIRED_MESSAGE, 401, None, None)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Http && self.status == 401
    }

    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        let own = (!self.message.is_empty()).then(|| self.message.clone());
        match self.status {
            400 => own.unwrap_or_else(|| "Please check your input and try again.".to_string()),
            401 => own.unwrap_or_else(|| "Please sign in to continue.".to_string()),
            s if s >= 500 => "Server error. Please try again in a moment.".to_string(),
            _ => own.unwrap_or_else(|| "Something went wrong. Please try again.".to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self {
                message: err.to_string(),
                status: 0,
                code: None,
                details: None,
                kind: ErrorKind::Timeout,
            }
        } else {
            ApiError::transport(err.to_string())
        }
    }
}
