//! Request descriptors and their translation into `HttpRequest`.
//!
//! # Design
//! An `ApiRequest<T>` names an endpoint relative to the API prefix and the
//! type `T` its payload must deserialize into. It is pure data plus two
//! optional closures (selector and fallback) held behind `Arc`, so it can be
//! cloned and replayed: the authenticated client rebuilds the same
//! descriptor with a fresh bearer token after a refresh.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::envelope::{Selector, SuccessEnvelope};
use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, MultipartForm};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

/// Produces a substitute result from the error that ended the call.
pub type Fallback<T> = Arc<dyn Fn(ApiError) -> BoxFuture<T> + Send + Sync>;

/// A query parameter value. `Null` drops the key entirely; `List` repeats the
/// key once per present element.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Scalar(String),
    List(Vec<Option<String>>),
}

macro_rules! query_scalars {
    ($($t:ty),*) => {$(
        impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Scalar(v.to_string())
            }
        }

        impl From<Option<$t>> for QueryValue {
            fn from(v: Option<$t>) -> Self {
                v.map_or(QueryValue::Null, |v| QueryValue::Scalar(v.to_string()))
            }
        }

        impl From<Vec<$t>> for QueryValue {
            fn from(v: Vec<$t>) -> Self {
                QueryValue::List(v.into_iter().map(|v| Some(v.to_string())).collect())
            }
        }

        impl From<Vec<Option<$t>>> for QueryValue {
            fn from(v: Vec<Option<$t>>) -> Self {
                QueryValue::List(v.into_iter().map(|v| v.map(|v| v.to_string())).collect())
            }
        }
    )*};
}

query_scalars!(&str, String, bool, i32, i64, u32, u64, usize, f64);

/// Request body before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// Caching directive sent as `Cache-Control`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheHint {
    #[default]
    NoStore,
    /// Accept a cached response up to this many seconds old.
    Revalidate(u32),
    /// Send no directive.
    Default,
}

/// Descriptor for one API call whose payload decodes into `T`.
pub struct ApiRequest<T> {
    path: String,
    method: HttpMethod,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
    query: Vec<(String, QueryValue)>,
    token: Option<String>,
    cache: CacheHint,
    selector: Option<Selector>,
    fallback: Option<Fallback<T>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for ApiRequest<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method,
            body: self.body.clone(),
            headers: self.headers.clone(),
            query: self.query.clone(),
            token: self.token.clone(),
            cache: self.cache,
            selector: self.selector.clone(),
            fallback: self.fallback.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ApiRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_token", &self.token.is_some())
            .field("has_selector", &self.selector.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<T> ApiRequest<T> {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            headers: Vec::new(),
            query: Vec::new(),
            token: None,
            cache: CacheHint::default(),
            selector: None,
            fallback: None,
            _payload: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::serialization(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace (or remove) the bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn cache(mut self, cache: CacheHint) -> Self {
        self.cache = cache;
        self
    }

    pub fn select<F>(mut self, selector: F) -> Self
    where
        F: Fn(&SuccessEnvelope) -> Option<Value> + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(selector));
        self
    }

    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(ApiError) -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        self.fallback = Some(Arc::new(move |err: ApiError| -> BoxFuture<T> {
            let value = fallback(err);
            Box::pin(async move { Ok(value) })
        }));
        self
    }

    /// Like `fallback`, for substitutes that need I/O of their own.
    pub fn fallback_async<F, Fut>(mut self, fallback: F) -> Self
    where
        F: Fn(ApiError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.fallback = Some(Arc::new(move |err: ApiError| -> BoxFuture<T> {
            Box::pin(fallback(err))
        }));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub(crate) fn fallback_fn(&self) -> Option<&Fallback<T>> {
        self.fallback.as_ref()
    }

    /// Produce the wire request: resolved URL with query, merged headers,
    /// serialized body.
    pub fn build(&self, config: &ApiConfig) -> Result<HttpRequest, ApiError> {
        let mut url = url::Url::parse(&config.resolve(&self.path))
            .map_err(|e| ApiError::config(format!("invalid request URL: {e}")))?;

        let pairs: Vec<(&str, &str)> = self
            .query
            .iter()
            .flat_map(|(key, value)| {
                let values: Vec<&str> = match value {
                    QueryValue::Null => Vec::new(),
                    QueryValue::Scalar(v) => vec![v.as_str()],
                    QueryValue::List(items) => items.iter().flatten().map(String::as_str).collect(),
                };
                values.into_iter().map(move |v| (key.as_str(), v))
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        match self.cache {
            CacheHint::NoStore => set_header(&mut headers, "Cache-Control", "no-store".into()),
            CacheHint::Revalidate(secs) => {
                set_header(&mut headers, "Cache-Control", format!("max-age={secs}"))
            }
            CacheHint::Default => {}
        }
        for (name, value) in &self.headers {
            set_header(&mut headers, name, value.clone());
        }

        let body = match &self.body {
            None => None,
            Some(RequestBody::Multipart(form)) => Some(HttpBody::Multipart(form.clone())),
            Some(RequestBody::Json(value)) => {
                set_header(&mut headers, "Content-Type", "application/json".into());
                Some(HttpBody::Json(value.to_string()))
            }
        };

        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            set_header(&mut headers, "Authorization", format!("Bearer {token}"));
        }

        Ok(HttpRequest {
            method: self.method,
            url: url.into(),
            headers,
            body,
        })
    }
}

/// Insert or overwrite a header, matching names case-insensitively.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> ApiConfig {
        ApiConfig::new("http://localhost:3000")
    }

    #[test]
    fn get_with_no_extras() {
        let req = ApiRequest::<Value>::get("vendors").build(&config()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/vendors");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("cache-control"), Some("no-store"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn null_query_values_are_dropped() {
        let req = ApiRequest::<Value>::get("vendors/search")
            .query("zone", "bangkok")
            .query("category", None::<&str>)
            .query("limit", 20u32)
            .build(&config())
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/vendors/search?zone=bangkok&limit=20");
    }

    #[test]
    fn only_null_query_values_leave_no_question_mark() {
        let req = ApiRequest::<Value>::get("vendors")
            .query("keyword", None::<String>)
            .build(&config())
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/vendors");
    }

    #[test]
    fn array_query_values_repeat_the_key_in_order() {
        let req = ApiRequest::<Value>::get("vendors")
            .query("tags", vec!["lanna", "floral"])
            .build(&config())
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/vendors?tags=lanna&tags=floral");
    }

    #[test]
    fn null_array_elements_are_skipped() {
        let req = ApiRequest::<Value>::get("vendors")
            .query("ids", vec![Some(1i64), None, Some(3)])
            .build(&config())
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/vendors?ids=1&ids=3");
    }

    #[test]
    fn query_values_are_encoded() {
        let req = ApiRequest::<Value>::get("vendors")
            .query("search", "thai silk & gold")
            .query("verified", true)
            .build(&config())
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/vendors?search=thai+silk+%26+gold&verified=true"
        );
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = ApiRequest::<Value>::post("bookings")
            .json(&json!({"vendorId": "v1", "guestCount": 120}))
            .unwrap()
            .build(&config())
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        let Some(HttpBody::Json(text)) = req.body else {
            panic!("expected json body");
        };
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["guestCount"], 120);
    }

    #[test]
    fn multipart_body_has_no_content_type() {
        let form = MultipartForm::new()
            .text("bookingId", "b1")
            .file("file", "contract.pdf", Some("application/pdf"), vec![1, 2, 3]);
        let req = ApiRequest::<Value>::post("media/upload")
            .multipart(form.clone())
            .build(&config())
            .unwrap();
        assert!(req.header("content-type").is_none());
        assert_eq!(req.body, Some(HttpBody::Multipart(form)));
    }

    #[test]
    fn caller_headers_override_accept() {
        let req = ApiRequest::<Value>::get("media/1")
            .header("accept", "application/octet-stream")
            .build(&config())
            .unwrap();
        let accepts: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("accept"))
            .collect();
        assert_eq!(accepts.len(), 1);
        assert_eq!(accepts[0].1, "application/octet-stream");
    }

    #[test]
    fn bearer_token_wins_over_caller_authorization() {
        let req = ApiRequest::<Value>::get("users/me")
            .header("Authorization", "Basic abc")
            .bearer("tok-1")
            .build(&config())
            .unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer tok-1"));
        let count = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_token_sends_no_authorization() {
        let req = ApiRequest::<Value>::get("users/me")
            .bearer("")
            .build(&config())
            .unwrap();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn cache_hints_map_to_cache_control() {
        let revalidate = ApiRequest::<Value>::get("vendors")
            .cache(CacheHint::Revalidate(60))
            .build(&config())
            .unwrap();
        assert_eq!(revalidate.header("cache-control"), Some("max-age=60"));

        let default = ApiRequest::<Value>::get("vendors")
            .cache(CacheHint::Default)
            .build(&config())
            .unwrap();
        assert!(default.header("cache-control").is_none());
    }

    #[test]
    fn clone_preserves_token_and_body() {
        let original = ApiRequest::<Value>::post("guests")
            .json_value(json!({"name": "Somchai"}))
            .bearer("old");
        let replay = original.clone().with_token(Some("new".into()));
        assert_eq!(original.token(), Some("old"));
        assert_eq!(replay.token(), Some("new"));
        assert_eq!(
            original.build(&config()).unwrap().body,
            replay.build(&config()).unwrap().body
        );
    }
}
