//! Media uploads.
//!
//! Uploads are multipart forms. The transport sets the `Content-Type` with
//! its own boundary, so nothing here touches that header.

use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::MultipartForm;
use crate::request::ApiRequest;
use crate::resources::pluck;
use crate::routes;
use crate::transport::Transport;
use crate::types::MediaItem;

pub struct MediaApi<'a, X> {
    client: &'a ApiClient<X>,
}

impl<X: Transport> ApiClient<X> {
    pub fn media(&self) -> MediaApi<'_, X> {
        MediaApi { client: self }
    }
}

#[derive(Deserialize)]
struct Deleted {
    #[serde(default)]
    success: Option<bool>,
}

impl<X: Transport> MediaApi<'_, X> {
    /// Upload `form`; the item may come back as `data` or `data.data`.
    pub async fn upload(&self, form: MultipartForm) -> Result<MediaItem, ApiError> {
        let request = ApiRequest::post(routes::media::UPLOAD)
            .multipart(form)
            .select(pluck("data"));
        self.client.fetch(request).await
    }

    pub async fn get(&self, id: &str) -> Result<MediaItem, ApiError> {
        let request = ApiRequest::get(routes::media::detail(id)).select(pluck("data"));
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<Option<bool>, ApiError> {
        let request = ApiRequest::<Deleted>::delete(routes::media::detail(id));
        Ok(self.client.fetch(request).await?.success)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::config::ApiConfig;
    use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, PartValue};

    struct Recorder {
        reply: Value,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn replying(reply: Value) -> ApiClient<Self> {
            ApiClient::with_transport(
                ApiConfig::new("http://localhost:3000"),
                Self {
                    reply,
                    seen: Mutex::new(Vec::new()),
                },
            )
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                status_text: String::new(),
                headers: Vec::new(),
                body: self.reply.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn upload_sends_the_form_untouched() {
        let client = Recorder::replying(json!({
            "success": true,
            "data": {"id": "m1", "url": "https://cdn.phithiai.test/m1.png", "type": "image"}
        }));
        let form = MultipartForm::new()
            .text("eventId", "e-1")
            .file("file", "altar.png", Some("image/png"), vec![1, 2, 3]);

        let item = client.media().upload(form.clone()).await.unwrap();
        assert_eq!(item.id, "m1");
        assert_eq!(item.media_type.as_deref(), Some("image"));

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].url, "http://localhost:3000/api/media/upload");
        assert!(seen[0].header("content-type").is_none());
        match &seen[0].body {
            Some(HttpBody::Multipart(sent)) => {
                assert_eq!(sent, &form);
                assert!(matches!(sent.parts[1].1, PartValue::File { .. }));
            }
            other => panic!("expected a multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nested_data_is_unwrapped() {
        let client = Recorder::replying(json!({
            "success": true,
            "data": {"data": {"id": "m2", "url": "https://cdn.phithiai.test/m2.pdf"}}
        }));
        let item = client.media().get("m2").await.unwrap();
        assert_eq!(item.url, "https://cdn.phithiai.test/m2.pdf");
    }

    #[tokio::test]
    async fn delete_reports_success_flag() {
        let client = Recorder::replying(json!({"success": true, "data": {"success": true}}));
        assert_eq!(client.media().delete("m1").await.unwrap(), Some(true));
        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Delete);
    }
}
