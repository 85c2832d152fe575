//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and talks to it through
//! the real `ReqwestTransport`, so request building, the HTTP round-trip,
//! envelope decoding and the refresh flow are all exercised together. The
//! DTOs on either side are defined independently; a mismatch shows up here
//! as a schema error.

use std::sync::Arc;

use phithiai_api::types::{Credentials, NewBooking, ProfileUpdate};
use phithiai_api::{
    ApiClient, ApiConfig, ApiRequest, AuthedClient, ErrorKind, MemoryTokenStore, MultipartForm,
    VendorQuery, SESSION_EXPIRED_MESSAGE,
};
use serde_json::Value;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await.unwrap() });
    format!("http://{addr}")
}

fn demo_credentials() -> Credentials {
    Credentials {
        email: mock_server::DEMO_EMAIL.to_string(),
        password: mock_server::DEMO_PASSWORD.to_string(),
    }
}

#[tokio::test]
async fn session_lifecycle() {
    let base = start_server().await;
    let client = AuthedClient::new(
        ApiClient::new(ApiConfig::new(&base)),
        Arc::new(MemoryTokenStore::new()),
    );

    // Step 1: sign in and read the profile.
    let session = client.sign_in(&demo_credentials()).await.unwrap();
    assert_eq!(session.user.email, mock_server::DEMO_EMAIL);
    let me = client.users().me().await.unwrap();
    assert_eq!(me.first_name.as_deref(), Some("Ploy"));

    // Step 2: the server forgets every access token; the next call must
    // refresh once and succeed.
    client
        .client()
        .fetch(ApiRequest::<Value>::post("__mock/expire-access"))
        .await
        .unwrap();
    let updated = client
        .users()
        .update_me(&ProfileUpdate {
            last_name: Some("Srisuk".into()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.last_name.as_deref(), Some("Srisuk"));

    let stats = client
        .client()
        .fetch(ApiRequest::<Value>::get("__mock/stats"))
        .await
        .unwrap();
    assert_eq!(stats["refreshCount"], 1);

    // Step 3: sign out; the store is empty and the session is gone.
    client.sign_out().await.unwrap();
    assert!(client.store().pair().unwrap().is_none());
    let err = client.users().me().await.unwrap_err();
    assert_eq!(err.message, SESSION_EXPIRED_MESSAGE);
    assert_eq!(err.status, 401);
}

#[tokio::test]
async fn booking_lifecycle() {
    let base = start_server().await;
    let client = AuthedClient::new(
        ApiClient::new(ApiConfig::new(&base)),
        Arc::new(MemoryTokenStore::new()),
    );
    client.sign_in(&demo_credentials()).await.unwrap();

    let created = client
        .bookings()
        .create(&NewBooking {
            vendor_id: "v-100".into(),
            contract_id: "c-1".into(),
            quote_id: "q-1".into(),
            package_id: None,
            event_type: "wedding".into(),
            event_date: "2025-02-14".into(),
            event_time: None,
            venue: None,
            guest_count: Some(120),
            total_amount: 120_000.0,
            deposit_amount: 30_000.0,
            special_requests: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status, "PENDING");
    assert_eq!(created.vendor_id.as_deref(), Some("v-100"));

    let mine = client.bookings().list_mine(Vec::<(&str, &str)>::new()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, created.id);

    let fetched = client.bookings().get(&created.id).await.unwrap();
    assert_eq!(fetched.total, Some(120_000.0));

    let cancelled = client
        .bookings()
        .cancel(&created.id, Some("Date moved"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, "CANCELLED");

    let err = client.bookings().get("00000000-0000-0000-0000-000000000000").await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.code.as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn vendor_catalogue() {
    let base = start_server().await;
    let client = ApiClient::new(ApiConfig::new(&base));

    let page = client
        .vendors()
        .search(&VendorQuery {
            category: Some("decoration".into()),
            ..VendorQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    let vendor = &page.items[0];
    assert_eq!(vendor.name, "Lanna Blooms");
    assert_eq!(vendor.rating, Some(4.7));
    assert_eq!(vendor.availability.as_ref().and_then(|a| a.lead_time_days), Some(30));
    let pagination = page.pagination.unwrap();
    assert_eq!(pagination.total, Some(1));
    assert_eq!(pagination.has_next, Some(false));

    // Slug first, then id, then the static catalogue.
    let by_slug = client.vendors().by_id_or_slug("lanna-blooms").await.unwrap();
    assert_eq!(by_slug.summary.id, "v-100");
    let by_id = client.vendors().by_id_or_slug("v-200").await.unwrap();
    assert_eq!(by_id.summary.name, "Riverside Strings");
    let fallback = client.vendors().by_id_or_slug("missing").await.unwrap();
    assert_eq!(fallback.summary.id, "vendor_maison_lanna");

    let reviews = client.vendors().reviews("v-100").await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 5.0);

    let availability = client
        .vendors()
        .availability("v-100", Some("2025-02-14"))
        .await
        .unwrap();
    assert!(availability.available);
    assert_eq!(availability.date, "2025-02-14");
}

#[tokio::test]
async fn media_upload_round_trip() {
    let base = start_server().await;
    let client = ApiClient::new(ApiConfig::new(&base));
    let form = MultipartForm::new()
        .text("eventId", "e-1")
        .file("file", "altar.png", Some("image/png"), vec![0x89, 0x50, 0x4e, 0x47]);

    // The builder leaves Content-Type to the transport.
    let built = ApiRequest::<Value>::post("media/upload")
        .multipart(form.clone())
        .build(client.config())
        .unwrap();
    assert!(built.header("content-type").is_none());

    let item = client.media().upload(form).await.unwrap();
    assert_eq!(item.filename.as_deref(), Some("altar.png"));
    assert_eq!(item.media_type.as_deref(), Some("image/png"));
    let metadata = item.metadata.unwrap();
    assert_eq!(metadata["fields"]["eventId"], "e-1");
    assert_eq!(metadata["size"], 4);
    let sent_type = metadata["contentType"].as_str().unwrap();
    assert!(sent_type.starts_with("multipart/form-data; boundary="), "{sent_type}");

    let fetched = client.media().get(&item.id).await.unwrap();
    assert_eq!(fetched.url, item.url);
    assert_eq!(client.media().delete(&item.id).await.unwrap(), Some(true));
    let err = client.media().get(&item.id).await.unwrap_err();
    assert_eq!(err.status, 404);
}

#[tokio::test]
async fn unreachable_server_uses_fallbacks_or_fails_as_transport() {
    // Bind and drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = ApiClient::new(ApiConfig::new(&format!("http://{addr}")));

    let page = client.vendors().search(&VendorQuery::default()).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(page.pagination.is_none());

    let availability = client.vendors().availability("v-1", Some("2025-03-01")).await.unwrap();
    assert!(!availability.available);
    assert_eq!(availability.date, "2025-03-01");

    let err = client.auth().login(&demo_credentials()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(err.status, 0);
}
