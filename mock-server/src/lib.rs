//! In-memory stand-in for the phithiai backend.
//!
//! Serves the subset of the API the client is tested against, under `/api`,
//! speaking the `{success, data | error}` envelope. Sessions are opaque
//! random tokens; refresh rotates both tokens. Two control endpoints under
//! `/api/__mock` let tests expire access tokens and count refreshes.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "couple@phithiai.test";
pub const DEMO_PASSWORD: &str = "lotus-2024";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: String,
    pub status: String,
    pub event_type: String,
    pub event_date: String,
    pub total: f64,
    pub deposit_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Vendor as the backend stores it, not as the client presents it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub business_name: String,
    pub slug: String,
    pub category: String,
    pub zone: String,
    pub average_rating: String,
    pub total_reviews: u32,
    pub verified: bool,
    pub min_advance_booking: u32,
}

/// Stored upload. `metadata` echoes the text fields, the byte count and
/// the request's own `Content-Type`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub metadata: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub vendor_id: String,
    pub event_type: String,
    pub event_date: String,
    pub total_amount: f64,
    pub deposit_amount: f64,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Default)]
pub struct Db {
    pub users: HashMap<Uuid, User>,
    pub access_tokens: HashMap<String, Uuid>,
    pub refresh_tokens: HashMap<String, Uuid>,
    pub bookings: HashMap<Uuid, Booking>,
    pub vendors: Vec<Vendor>,
    pub media: HashMap<String, MediaItem>,
    pub refresh_count: u64,
}

pub type AppState = Arc<RwLock<Db>>;

/// Error envelope with an HTTP status.
#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl MockError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid or expired token")
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{what} not found"))
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": { "code": self.code, "message": self.message },
        });
        (self.status, Json(body)).into_response()
    }
}

fn envelope<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn seed() -> Db {
    let mut db = Db::default();
    let demo = User {
        id: Uuid::new_v4(),
        email: DEMO_EMAIL.to_string(),
        first_name: Some("Ploy".to_string()),
        last_name: None,
        phone: None,
        role: "BUYER".to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    db.users.insert(demo.id, demo);
    db.vendors = vec![
        Vendor {
            id: "v-100".to_string(),
            business_name: "Lanna Blooms".to_string(),
            slug: "lanna-blooms".to_string(),
            category: "decoration".to_string(),
            zone: "chiang-mai".to_string(),
            average_rating: "4.7".to_string(),
            total_reviews: 21,
            verified: true,
            min_advance_booking: 30,
        },
        Vendor {
            id: "v-200".to_string(),
            business_name: "Riverside Strings".to_string(),
            slug: "riverside-strings".to_string(),
            category: "entertainment".to_string(),
            zone: "bangkok".to_string(),
            average_rating: "4.9".to_string(),
            total_reviews: 54,
            verified: false,
            min_advance_booking: 0,
        },
    ];
    db
}

pub fn app() -> Router {
    let state: AppState = Arc::new(RwLock::new(seed()));
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/users/me", get(me).patch(update_me))
        .route("/bookings", post(create_booking))
        .route("/bookings/me", get(my_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route("/vendors/search", get(search_vendors))
        .route("/vendors/slug/{slug}", get(vendor_by_slug))
        .route("/vendors/{id}", get(vendor_by_id))
        .route("/vendors/{id}/reviews", get(vendor_reviews))
        .route("/vendors/{id}/availability", get(vendor_availability))
        .route("/media/upload", post(upload_media))
        .route("/media/{id}", get(get_media).delete(delete_media))
        .route("/__mock/expire-access", post(expire_access))
        .route("/__mock/stats", get(stats));
    Router::new().nest("/api", api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn issue_session(db: &mut Db, user_id: Uuid) -> (String, String) {
    let access = format!("at_{}", Uuid::new_v4().simple());
    let refresh = format!("rt_{}", Uuid::new_v4().simple());
    db.access_tokens.insert(access.clone(), user_id);
    db.refresh_tokens.insert(refresh.clone(), user_id);
    (access, refresh)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(db: &Db, headers: &HeaderMap) -> Result<Uuid, MockError> {
    let token = bearer(headers).ok_or_else(MockError::unauthorized)?;
    db.access_tokens
        .get(token)
        .copied()
        .ok_or_else(MockError::unauthorized)
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<Registration>,
) -> Result<Response, MockError> {
    let mut db = state.write().await;
    if db.users.values().any(|u| u.email == input.email) {
        return Err(MockError::new(
            StatusCode::CONFLICT,
            "EMAIL_TAKEN",
            "Email is already registered",
        ));
    }
    let user = User {
        id: Uuid::new_v4(),
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        phone: None,
        role: input.role.unwrap_or_else(|| "BUYER".to_string()),
        password: input.password,
    };
    db.users.insert(user.id, user.clone());
    let (access, refresh) = issue_session(&mut db, user.id);
    Ok(envelope(
        StatusCode::CREATED,
        json!({ "user": user, "accessToken": access, "refreshToken": refresh }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<Response, MockError> {
    let mut db = state.write().await;
    let user = db
        .users
        .values()
        .find(|u| u.email == input.email && u.password == input.password)
        .cloned()
        .ok_or_else(|| {
            MockError::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            )
        })?;
    let (access, refresh) = issue_session(&mut db, user.id);
    Ok(envelope(
        StatusCode::OK,
        json!({ "user": user, "accessToken": access, "refreshToken": refresh }),
    ))
}

/// Rotates the pair: the presented refresh token is spent.
async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> Result<Response, MockError> {
    let mut db = state.write().await;
    db.refresh_count += 1;
    let user_id = db
        .refresh_tokens
        .remove(&input.refresh_token)
        .ok_or_else(MockError::unauthorized)?;
    let (access, refresh) = issue_session(&mut db, user_id);
    tracing::info!(%user_id, "session refreshed");
    Ok(envelope(
        StatusCode::OK,
        json!({ "accessToken": access, "refreshToken": refresh }),
    ))
}

async fn logout(State(state): State<AppState>, Json(input): Json<RefreshRequest>) -> Response {
    state.write().await.refresh_tokens.remove(&input.refresh_token);
    envelope(StatusCode::OK, json!({ "message": "Logged out" }))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, MockError> {
    let db = state.read().await;
    let user_id = authenticate(&db, &headers)?;
    let user = db.users.get(&user_id).ok_or_else(|| MockError::not_found("user"))?;
    Ok(envelope(StatusCode::OK, json!({ "user": user })))
}

async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> Result<Response, MockError> {
    let mut db = state.write().await;
    let user_id = authenticate(&db, &headers)?;
    let user = db
        .users
        .get_mut(&user_id)
        .ok_or_else(|| MockError::not_found("user"))?;
    if let Some(first_name) = input.first_name {
        user.first_name = Some(first_name);
    }
    if let Some(last_name) = input.last_name {
        user.last_name = Some(last_name);
    }
    if let Some(phone) = input.phone {
        user.phone = Some(phone);
    }
    Ok(envelope(StatusCode::OK, json!({ "user": user })))
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewBooking>,
) -> Result<Response, MockError> {
    let mut db = state.write().await;
    let user_id = authenticate(&db, &headers)?;
    let booking = Booking {
        id: Uuid::new_v4(),
        user_id,
        vendor_id: input.vendor_id,
        status: "PENDING".to_string(),
        event_type: input.event_type,
        event_date: input.event_date,
        total: input.total_amount,
        deposit_amount: input.deposit_amount,
        cancellation_reason: None,
    };
    db.bookings.insert(booking.id, booking.clone());
    Ok(envelope(StatusCode::CREATED, json!({ "booking": booking })))
}

async fn my_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, MockError> {
    let db = state.read().await;
    let user_id = authenticate(&db, &headers)?;
    let bookings: Vec<&Booking> = db.bookings.values().filter(|b| b.user_id == user_id).collect();
    Ok(envelope(StatusCode::OK, json!({ "bookings": bookings })))
}

async fn get_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, MockError> {
    let db = state.read().await;
    let user_id = authenticate(&db, &headers)?;
    let booking = db
        .bookings
        .get(&id)
        .filter(|b| b.user_id == user_id)
        .ok_or_else(|| MockError::not_found("booking"))?;
    Ok(envelope(StatusCode::OK, json!({ "booking": booking })))
}

async fn cancel_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, MockError> {
    let reason = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<CancelRequest>(&body)
            .map_err(|e| MockError::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", e.to_string()))?
            .reason
    };
    let mut db = state.write().await;
    let user_id = authenticate(&db, &headers)?;
    let booking = db
        .bookings
        .get_mut(&id)
        .filter(|b| b.user_id == user_id)
        .ok_or_else(|| MockError::not_found("booking"))?;
    booking.status = "CANCELLED".to_string();
    booking.cancellation_reason = reason;
    Ok(envelope(StatusCode::OK, json!({ "booking": booking })))
}

async fn search_vendors(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let db = state.read().await;
    let term = params.get("search").map(|s| s.to_lowercase());
    let matches: Vec<&Vendor> = db
        .vendors
        .iter()
        .filter(|v| params.get("category").map_or(true, |c| &v.category == c))
        .filter(|v| params.get("zone").map_or(true, |z| &v.zone == z))
        .filter(|v| {
            term.as_ref()
                .map_or(true, |t| v.business_name.to_lowercase().contains(t))
        })
        .collect();
    let offset: usize = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let page: Vec<&Vendor> = matches.iter().skip(offset).take(limit).copied().collect();
    envelope(
        StatusCode::OK,
        json!({ "vendors": page, "total": matches.len() }),
    )
}

async fn vendor_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, MockError> {
    let db = state.read().await;
    let vendor = db
        .vendors
        .iter()
        .find(|v| v.slug == slug)
        .ok_or_else(|| MockError::not_found("vendor"))?;
    Ok(envelope(StatusCode::OK, json!({ "vendor": vendor })))
}

async fn vendor_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, MockError> {
    let db = state.read().await;
    let vendor = db
        .vendors
        .iter()
        .find(|v| v.id == id)
        .ok_or_else(|| MockError::not_found("vendor"))?;
    Ok(envelope(StatusCode::OK, json!({ "vendor": vendor })))
}

/// Deliberately not enveloped: the client must accept bare payloads.
async fn vendor_reviews(Path(id): Path<String>) -> Json<Value> {
    Json(json!([
        {
            "id": format!("{id}-r1"),
            "rating": 5,
            "comment": "Everything arrived on time.",
            "createdAt": "2024-11-02T09:00:00Z",
            "user": { "name": "Nok" }
        }
    ]))
}

async fn vendor_availability(
    Path(_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let date = params
        .get("date")
        .cloned()
        .unwrap_or_else(|| "2025-01-01".to_string());
    envelope(
        StatusCode::OK,
        json!({
            "date": date,
            "available": true,
            "slots": [{ "time": "09:00", "available": true }]
        }),
    )
}

fn bad_request(message: impl Into<String>) -> MockError {
    MockError::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
}

/// Needs one file part; every text part lands in `metadata.fields`.
async fn upload_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, MockError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut fields = serde_json::Map::new();
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let mime = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                file = Some((file_name, mime, bytes.len()));
            }
            None => {
                let text = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                fields.insert(name, Value::String(text));
            }
        }
    }
    let (file_name, mime, size) = file.ok_or_else(|| bad_request("file part is required"))?;

    let id = format!("m-{}", Uuid::new_v4().simple());
    let item = MediaItem {
        url: format!("https://cdn.phithiai.test/{id}/{file_name}"),
        id: id.clone(),
        filename: Some(file_name),
        media_type: mime,
        metadata: json!({ "fields": fields, "size": size, "contentType": content_type }),
    };
    state.write().await.media.insert(id, item.clone());
    Ok(envelope(StatusCode::CREATED, item))
}

async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, MockError> {
    let db = state.read().await;
    let item = db.media.get(&id).ok_or_else(|| MockError::not_found("media"))?;
    Ok(envelope(StatusCode::OK, item))
}

async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, MockError> {
    state
        .write()
        .await
        .media
        .remove(&id)
        .ok_or_else(|| MockError::not_found("media"))?;
    Ok(envelope(StatusCode::OK, json!({ "success": true })))
}

/// Invalidates every access token; refresh tokens stay valid.
async fn expire_access(State(state): State<AppState>) -> StatusCode {
    state.write().await.access_tokens.clear();
    StatusCode::NO_CONTENT
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    let db = state.read().await;
    Json(json!({ "refreshCount": db.refresh_count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_password_is_never_serialized() {
        let db = seed();
        let user = db.users.values().next().unwrap();
        let json = serde_json::to_value(user).unwrap();
        assert_eq!(json["email"], DEMO_EMAIL);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn vendor_uses_backend_field_names() {
        let db = seed();
        let json = serde_json::to_value(&db.vendors[0]).unwrap();
        assert_eq!(json["businessName"], "Lanna Blooms");
        assert_eq!(json["averageRating"], "4.7");
    }

    #[test]
    fn bearer_requires_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer(&headers), Some("abc"));
    }

    #[test]
    fn issued_tokens_are_distinct() {
        let mut db = Db::default();
        let user = Uuid::new_v4();
        let (access, refresh) = issue_session(&mut db, user);
        assert_ne!(access, refresh);
        assert_eq!(db.access_tokens.get(&access), Some(&user));
        assert_eq!(db.refresh_tokens.get(&refresh), Some(&user));
    }

    #[test]
    fn error_envelope_shape() {
        let err = MockError::not_found("vendor");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "vendor not found");
    }
}
