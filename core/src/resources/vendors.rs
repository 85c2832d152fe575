//! Public vendor catalogue.
//!
//! The backend returns vendors in its own shape (`businessName`,
//! `averageRating`, `totalReviews`, ...). The selectors here reshape those
//! records into `VendorSummary` before decoding, and every call degrades to
//! static data when the catalogue is unreachable.

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::{Pagination, SuccessEnvelope};
use crate::error::ApiError;
use crate::fallbacks;
use crate::request::ApiRequest;
use crate::routes;
use crate::transport::Transport;
use crate::types::{
    VendorAvailability, VendorAvailabilityHint, VendorDetail, VendorPage, VendorReview,
    VendorSummary,
};

const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VendorSort {
    #[default]
    Recommended,
    PriceAsc,
    PriceDesc,
    RatingDesc,
}

/// Catalogue search filters. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct VendorQuery {
    pub keyword: Option<String>,
    pub zone: Option<String>,
    pub category: Option<String>,
    pub rating_min: Option<f64>,
    pub verified: Option<bool>,
    pub sort: VendorSort,
    /// 1-based; zero or unset means the first page.
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub tags: Vec<String>,
}

impl VendorQuery {
    fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    fn limit(&self) -> u32 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

pub struct VendorsApi<'a, X> {
    client: &'a ApiClient<X>,
}

impl<X: Transport> ApiClient<X> {
    pub fn vendors(&self) -> VendorsApi<'_, X> {
        VendorsApi { client: self }
    }
}

impl<X: Transport + 'static> VendorsApi<'_, X> {
    /// Search the catalogue. Falls back to the static catalogue on any
    /// failure.
    pub async fn search(&self, query: &VendorQuery) -> Result<VendorPage, ApiError> {
        let page = query.page();
        let limit = query.limit();
        let sort_by = match query.sort {
            VendorSort::RatingDesc => "rating",
            _ => "newest",
        };

        let request = ApiRequest::get(routes::vendors::SEARCH)
            .query("category", non_empty(&query.category))
            .query("zone", non_empty(&query.zone))
            .query("verified", query.verified)
            .query("minRating", query.rating_min.filter(|r| *r > 0.0))
            .query("search", non_empty(&query.keyword))
            .query("limit", limit)
            .query("offset", u64::from(page - 1) * u64::from(limit))
            .query("sortBy", sort_by)
            .query("tags", query.tags.clone())
            .select(move |envelope| Some(reshape_search(envelope, page, limit)))
            .fallback(|_| fallbacks::vendor_page());
        self.client.fetch(request).await
    }

    /// Look a vendor up by slug, then by id, then in the static catalogue.
    pub async fn by_id_or_slug(&self, id_or_slug: &str) -> Result<VendorDetail, ApiError> {
        let client = self.client.clone();
        let key = id_or_slug.to_string();
        let request = ApiRequest::<VendorDetail>::get(routes::vendors::by_slug(id_or_slug))
            .select(select_detail)
            .fallback_async(move |err| {
                let client = client.clone();
                let key = key.clone();
                async move {
                    debug!(vendor = %key, error = %err, "slug lookup failed, trying id");
                    let by_id =
                        ApiRequest::<VendorDetail>::get(routes::vendors::by_id(&key)).select(select_detail);
                    match client.fetch(by_id).await {
                        Ok(vendor) => Ok(vendor),
                        Err(err) => {
                            debug!(vendor = %key, error = %err, "id lookup failed, using static entry");
                            Ok(fallbacks::vendor_detail(&key))
                        }
                    }
                }
            });
        self.client.fetch(request).await
    }

    /// Availability for `date` (or the vendor's default day). Reports the
    /// vendor as unavailable when the lookup fails.
    pub async fn availability(
        &self,
        id: &str,
        date: Option<&str>,
    ) -> Result<VendorAvailability, ApiError> {
        let fallback_date = date
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Utc::now().date_naive().to_string());
        let request = ApiRequest::get(routes::vendors::availability(id))
            .query("date", date)
            .fallback(move |_| VendorAvailability {
                date: fallback_date.clone(),
                available: false,
                slots: None,
                alternative_dates: None,
            });
        self.client.fetch(request).await
    }

    /// Reviews for a vendor; empty when the lookup fails.
    pub async fn reviews(&self, id: &str) -> Result<Vec<VendorReview>, ApiError> {
        let request = ApiRequest::get(routes::vendors::reviews(id)).fallback(|_| Vec::new());
        self.client.fetch(request).await
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// `{vendors, total}` into `{items, pagination}`.
fn reshape_search(envelope: &SuccessEnvelope, page: u32, limit: u32) -> Value {
    let items: Vec<VendorSummary> = envelope
        .data
        .get("vendors")
        .and_then(Value::as_array)
        .map(|vendors| vendors.iter().map(map_vendor).collect())
        .unwrap_or_default();
    let total = envelope.data.get("total").and_then(Value::as_u64).unwrap_or(0);
    let total_pages = total.div_ceil(u64::from(limit)).max(1);

    let page_info = VendorPage {
        items,
        pagination: Some(Pagination {
            page: Some(u64::from(page)),
            limit: Some(u64::from(limit)),
            total: Some(total),
            total_pages: Some(total_pages),
            has_next: Some(u64::from(page) < total_pages),
            has_prev: Some(page > 1),
        }),
    };
    serde_json::to_value(page_info).unwrap_or(Value::Null)
}

/// `data.vendor` mapped to a detail; absent means "use `data` as is".
fn select_detail(envelope: &SuccessEnvelope) -> Option<Value> {
    let vendor = envelope.data.get("vendor")?;
    let detail = VendorDetail {
        summary: map_vendor(vendor),
        long_description: string_field(vendor, "longDescription"),
        address: string_field(vendor, "address"),
        location: vendor
            .get("location")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        contact: vendor
            .get("contact")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        packages: vendor
            .get("packages")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        featured_in: vendor
            .get("featuredIn")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    };
    serde_json::to_value(detail).ok()
}

fn map_vendor(vendor: &Value) -> VendorSummary {
    VendorSummary {
        id: vendor.get("id").map(stringify).unwrap_or_default(),
        name: string_field(vendor, "businessName")
            .or_else(|| string_field(vendor, "name"))
            .unwrap_or_default(),
        slug: string_field(vendor, "slug").unwrap_or_default(),
        logo: string_field(vendor, "logo"),
        cover_image: string_field(vendor, "coverImage"),
        description: string_field(vendor, "description"),
        category: string_field(vendor, "category").unwrap_or_else(|| "unknown".into()),
        zone: string_field(vendor, "zone").unwrap_or_else(|| "unknown".into()),
        rating: number_field(vendor, "averageRating"),
        review_count: number_field(vendor, "totalReviews").map(|n| n as u32),
        verified: vendor.get("verified").and_then(Value::as_bool),
        starting_price: None,
        tags: Vec::new(),
        availability: number_field(vendor, "minAdvanceBooking")
            .filter(|days| *days > 0.0)
            .map(|days| VendorAvailabilityHint {
                status: "unknown".into(),
                lead_time_days: Some(days as u32),
            }),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numbers, or numeric strings such as `"4.5"`.
fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::config::ApiConfig;
    use crate::http::{HttpRequest, HttpResponse};

    /// Answers every search with an empty catalogue and keeps the URLs.
    #[derive(Default)]
    struct EmptyCatalogue {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for EmptyCatalogue {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.urls.lock().unwrap().push(request.url);
            Ok(HttpResponse {
                status: 200,
                status_text: String::new(),
                headers: Vec::new(),
                body: json!({"success": true, "data": {"vendors": [], "total": 0}}).to_string(),
            })
        }
    }

    fn envelope(data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            data,
            pagination: None,
            meta: None,
        }
    }

    #[test]
    fn backend_vendor_is_mapped() {
        let vendor = map_vendor(&json!({
            "id": 42,
            "businessName": "Siam Symphony",
            "slug": "siam-symphony",
            "averageRating": "4.8",
            "totalReviews": 12,
            "verified": true,
            "minAdvanceBooking": 30
        }));
        assert_eq!(vendor.id, "42");
        assert_eq!(vendor.name, "Siam Symphony");
        assert_eq!(vendor.category, "unknown");
        assert_eq!(vendor.rating, Some(4.8));
        assert_eq!(vendor.review_count, Some(12));
        assert_eq!(vendor.availability.and_then(|a| a.lead_time_days), Some(30));
    }

    #[test]
    fn search_payload_gets_pagination() {
        let data = json!({ "vendors": [{ "id": "v1", "name": "A", "slug": "a" }], "total": 45 });
        let page: VendorPage =
            serde_json::from_value(reshape_search(&envelope(data), 2, 20)).unwrap();
        assert_eq!(page.items.len(), 1);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.total_pages, Some(3));
        assert_eq!(pagination.has_next, Some(true));
        assert_eq!(pagination.has_prev, Some(true));
    }

    #[test]
    fn empty_search_still_has_one_page() {
        let page: VendorPage =
            serde_json::from_value(reshape_search(&envelope(json!({})), 1, 20)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.and_then(|p| p.total_pages), Some(1));
    }

    #[test]
    fn detail_selector_needs_a_vendor_key() {
        assert!(select_detail(&envelope(json!({ "id": "v1" }))).is_none());
        let selected = select_detail(&envelope(json!({
            "vendor": { "id": "v1", "name": "A", "slug": "a", "address": "Bangkok" }
        })))
        .unwrap();
        assert_eq!(selected["address"], "Bangkok");
    }

    #[test]
    fn query_defaults() {
        let query = VendorQuery {
            page: Some(0),
            ..VendorQuery::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn huge_page_number_is_sent_as_a_wide_offset() {
        let client =
            ApiClient::with_transport(ApiConfig::new("http://localhost:3000"), EmptyCatalogue::default());
        let page = client
            .vendors()
            .search(&VendorQuery {
                page: Some(u32::MAX),
                limit: Some(100),
                ..VendorQuery::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.and_then(|p| p.has_prev), Some(true));

        let urls = client.transport().urls.lock().unwrap();
        let expected = format!("offset={}", u64::from(u32::MAX - 1) * 100);
        assert!(urls[0].contains(&expected), "{}", urls[0]);
    }

    #[test]
    fn last_possible_page_does_not_overflow() {
        let data = json!({ "vendors": [], "total": 10 });
        let page: VendorPage =
            serde_json::from_value(reshape_search(&envelope(data), u32::MAX, 100)).unwrap();
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.page, Some(u64::from(u32::MAX)));
        assert_eq!(pagination.has_next, Some(false));
    }
}
