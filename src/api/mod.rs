pub mod companies;
pub mod health;
pub mod ingredients;
pub mod middleware;
pub mod products;

use std::time::Instant;

use axum::{
    extract::FromRequestParts, middleware::from_fn_with_state, routing::get, Extension, Json,
    Router,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::ApiError;
use crate::rate_limit::RateLimits;
use crate::risk::RiskLevel;
use crate::store::products::ProductRow;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// `Query` whose rejection renders as a validation error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(limit: u64, offset: u64, total: u64) -> Self {
        Self {
            limit,
            offset,
            has_more: offset + limit < total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub notification_number: String,
    pub name: String,
    pub category: Option<String>,
    pub status: String,
    pub risk_level: RiskLevel,
    pub cancellation_reason: Option<String>,
    pub date_notified: Option<NaiveDate>,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            risk_level: RiskLevel::from_status(&row.status),
            id: row.id,
            notification_number: row.notification_number,
            name: row.name,
            category: row.category,
            status: row.status,
            cancellation_reason: row.cancellation_reason,
            date_notified: row.date_notified,
            company_id: row.company_id,
            company_name: row.company_name,
        }
    }
}

/// Static facts about the running service, reported by the health check.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub version: &'static str,
    pub environment: String,
    pub started_at: Instant,
}

impl ServiceInfo {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }
}

/// API routes with per-group rate limiting. Transport layers (tracing, CORS,
/// metrics) are added by the server binary.
pub fn router(db: DatabaseConnection, limits: RateLimits, info: ServiceInfo) -> Router {
    let product_routes = Router::new()
        .route("/api/products/search", get(products::search))
        .route("/api/products/alternatives", get(products::alternatives))
        .route_layer(from_fn_with_state(limits.products, middleware::rate_limit));

    let company_routes = Router::new()
        .route("/api/companies", get(companies::list_companies))
        .route("/api/companies/:id", get(companies::get_company))
        .route_layer(from_fn_with_state(limits.companies, middleware::rate_limit));

    let ingredient_routes = Router::new()
        .route("/api/ingredients", get(ingredients::list_ingredients))
        .route("/api/ingredients/:id", get(ingredients::get_ingredient))
        .route_layer(from_fn_with_state(limits.ingredients, middleware::rate_limit));

    Router::new()
        .route("/api/health", get(health::health_check))
        .merge(product_routes)
        .merge(company_routes)
        .merge(ingredient_routes)
        .layer(Extension(db))
        .layer(Extension(info))
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use super::{router, ServiceInfo};
    use crate::rate_limit::{RateLimitPolicy, RateLimits};

    pub fn app(db: DatabaseConnection) -> Router {
        router(
            db,
            RateLimits::in_memory(RateLimitPolicy::default(), 1024),
            ServiceInfo::new("test"),
        )
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_more_compares_against_total() {
        assert!(Pagination::new(20, 0, 21).has_more);
        assert!(!Pagination::new(20, 0, 20).has_more);
        assert!(!Pagination::new(20, 40, 45).has_more);
        assert!(!Pagination::new(20, 100, 3).has_more);
    }

    #[test]
    fn test_product_response_derives_risk_level() {
        let row = ProductRow {
            id: 1,
            notification_number: "NOT000001".into(),
            name: "Glow Serum".into(),
            category: None,
            status: "cancelled".into(),
            cancellation_reason: Some("Contains mercury".into()),
            date_notified: None,
            company_id: None,
            company_name: None,
        };
        let json = serde_json::to_value(ProductResponse::from(row)).unwrap();
        assert_eq!(json["riskLevel"], "unsafe");
        assert_eq!(json["notificationNumber"], "NOT000001");
        assert_eq!(json["cancellationReason"], "Contains mercury");
    }
}
