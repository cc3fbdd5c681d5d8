use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::{ok, ApiQuery, Envelope, Pagination, ProductResponse};
use crate::error::ApiError;
use crate::store::{self, companies::CompanyRow};
use crate::validation::{parse_id, CompanySort, ListParams, RawListParams};

const RECENT_PRODUCTS_LIMIT: u64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub total_notifications: i32,
    pub cancelled_count: i32,
    pub first_notified: Option<NaiveDate>,
    pub reputation_score: Option<f64>,
}

impl From<CompanyRow> for CompanyResponse {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            total_notifications: row.total_notifications.unwrap_or(0),
            cancelled_count: row.cancelled_count.unwrap_or(0),
            first_notified: row.first_notified,
            reputation_score: row.reputation_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<CompanyResponse>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetailResponse {
    pub company: CompanyResponse,
    pub recent_products: Vec<ProductResponse>,
}

// GET /api/companies
pub async fn list_companies(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(raw): ApiQuery<RawListParams>,
) -> Result<Json<Envelope<CompanyListResponse>>, ApiError> {
    let params = ListParams::<CompanySort>::parse(&raw)?;
    let page = store::companies::list(&db, &params).await?;

    Ok(ok(CompanyListResponse {
        pagination: Pagination::new(params.limit, params.offset, page.total),
        total: page.total,
        companies: page.items.into_iter().map(CompanyResponse::from).collect(),
    }))
}

// GET /api/companies/:id
pub async fn get_company(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<CompanyDetailResponse>>, ApiError> {
    let id = parse_id(&id, "company")?;

    let company = store::companies::find(&db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let recent_products =
        store::products::recent_for_company(&db, id, RECENT_PRODUCTS_LIMIT).await?;

    Ok(ok(CompanyDetailResponse {
        company: company.into(),
        recent_products: recent_products.into_iter().map(ProductResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use crate::api::testing::{app, get};
    use crate::store::testing::{company_row, count_row, product_row, Row};

    #[tokio::test]
    async fn test_list_companies() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                company_row(7, "Acme Cosmetics"),
                company_row(9, "Bloom Labs"),
            ]])
            .append_query_results([vec![count_row(30)]])
            .into_connection();

        let (status, body) = get(
            app(db),
            "/api/companies?sortBy=reputationScore&sortOrder=desc&limit=2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["total"], 30);
        assert_eq!(data["companies"][1]["name"], "Bloom Labs");
        assert_eq!(data["companies"][0]["reputationScore"], 72.5);
        assert_eq!(data["companies"][0]["totalNotifications"], 12);
        assert_eq!(data["pagination"]["hasMore"], true);
    }

    #[tokio::test]
    async fn test_company_without_metrics_reports_zero_counts() {
        let row: Row = BTreeMap::from([
            ("id", 3i32.into()),
            ("name", "New Co".into()),
            ("total_notifications", Option::<i32>::None.into()),
            ("cancelled_count", Option::<i32>::None.into()),
            ("first_notified", Option::<chrono::NaiveDate>::None.into()),
            ("reputation_score", Value::Double(None)),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .append_query_results([vec![count_row(1)]])
            .into_connection();

        let (_, body) = get(app(db), "/api/companies?query=new").await;
        let company = &body["data"]["companies"][0];
        assert_eq!(company["totalNotifications"], 0);
        assert_eq!(company["cancelledCount"], 0);
        assert!(company["reputationScore"].is_null());
    }

    #[tokio::test]
    async fn test_get_company_with_recent_products() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![company_row(7, "Acme Cosmetics")]])
            .append_query_results([vec![
                product_row(11, "Velvet Lipstick", "cancelled"),
                product_row(10, "Silk Powder", "approved"),
            ]])
            .into_connection();

        let (status, body) = get(app(db), "/api/companies/7").await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["company"]["id"], 7);
        assert_eq!(data["recentProducts"].as_array().unwrap().len(), 2);
        assert_eq!(data["recentProducts"][0]["riskLevel"], "unsafe");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (status, body) = get(app(db), "/api/companies/acme").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid company ID");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Row>::new()])
            .into_connection();
        let (status, body) = get(app(db), "/api/companies/424242").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Company not found");
    }

    #[tokio::test]
    async fn test_repeated_query_key_gets_error_envelope() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (status, body) = get(app(db), "/api/companies?limit=1&limit=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("limit"));
        assert!(body["details"]["params"].is_string());
    }
}
