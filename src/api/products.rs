use axum::{
    extract::Extension,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::{ok, ApiQuery, Envelope, Pagination, ProductResponse};
use crate::error::ApiError;
use crate::risk::RiskLevel;
use crate::store::{self, products::Alternative};
use crate::validation::{
    AlternativesParams, RawAlternativesParams, RawSearchParams, SearchParams,
};

/// Alternatives attached to a search that surfaced a cancelled product.
const SEARCH_ALTERNATIVES_LIMIT: u64 = 5;
/// Recency score reported for alternatives that have no stored scores.
const PLACEHOLDER_RECENCY_SCORE: f64 = 0.5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub brand_score: Option<f64>,
    pub category_risk_score: Option<f64>,
    pub vertical_integration: bool,
    pub recency_score: f64,
    pub relevance_score: Option<f64>,
}

impl From<Alternative> for AlternativeResponse {
    fn from(alternative: Alternative) -> Self {
        let product = ProductResponse::from(alternative.product);
        match alternative.scores {
            Some(scores) => Self {
                product,
                brand_score: Some(scores.brand_score),
                category_risk_score: Some(scores.category_risk_score),
                vertical_integration: scores.vertical_integration,
                recency_score: scores.recency_score,
                relevance_score: Some(scores.relevance_score),
            },
            None => Self {
                product,
                brand_score: None,
                category_risk_score: None,
                vertical_integration: false,
                recency_score: PLACEHOLDER_RECENCY_SCORE,
                relevance_score: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<AlternativeResponse>>,
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub alternatives: Vec<AlternativeResponse>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// GET /api/products/search
pub async fn search(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(raw): ApiQuery<RawSearchParams>,
) -> Result<Json<Envelope<SearchResponse>>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let params = SearchParams::parse(&raw, today)?;

    let page = store::products::search(&db, &params).await?;
    crate::metrics::record_search(page.items.len());

    let first_cancelled = page
        .items
        .iter()
        .find(|row| RiskLevel::from_status(&row.status) == RiskLevel::Unsafe)
        .map(|row| row.id);

    let alternatives = match first_cancelled {
        Some(id) => {
            let found =
                store::products::find_alternatives(&db, Some(id), SEARCH_ALTERNATIVES_LIMIT)
                    .await?;
            Some(found.into_iter().map(AlternativeResponse::from).collect())
        }
        None => None,
    };

    tracing::info!(
        query = %params.query,
        results = page.items.len(),
        total = page.total,
        "product search"
    );

    Ok(ok(SearchResponse {
        pagination: Pagination::new(params.limit, params.offset, page.total),
        total: page.total,
        products: page.items.into_iter().map(ProductResponse::from).collect(),
        alternatives,
    }))
}

// GET /api/products/alternatives
pub async fn alternatives(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(raw): ApiQuery<RawAlternativesParams>,
) -> Result<Json<Envelope<AlternativesResponse>>, ApiError> {
    let params = AlternativesParams::parse(&raw)?;

    let alternatives: Vec<AlternativeResponse> =
        store::products::find_alternatives(&db, params.exclude_id, params.limit)
            .await?
            .into_iter()
            .map(AlternativeResponse::from)
            .collect();

    let message = alternatives
        .is_empty()
        .then(|| "No safer alternatives found".to_string());

    Ok(ok(AlternativesResponse {
        total: alternatives.len(),
        alternatives,
        message,
    }))
}
