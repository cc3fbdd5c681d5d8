use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::{ok, ApiQuery, Envelope, Pagination, ProductResponse};
use crate::error::ApiError;
use crate::store::{self, ingredients::IngredientRow};
use crate::validation::{parse_id, IngredientSort, ListParams, RawListParams};

const AFFECTED_PRODUCTS_LIMIT: u64 = 20;
const PUBCHEM_COMPOUND_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/compound";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub alternative_names: Option<String>,
    pub health_risk: Option<String>,
    pub regulatory_status: Option<String>,
    pub source_url: Option<String>,
    pub ewg_rating: Option<i32>,
    pub pubchem_id: Option<String>,
    pub pubchem_url: Option<String>,
    pub occurrence_count: i32,
    pub first_appearance: Option<NaiveDate>,
    pub last_appearance: Option<NaiveDate>,
    pub risk_score: Option<f64>,
}

impl From<IngredientRow> for IngredientResponse {
    fn from(row: IngredientRow) -> Self {
        // Older imports stored only the compound id.
        let pubchem_url = row.pubchem_url.or_else(|| {
            row.pubchem_id
                .as_ref()
                .map(|id| format!("{PUBCHEM_COMPOUND_URL}/{id}"))
        });

        Self {
            id: row.id,
            name: row.name,
            alternative_names: row.alternative_names,
            health_risk: row.health_risk,
            regulatory_status: row.regulatory_status,
            source_url: row.source_url,
            ewg_rating: row.ewg_rating,
            pubchem_id: row.pubchem_id,
            pubchem_url,
            occurrence_count: row.occurrence_count.unwrap_or(0),
            first_appearance: row.first_appearance,
            last_appearance: row.last_appearance,
            risk_score: row.risk_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientListResponse {
    pub ingredients: Vec<IngredientResponse>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDetailResponse {
    pub ingredient: IngredientResponse,
    pub affected_products: Vec<ProductResponse>,
}

// GET /api/ingredients
pub async fn list_ingredients(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(raw): ApiQuery<RawListParams>,
) -> Result<Json<Envelope<IngredientListResponse>>, ApiError> {
    let params = ListParams::<IngredientSort>::parse(&raw)?;
    let page = store::ingredients::list(&db, &params).await?;

    Ok(ok(IngredientListResponse {
        pagination: Pagination::new(params.limit, params.offset, page.total),
        total: page.total,
        ingredients: page.items.into_iter().map(IngredientResponse::from).collect(),
    }))
}

// GET /api/ingredients/:id
pub async fn get_ingredient(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<IngredientDetailResponse>>, ApiError> {
    let id = parse_id(&id, "ingredient")?;

    let ingredient = store::ingredients::find(&db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    let affected_products =
        store::products::containing_ingredient(&db, id, AFFECTED_PRODUCTS_LIMIT).await?;

    Ok(ok(IngredientDetailResponse {
        ingredient: ingredient.into(),
        affected_products: affected_products
            .into_iter()
            .map(ProductResponse::from)
            .collect(),
    }))
}
