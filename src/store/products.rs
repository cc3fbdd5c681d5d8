use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::{name_contains, Page};
use crate::entities::{company, product, product_ingredient, recommended_alternative};
use crate::error::DataError;
use crate::risk::ProductStatus;
use crate::validation::SearchParams;

/// A product joined with its company name.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ProductRow {
    pub id: i32,
    pub notification_number: String,
    pub name: String,
    pub category: Option<String>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub date_notified: Option<NaiveDate>,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeScores {
    pub brand_score: f64,
    pub category_risk_score: f64,
    pub vertical_integration: bool,
    pub recency_score: f64,
    pub relevance_score: f64,
}

/// A safer product, with scores when it came from the recommendation table.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub product: ProductRow,
    pub scores: Option<AlternativeScores>,
}

#[derive(Debug, FromQueryResult)]
struct RecommendedRow {
    id: i32,
    notification_number: String,
    name: String,
    category: Option<String>,
    status: String,
    cancellation_reason: Option<String>,
    date_notified: Option<NaiveDate>,
    company_id: Option<i32>,
    company_name: Option<String>,
    brand_score: f64,
    category_risk_score: f64,
    vertical_integration: bool,
    recency_score: f64,
    relevance_score: f64,
}

impl From<RecommendedRow> for Alternative {
    fn from(row: RecommendedRow) -> Self {
        Self {
            product: ProductRow {
                id: row.id,
                notification_number: row.notification_number,
                name: row.name,
                category: row.category,
                status: row.status,
                cancellation_reason: row.cancellation_reason,
                date_notified: row.date_notified,
                company_id: row.company_id,
                company_name: row.company_name,
            },
            scores: Some(AlternativeScores {
                brand_score: row.brand_score,
                category_risk_score: row.category_risk_score,
                vertical_integration: row.vertical_integration,
                recency_score: row.recency_score,
                relevance_score: row.relevance_score,
            }),
        }
    }
}

fn select_products() -> Select<product::Entity> {
    product::Entity::find()
        .select_only()
        .columns([
            product::Column::Id,
            product::Column::NotificationNumber,
            product::Column::Name,
            product::Column::Category,
            product::Column::Status,
            product::Column::CancellationReason,
            product::Column::DateNotified,
            product::Column::CompanyId,
        ])
        .column_as(company::Column::Name, "company_name")
        .join(JoinType::LeftJoin, product::Relation::Company.def())
}

fn safe_statuses() -> [&'static str; 2] {
    ProductStatus::SAFE.map(ProductStatus::as_str)
}

fn search_condition(params: &SearchParams) -> Condition {
    let mut condition = Condition::all().add(name_contains(
        Expr::col((product::Entity, product::Column::Name)),
        &params.query,
    ));
    if let Some(status) = params.status {
        condition = condition.add(product::Column::Status.eq(status.as_str()));
    }
    if let Some(since) = params.since {
        condition = condition.add(product::Column::DateNotified.gte(since));
    }
    condition
}

fn search_select(params: &SearchParams) -> Select<product::Entity> {
    select_products()
        .filter(search_condition(params))
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id)
        .limit(params.limit)
        .offset(params.offset)
}

/// Name search ordered by name. Runs the page query, then the count.
pub async fn search(
    db: &DatabaseConnection,
    params: &SearchParams,
) -> Result<Page<ProductRow>, DataError> {
    let items = search_select(params)
        .into_model::<ProductRow>()
        .all(db)
        .await?;

    let total = product::Entity::find()
        .filter(search_condition(params))
        .count(db)
        .await?;

    Ok(Page { items, total })
}

/// Most recently notified products of one company.
pub async fn recent_for_company(
    db: &DatabaseConnection,
    company_id: i32,
    limit: u64,
) -> Result<Vec<ProductRow>, DataError> {
    let rows = select_products()
        .filter(product::Column::CompanyId.eq(company_id))
        .order_by_with_nulls(product::Column::DateNotified, Order::Desc, NullOrdering::Last)
        .order_by_desc(product::Column::Id)
        .limit(limit)
        .into_model::<ProductRow>()
        .all(db)
        .await?;
    Ok(rows)
}

/// Most recently notified products containing one banned ingredient.
pub async fn containing_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i32,
    limit: u64,
) -> Result<Vec<ProductRow>, DataError> {
    let rows = select_products()
        .join(JoinType::InnerJoin, product::Relation::ProductIngredient.def())
        .filter(product_ingredient::Column::IngredientId.eq(ingredient_id))
        .order_by_with_nulls(product::Column::DateNotified, Order::Desc, NullOrdering::Last)
        .order_by_desc(product::Column::Id)
        .limit(limit)
        .into_model::<ProductRow>()
        .all(db)
        .await?;
    Ok(rows)
}

async fn recommended_for(
    db: &DatabaseConnection,
    cancelled_product_id: i32,
    limit: u64,
) -> Result<Vec<Alternative>, DataError> {
    let rows = select_products()
        .column_as(recommended_alternative::Column::BrandScore, "brand_score")
        .column_as(
            recommended_alternative::Column::CategoryRiskScore,
            "category_risk_score",
        )
        .column_as(
            recommended_alternative::Column::VerticalIntegration,
            "vertical_integration",
        )
        .column_as(recommended_alternative::Column::RecencyScore, "recency_score")
        .column_as(recommended_alternative::Column::RelevanceScore, "relevance_score")
        .join(
            JoinType::InnerJoin,
            recommended_alternative::Relation::RecommendedProduct.def().rev(),
        )
        .filter(recommended_alternative::Column::CancelledProductId.eq(cancelled_product_id))
        .filter(product::Column::Status.is_in(safe_statuses()))
        .order_by_desc(recommended_alternative::Column::RelevanceScore)
        .order_by_asc(product::Column::Id)
        .limit(limit)
        .into_model::<RecommendedRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Alternative::from).collect())
}

fn fallback_select(exclude_id: Option<i32>, limit: u64) -> Select<product::Entity> {
    let mut query = select_products().filter(product::Column::Status.is_in(safe_statuses()));
    if let Some(id) = exclude_id {
        query = query.filter(product::Column::Id.ne(id));
    }
    query.order_by_asc(product::Column::Id).limit(limit)
}

/// Safer products to offer instead of `exclude_id`.
///
/// Scored recommendations for the excluded product win when any exist.
/// Otherwise any approved or notified products are returned in id order,
/// without scores.
pub async fn find_alternatives(
    db: &DatabaseConnection,
    exclude_id: Option<i32>,
    limit: u64,
) -> Result<Vec<Alternative>, DataError> {
    if let Some(id) = exclude_id {
        let recommended = recommended_for(db, id, limit).await?;
        if !recommended.is_empty() {
            return Ok(recommended);
        }
    }

    let rows = fallback_select(exclude_id, limit)
        .into_model::<ProductRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|product| Alternative {
            product,
            scores: None,
        })
        .collect())
}

pub async fn count_all(db: &DatabaseConnection) -> Result<u64, DataError> {
    Ok(product::Entity::find().count(db).await?)
}
