use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, NullOrdering, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::{name_contains, order, Page};
use crate::entities::{company, company_metrics};
use crate::error::DataError;
use crate::validation::{CompanySort, ListParams};

/// A company with its metrics; metrics are absent when no row exists yet.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CompanyRow {
    pub id: i32,
    pub name: String,
    pub total_notifications: Option<i32>,
    pub cancelled_count: Option<i32>,
    pub first_notified: Option<NaiveDate>,
    pub reputation_score: Option<f64>,
}

fn select_companies() -> Select<company::Entity> {
    company::Entity::find()
        .select_only()
        .column(company::Column::Id)
        .column(company::Column::Name)
        .column_as(company_metrics::Column::TotalNotifications, "total_notifications")
        .column_as(company_metrics::Column::CancelledCount, "cancelled_count")
        .column_as(company_metrics::Column::FirstNotified, "first_notified")
        .column_as(company_metrics::Column::ReputationScore, "reputation_score")
        .join(JoinType::LeftJoin, company::Relation::CompanyMetrics.def())
}

fn sort_column(sort: CompanySort) -> SimpleExpr {
    match sort {
        CompanySort::Name => Expr::col((company::Entity, company::Column::Name)).into(),
        CompanySort::TotalNotifications => Expr::col((
            company_metrics::Entity,
            company_metrics::Column::TotalNotifications,
        ))
        .into(),
        CompanySort::ReputationScore => Expr::col((
            company_metrics::Entity,
            company_metrics::Column::ReputationScore,
        ))
        .into(),
        CompanySort::CancelledCount => Expr::col((
            company_metrics::Entity,
            company_metrics::Column::CancelledCount,
        ))
        .into(),
        CompanySort::FirstNotified => Expr::col((
            company_metrics::Entity,
            company_metrics::Column::FirstNotified,
        ))
        .into(),
    }
}

fn list_condition(params: &ListParams<CompanySort>) -> Condition {
    match &params.query {
        Some(query) => Condition::all().add(name_contains(
            Expr::col((company::Entity, company::Column::Name)),
            query,
        )),
        None => Condition::all(),
    }
}

fn list_select(params: &ListParams<CompanySort>) -> Select<company::Entity> {
    select_companies()
        .filter(list_condition(params))
        // Rows without metrics sort after rated ones in either direction.
        .order_by_with_nulls(
            sort_column(params.sort_by),
            order(params.sort_order),
            NullOrdering::Last,
        )
        .order_by_asc(company::Column::Id)
        .limit(params.limit)
        .offset(params.offset)
}

pub async fn list(
    db: &DatabaseConnection,
    params: &ListParams<CompanySort>,
) -> Result<Page<CompanyRow>, DataError> {
    let items = list_select(params)
        .into_model::<CompanyRow>()
        .all(db)
        .await?;

    let total = company::Entity::find()
        .filter(list_condition(params))
        .count(db)
        .await?;

    Ok(Page { items, total })
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<CompanyRow>, DataError> {
    let row = select_companies()
        .filter(company::Column::Id.eq(id))
        .into_model::<CompanyRow>()
        .one(db)
        .await?;
    Ok(row)
}

pub async fn count_all(db: &DatabaseConnection) -> Result<u64, DataError> {
    Ok(company::Entity::find().count(db).await?)
}
