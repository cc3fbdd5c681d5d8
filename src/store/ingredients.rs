use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, NullOrdering, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::{name_contains, order, Page};
use crate::entities::{banned_ingredient, ingredient_metrics};
use crate::error::DataError;
use crate::validation::{IngredientSort, ListParams};

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct IngredientRow {
    pub id: i32,
    pub name: String,
    pub alternative_names: Option<String>,
    pub health_risk: Option<String>,
    pub regulatory_status: Option<String>,
    pub source_url: Option<String>,
    pub ewg_rating: Option<i32>,
    pub pubchem_id: Option<String>,
    pub pubchem_url: Option<String>,
    pub occurrence_count: Option<i32>,
    pub first_appearance: Option<NaiveDate>,
    pub last_appearance: Option<NaiveDate>,
    pub risk_score: Option<f64>,
}

fn select_ingredients() -> Select<banned_ingredient::Entity> {
    banned_ingredient::Entity::find()
        .select_only()
        .columns([
            banned_ingredient::Column::Id,
            banned_ingredient::Column::Name,
            banned_ingredient::Column::AlternativeNames,
            banned_ingredient::Column::HealthRisk,
            banned_ingredient::Column::RegulatoryStatus,
            banned_ingredient::Column::SourceUrl,
            banned_ingredient::Column::EwgRating,
            banned_ingredient::Column::PubchemId,
            banned_ingredient::Column::PubchemUrl,
        ])
        .column_as(ingredient_metrics::Column::OccurrenceCount, "occurrence_count")
        .column_as(ingredient_metrics::Column::FirstAppearance, "first_appearance")
        .column_as(ingredient_metrics::Column::LastAppearance, "last_appearance")
        .column_as(ingredient_metrics::Column::RiskScore, "risk_score")
        .join(
            JoinType::LeftJoin,
            banned_ingredient::Relation::IngredientMetrics.def(),
        )
}

fn sort_column(sort: IngredientSort) -> SimpleExpr {
    match sort {
        IngredientSort::Name => {
            Expr::col((banned_ingredient::Entity, banned_ingredient::Column::Name)).into()
        }
        IngredientSort::EwgRating => {
            Expr::col((banned_ingredient::Entity, banned_ingredient::Column::EwgRating)).into()
        }
        IngredientSort::OccurrenceCount => Expr::col((
            ingredient_metrics::Entity,
            ingredient_metrics::Column::OccurrenceCount,
        ))
        .into(),
        IngredientSort::RiskScore => {
            Expr::col((ingredient_metrics::Entity, ingredient_metrics::Column::RiskScore)).into()
        }
        IngredientSort::LastAppearance => Expr::col((
            ingredient_metrics::Entity,
            ingredient_metrics::Column::LastAppearance,
        ))
        .into(),
    }
}

fn list_condition(params: &ListParams<IngredientSort>) -> Condition {
    match &params.query {
        Some(query) => Condition::all().add(name_contains(
            Expr::col((banned_ingredient::Entity, banned_ingredient::Column::Name)),
            query,
        )),
        None => Condition::all(),
    }
}

fn list_select(params: &ListParams<IngredientSort>) -> Select<banned_ingredient::Entity> {
    select_ingredients()
        .filter(list_condition(params))
        // Rows without metrics sort after rated ones in either direction.
        .order_by_with_nulls(
            sort_column(params.sort_by),
            order(params.sort_order),
            NullOrdering::Last,
        )
        .order_by_asc(banned_ingredient::Column::Id)
        .limit(params.limit)
        .offset(params.offset)
}

pub async fn list(
    db: &DatabaseConnection,
    params: &ListParams<IngredientSort>,
) -> Result<Page<IngredientRow>, DataError> {
    let items = list_select(params)
        .into_model::<IngredientRow>()
        .all(db)
        .await?;

    let total = banned_ingredient::Entity::find()
        .filter(list_condition(params))
        .count(db)
        .await?;

    Ok(Page { items, total })
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<IngredientRow>, DataError> {
    let row = select_ingredients()
        .filter(banned_ingredient::Column::Id.eq(id))
        .into_model::<IngredientRow>()
        .one(db)
        .await?;
    Ok(row)
}

pub async fn count_all(db: &DatabaseConnection) -> Result<u64, DataError> {
    Ok(banned_ingredient::Entity::find().count(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{count_row, ingredient_row};
    use crate::validation::SortOrder;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    #[test]
    fn test_sort_by_risk_score() {
        let params = ListParams {
            query: Some("mercury".to_string()),
            limit: 10,
            offset: 30,
            sort_by: IngredientSort::RiskScore,
            sort_order: SortOrder::Desc,
        };
        let stmt = list_select(&params).build(DatabaseBackend::Postgres);
        assert!(
            stmt.sql.contains(r#"ORDER BY "ingredient_metrics"."risk_score" DESC NULLS LAST, "banned_ingredients"."id" ASC"#),
            "{}",
            stmt.sql
        );
        assert!(stmt.sql.contains(r#"LOWER("banned_ingredients"."name") LIKE"#), "{}", stmt.sql);
        assert!(stmt.sql.contains("LIMIT"), "{}", stmt.sql);
        assert!(stmt.sql.contains("OFFSET"), "{}", stmt.sql);
    }

    #[tokio::test]
    async fn test_list_reads_metrics() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ingredient_row(4, "Mercury")]])
            .append_query_results([vec![count_row(17)]])
            .into_connection();

        let params = ListParams::<IngredientSort>::parse(&Default::default()).unwrap();
        let page = list(&db, &params).await.unwrap();

        assert_eq!(page.total, 17);
        let row = &page.items[0];
        assert_eq!(row.ewg_rating, Some(10));
        assert_eq!(row.occurrence_count, Some(31));
        assert_eq!(row.risk_score, Some(9.1));
    }
}
