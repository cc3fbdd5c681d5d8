use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A scored pairing of a cancelled product with a safer replacement.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "recommended_alternatives")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cancelled_product_id: i32,
    pub recommended_product_id: i32,
    #[sea_orm(column_type = "Double")]
    pub brand_score: f64,
    #[sea_orm(column_type = "Double")]
    pub category_risk_score: f64,
    pub vertical_integration: bool,
    #[sea_orm(column_type = "Double")]
    pub recency_score: f64,
    #[sea_orm(column_type = "Double")]
    pub relevance_score: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::CancelledProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    CancelledProduct,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::RecommendedProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    RecommendedProduct,
}

impl ActiveModelBehavior for ActiveModel {}
