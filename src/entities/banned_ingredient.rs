use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "banned_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub alternative_names: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub health_risk: Option<String>,
    pub regulatory_status: Option<String>,
    pub source_url: Option<String>,
    /// EWG hazard rating, 1 (low) to 10 (high).
    pub ewg_rating: Option<i32>,
    pub pubchem_id: Option<String>,
    pub pubchem_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::ingredient_metrics::Entity")]
    IngredientMetrics,
    #[sea_orm(has_many = "super::product_ingredient::Entity")]
    ProductIngredient,
}

impl Related<super::ingredient_metrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngredientMetrics.def()
    }
}

impl Related<super::product_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
