use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ingredient_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ingredient_id: i32,
    pub occurrence_count: i32,
    pub first_appearance: Option<Date>,
    pub last_appearance: Option<Date>,
    #[sea_orm(column_type = "Double", nullable)]
    pub risk_score: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::banned_ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::banned_ingredient::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    BannedIngredient,
}

impl Related<super::banned_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BannedIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
