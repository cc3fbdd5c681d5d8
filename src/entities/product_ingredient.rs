use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links a product to a banned ingredient found in its formulation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "product_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ingredient_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::banned_ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::banned_ingredient::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    BannedIngredient,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::banned_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BannedIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
