use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Companies
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Products
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Products::NotificationNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Category).string())
                    .col(ColumnDef::new(Products::Status).string().not_null())
                    .col(ColumnDef::new(Products::CancellationReason).text())
                    .col(ColumnDef::new(Products::DateNotified).date())
                    .col(ColumnDef::new(Products::CompanyId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_company")
                            .from(Products::Table, Products::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Banned ingredients
        manager
            .create_table(
                Table::create()
                    .table(BannedIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BannedIngredients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BannedIngredients::Name).string().not_null())
                    .col(ColumnDef::new(BannedIngredients::AlternativeNames).text())
                    .col(ColumnDef::new(BannedIngredients::HealthRisk).text())
                    .col(ColumnDef::new(BannedIngredients::RegulatoryStatus).string())
                    .col(ColumnDef::new(BannedIngredients::SourceUrl).string())
                    .col(ColumnDef::new(BannedIngredients::EwgRating).integer())
                    .col(ColumnDef::new(BannedIngredients::PubchemId).string())
                    .col(ColumnDef::new(BannedIngredients::PubchemUrl).string())
                    .to_owned(),
            )
            .await?;

        // Product <-> ingredient links
        manager
            .create_table(
                Table::create()
                    .table(ProductIngredients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductIngredients::ProductId).integer().not_null())
                    .col(
                        ColumnDef::new(ProductIngredients::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProductIngredients::ProductId)
                            .col(ProductIngredients::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ingredients_product")
                            .from(ProductIngredients::Table, ProductIngredients::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ingredients_ingredient")
                            .from(ProductIngredients::Table, ProductIngredients::IngredientId)
                            .to(BannedIngredients::Table, BannedIngredients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_companies_name")
                    .table(Companies::Table)
                    .col(Companies::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_name")
                    .table(Products::Table)
                    .col(Products::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_company_id")
                    .table(Products::Table)
                    .col(Products::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_status")
                    .table(Products::Table)
                    .col(Products::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_banned_ingredients_name")
                    .table(BannedIngredients::Table)
                    .col(BannedIngredients::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_ingredients_ingredient_id")
                    .table(ProductIngredients::Table)
                    .col(ProductIngredients::IngredientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BannedIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    NotificationNumber,
    Name,
    Category,
    Status,
    CancellationReason,
    DateNotified,
    CompanyId,
}

#[derive(DeriveIden)]
enum BannedIngredients {
    Table,
    Id,
    Name,
    AlternativeNames,
    HealthRisk,
    RegulatoryStatus,
    SourceUrl,
    EwgRating,
    PubchemId,
    PubchemUrl,
}

#[derive(DeriveIden)]
enum ProductIngredients {
    Table,
    ProductId,
    IngredientId,
}
