use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecommendedAlternatives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendedAlternatives::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::CancelledProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::RecommendedProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::BrandScore)
                            .double()
                            .default(0.0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::CategoryRiskScore)
                            .double()
                            .default(0.0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::VerticalIntegration)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::RecencyScore)
                            .double()
                            .default(0.0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedAlternatives::RelevanceScore)
                            .double()
                            .default(0.0)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommended_alternatives_cancelled")
                            .from(
                                RecommendedAlternatives::Table,
                                RecommendedAlternatives::CancelledProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommended_alternatives_recommended")
                            .from(
                                RecommendedAlternatives::Table,
                                RecommendedAlternatives::RecommendedProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recommended_alternatives_pair")
                    .table(RecommendedAlternatives::Table)
                    .col(RecommendedAlternatives::CancelledProductId)
                    .col(RecommendedAlternatives::RecommendedProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecommendedAlternatives::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RecommendedAlternatives {
    Table,
    Id,
    CancelledProductId,
    RecommendedProductId,
    BrandScore,
    CategoryRiskScore,
    VerticalIntegration,
    RecencyScore,
    RelevanceScore,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}
