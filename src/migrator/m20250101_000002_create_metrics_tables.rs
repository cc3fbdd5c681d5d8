use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompanyMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyMetrics::CompanyId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CompanyMetrics::TotalNotifications)
                            .integer()
                            .default(0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompanyMetrics::CancelledCount)
                            .integer()
                            .default(0)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompanyMetrics::FirstNotified).date())
                    .col(ColumnDef::new(CompanyMetrics::ReputationScore).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_metrics_company")
                            .from(CompanyMetrics::Table, CompanyMetrics::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IngredientMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IngredientMetrics::IngredientId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IngredientMetrics::OccurrenceCount)
                            .integer()
                            .default(0)
                            .not_null(),
                    )
                    .col(ColumnDef::new(IngredientMetrics::FirstAppearance).date())
                    .col(ColumnDef::new(IngredientMetrics::LastAppearance).date())
                    .col(ColumnDef::new(IngredientMetrics::RiskScore).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ingredient_metrics_ingredient")
                            .from(IngredientMetrics::Table, IngredientMetrics::IngredientId)
                            .to(BannedIngredients::Table, BannedIngredients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IngredientMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompanyMetrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CompanyMetrics {
    Table,
    CompanyId,
    TotalNotifications,
    CancelledCount,
    FirstNotified,
    ReputationScore,
}

#[derive(DeriveIden)]
enum IngredientMetrics {
    Table,
    IngredientId,
    OccurrenceCount,
    FirstAppearance,
    LastAppearance,
    RiskScore,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum BannedIngredients {
    Table,
    Id,
}
