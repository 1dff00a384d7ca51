use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `jobs` table and its columns.
#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    AppId,
    GarmentType,
    Quantity,
    SizeS,
    SizeM,
    SizeL,
    SizeXl,
    FabricType,
    Deadline,
    Budget,
    DesignFiles,
    BrandId,
    BrandName,
    Status,
    EscrowStatus,
    TailorId,
    TailorName,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::AppId).string().not_null())
                    .col(ColumnDef::new(Jobs::GarmentType).string().not_null())
                    .col(ColumnDef::new(Jobs::Quantity).integer().not_null())
                    .col(ColumnDef::new(Jobs::SizeS).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::SizeM).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::SizeL).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::SizeXl).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::FabricType).string().not_null())
                    .col(ColumnDef::new(Jobs::Deadline).date().not_null())
                    .col(ColumnDef::new(Jobs::Budget).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::DesignFiles).json_binary().not_null())
                    .col(ColumnDef::new(Jobs::BrandId).string().not_null())
                    .col(ColumnDef::new(Jobs::BrandName).string().not_null())
                    .col(ColumnDef::new(Jobs::Status).string().not_null())
                    .col(ColumnDef::new(Jobs::EscrowStatus).string().not_null())
                    .col(ColumnDef::new(Jobs::TailorId).string().null())
                    .col(ColumnDef::new(Jobs::TailorName).string().null())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Brand dashboards filter by owner and always read newest-first.
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_app_brand_created")
                    .table(Jobs::Table)
                    .col(Jobs::AppId)
                    .col(Jobs::BrandId)
                    .col(Jobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_app_created")
                    .table(Jobs::Table)
                    .col(Jobs::AppId)
                    .col(Jobs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}
