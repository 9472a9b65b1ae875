use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FundingOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundingOptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundingOptions::Name).string().not_null())
                    .col(ColumnDef::new(FundingOptions::Description).text().not_null())
                    // One of: microloan, grant, venture_capital, peer_to_peer
                    .col(ColumnDef::new(FundingOptions::Type).string().not_null())
                    .col(ColumnDef::new(FundingOptions::MinAmount).double().not_null())
                    .col(ColumnDef::new(FundingOptions::MaxAmount).double().not_null())
                    .col(
                        ColumnDef::new(FundingOptions::InterestRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(FundingOptions::Term).string().null())
                    .col(
                        ColumnDef::new(FundingOptions::EligibilityCriteria)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FundingOptions::RequiredDocuments)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FundingOptions::ApplicationProcess)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(FundingOptions::Provider).string().null())
                    .col(
                        ColumnDef::new(FundingOptions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FundingOptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FundingOptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // The catalog is filtered by type on every listing request.
        manager
            .create_index(
                Index::create()
                    .name("idx_funding_options_type")
                    .table(FundingOptions::Table)
                    .col(FundingOptions::Type)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FundingOptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FundingOptions {
    Table,
    Id,
    Name,
    Description,
    Type,
    MinAmount,
    MaxAmount,
    InterestRate,
    Term,
    EligibilityCriteria,
    RequiredDocuments,
    ApplicationProcess,
    Provider,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
