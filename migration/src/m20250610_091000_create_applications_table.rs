use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Applications::FundingOptionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::Amount).double().not_null())
                    .col(ColumnDef::new(Applications::Purpose).text().not_null())
                    .col(ColumnDef::new(Applications::BusinessPlan).text().null())
                    .col(ColumnDef::new(Applications::Income).double().not_null())
                    .col(ColumnDef::new(Applications::Expenses).double().not_null())
                    .col(ColumnDef::new(Applications::Assets).double().not_null())
                    .col(
                        ColumnDef::new(Applications::Liabilities)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::Documents).json_binary().null())
                    // Workflow state: draft, submitted, under_review, approved,
                    // rejected, funded
                    .col(
                        ColumnDef::new(Applications::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Applications::AiScore).integer().null())
                    .col(ColumnDef::new(Applications::AiFeedback).text().null())
                    .col(
                        ColumnDef::new(Applications::AiEvaluatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Applications::ReviewerNotes).text().null())
                    .col(
                        ColumnDef::new(Applications::SubmittedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Applications::DecidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Applications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_user")
                            .from(Applications::Table, Applications::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_funding_option")
                            .from(Applications::Table, Applications::FundingOptionId)
                            .to(FundingOptions::Table, FundingOptions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The history query filters by user and status on every submission.
        manager
            .create_index(
                Index::create()
                    .name("idx_applications_user_status")
                    .table(Applications::Table)
                    .col(Applications::UserId)
                    .col(Applications::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
    UserId,
    FundingOptionId,
    Amount,
    Purpose,
    BusinessPlan,
    Income,
    Expenses,
    Assets,
    Liabilities,
    Documents,
    Status,
    AiScore,
    AiFeedback,
    AiEvaluatedAt,
    ReviewerNotes,
    SubmittedAt,
    DecidedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum FundingOptions {
    Table,
    Id,
}
