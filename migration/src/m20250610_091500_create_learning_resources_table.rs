use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LearningResources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LearningResources::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LearningResources::Title).string().not_null())
                    .col(
                        ColumnDef::new(LearningResources::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LearningResources::Content)
                            .text()
                            .not_null(),
                    )
                    // One of: basics, business, investment, credit, taxes
                    .col(
                        ColumnDef::new(LearningResources::Category)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LearningResources::Duration).string().null())
                    .col(ColumnDef::new(LearningResources::Url).string().null())
                    // One of: article, video, course, quiz
                    .col(
                        ColumnDef::new(LearningResources::ResourceType)
                            .string()
                            .not_null()
                            .default("article"),
                    )
                    .col(
                        ColumnDef::new(LearningResources::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(LearningResources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LearningResources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_learning_resources_category")
                    .table(LearningResources::Table)
                    .col(LearningResources::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LearningResources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LearningResources {
    Table,
    Id,
    Title,
    Description,
    Content,
    Category,
    Duration,
    Url,
    ResourceType,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}
