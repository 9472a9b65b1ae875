use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    #[sea_orm(string_value = "basics")]
    Basics,
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "investment")]
    Investment,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "taxes")]
    Taxes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[sea_orm(string_value = "article")]
    Article,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "course")]
    Course,
    #[sea_orm(string_value = "quiz")]
    Quiz,
}

/// Educational content shown alongside the funding catalog. Unpublished rows
/// stay hidden from the listing endpoints.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "learning_resources")]
#[schema(as = LearningResource)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: ResourceCategory,
    pub duration: Option<String>,
    pub url: Option<String>,
    pub resource_type: ResourceKind,
    pub is_published: bool,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTime<Utc>,
    #[sea_orm(default_expr = "Expr::current_timestamp()", on_update = "Expr::current_timestamp()")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
