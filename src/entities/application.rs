use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::status::ApplicationStatus;

/// One funding application: a user's request against a specific funding
/// option, carrying their financial disclosures and the review lifecycle
/// status. Records are never deleted once submitted; only drafts may be
/// removed by their owner.
///
/// The `ai_*` columns together form the optional AI evaluation; they are
/// populated only when the evaluation step actually ran for this submission.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub user_id: i64,
    pub funding_option_id: i64,
    pub amount: f64,
    #[sea_orm(column_type = "Text")]
    pub purpose: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub business_plan: Option<String>,
    pub income: f64,
    pub expenses: f64,
    pub assets: f64,
    pub liabilities: f64,
    /// Uploaded-file references as `[{name, path, uploadedAt}]`. Upload
    /// handling itself lives outside this service.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub documents: Option<Json>,
    pub status: ApplicationStatus,
    pub ai_score: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_feedback: Option<String>,
    pub ai_evaluated_at: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reviewer_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTime<Utc>,
    #[sea_orm(default_expr = "Expr::current_timestamp()", on_update = "Expr::current_timestamp()")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::funding_option::Entity",
        from = "Column::FundingOptionId",
        to = "super::funding_option::Column::Id"
    )]
    FundingOption,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::funding_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundingOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
