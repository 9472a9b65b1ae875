use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Funding product category. Stored as its wire string in the database so the
/// catalog can be filtered with a plain string comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum FundingType {
    #[sea_orm(string_value = "microloan")]
    Microloan,
    #[sea_orm(string_value = "grant")]
    Grant,
    #[sea_orm(string_value = "venture_capital")]
    VentureCapital,
    #[sea_orm(string_value = "peer_to_peer")]
    PeerToPeer,
}

impl FundingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingType::Microloan => "microloan",
            FundingType::Grant => "grant",
            FundingType::VentureCapital => "venture_capital",
            FundingType::PeerToPeer => "peer_to_peer",
        }
    }
}

/// Catalog entry describing a loan/grant/investment product. Created by admin
/// action and soft-deactivated via `is_active` rather than deleted, so
/// existing applications keep a valid reference.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "funding_options")]
#[schema(as = FundingOption)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub funding_type: FundingType,
    pub min_amount: f64,
    pub max_amount: f64,
    pub interest_rate: f64,
    pub term: Option<String>,
    /// Ordered list of eligibility criteria strings.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub eligibility_criteria: Option<Json>,
    /// Ordered list of document names the applicant must provide.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub required_documents: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub application_process: Option<String>,
    pub provider: Option<String>,
    pub is_active: bool,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTime<Utc>,
    #[sea_orm(default_expr = "Expr::current_timestamp()", on_update = "Expr::current_timestamp()")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
