//! Application lifecycle states.
//!
//! The status value is a pure domain tag; everything the frontend needs for
//! styling lives in the separate [`display`] mapping so the workflow code
//! never carries presentation concerns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Review workflow state of an application.
///
/// Transitions only move forward:
/// `draft -> submitted -> under_review -> {approved | rejected}`, and
/// `approved -> funded`. `rejected` and `funded` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "funded")]
    Funded,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Funded => "funded",
        }
    }

    /// Whether `next` is a legal forward step from this state.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, UnderReview)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Funded)
        )
    }

    /// States that count as a review outcome when assembling the applicant's
    /// history for credit evaluation.
    pub fn is_decided(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected | ApplicationStatus::Funded
        )
    }

    /// Approval reached the point where `decided_at` must be stamped.
    pub fn is_decision(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }

    /// No further transitions are permitted from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Funded)
    }
}

/// Display metadata the frontend renders for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub color: &'static str,
}

/// Stateless presentation mapping from a workflow state to its badge.
pub fn display(status: ApplicationStatus) -> StatusDisplay {
    match status {
        ApplicationStatus::Draft => StatusDisplay {
            label: "Draft",
            color: "bg-gray-100 text-gray-800",
        },
        ApplicationStatus::Submitted => StatusDisplay {
            label: "Submitted",
            color: "bg-yellow-100 text-yellow-800",
        },
        ApplicationStatus::UnderReview => StatusDisplay {
            label: "Under Review",
            color: "bg-blue-100 text-blue-800",
        },
        ApplicationStatus::Approved => StatusDisplay {
            label: "Approved",
            color: "bg-green-100 text-green-800",
        },
        ApplicationStatus::Rejected => StatusDisplay {
            label: "Rejected",
            color: "bg-red-100 text-red-800",
        },
        ApplicationStatus::Funded => StatusDisplay {
            label: "Funded",
            color: "bg-purple-100 text-purple-800",
        },
    }
}
