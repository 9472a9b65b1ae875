//! Submission validation and workflow orchestration.
//!
//! Sits between the HTTP handlers and the entities: field-level validation of
//! application forms, the non-fatal credit-evaluation step, and the
//! status-transition rules that stamp timestamps onto records.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::entities::funding_option::FundingType;
use crate::entities::{application, funding_option, user, Application, FundingOption};
use crate::error::{AppError, FieldError};
use crate::evaluation::{
    blend_score, ApplicantProfile, CreditEvaluator, Evaluation, EvaluationInput,
    EvaluationOutcome, FinancialSnapshot, HistoryEntry,
};
use crate::status::ApplicationStatus;

/// How many decided applications feed the evaluation prompt.
const HISTORY_LIMIT: u64 = 5;

pub const MIN_PURPOSE_LEN: usize = 10;
pub const MAX_PURPOSE_LEN: usize = 500;

/// Application form body for `POST /funding/apply/{id}` and draft updates.
/// Fields are optional so validation can report every missing field at once
/// instead of failing on the first.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub amount: Option<f64>,
    pub purpose: Option<String>,
    #[serde(default)]
    pub business_plan: Option<String>,
    pub financial_info: Option<FinancialInfoForm>,
    /// Store as an editable draft instead of submitting for review.
    #[serde(default)]
    pub save_as_draft: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInfoForm {
    pub income: Option<f64>,
    pub expenses: Option<f64>,
    pub assets: Option<f64>,
    pub liabilities: Option<f64>,
}

/// A form that passed submission validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub amount: f64,
    pub purpose: String,
    pub business_plan: Option<String>,
    pub financial: FinancialSnapshot,
}

fn check_financial_field(
    errors: &mut Vec<FieldError>,
    value: Option<f64>,
    field: &str,
    label: &str,
) -> f64 {
    match value {
        None => {
            errors.push(FieldError::new(field, format!("{} is required", label)));
            0.0
        }
        Some(v) if !v.is_finite() || v < 0.0 => {
            errors.push(FieldError::new(
                field,
                format!("{} must be a non-negative number", label),
            ));
            0.0
        }
        Some(v) => v,
    }
}

/// Validate a submission against the referenced funding option's current
/// amount range. Returns the cleaned values, or every offending field.
pub fn validate_submission(
    form: &ApplicationForm,
    option: &funding_option::Model,
) -> Result<ValidatedSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let amount = match form.amount {
        None => {
            errors.push(FieldError::new("amount", "Amount is required"));
            0.0
        }
        Some(a) if !a.is_finite() => {
            errors.push(FieldError::new("amount", "Amount must be a number"));
            0.0
        }
        Some(a) => {
            if a < option.min_amount || a > option.max_amount {
                errors.push(FieldError::new(
                    "amount",
                    format!(
                        "Amount must be between {} and {}",
                        option.min_amount, option.max_amount
                    ),
                ));
            }
            a
        }
    };

    let purpose = match form.purpose.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("purpose", "Purpose is required"));
            String::new()
        }
        Some(p) => {
            let len = p.chars().count();
            if !(MIN_PURPOSE_LEN..=MAX_PURPOSE_LEN).contains(&len) {
                errors.push(FieldError::new(
                    "purpose",
                    format!(
                        "Purpose must be between {} and {} characters",
                        MIN_PURPOSE_LEN, MAX_PURPOSE_LEN
                    ),
                ));
            }
            p.to_string()
        }
    };

    let info = form.financial_info.unwrap_or(FinancialInfoForm {
        income: None,
        expenses: None,
        assets: None,
        liabilities: None,
    });
    let financial = FinancialSnapshot {
        income: check_financial_field(&mut errors, info.income, "financialInfo.income", "Income"),
        expenses: check_financial_field(
            &mut errors,
            info.expenses,
            "financialInfo.expenses",
            "Expenses",
        ),
        assets: check_financial_field(&mut errors, info.assets, "financialInfo.assets", "Assets"),
        liabilities: check_financial_field(
            &mut errors,
            info.liabilities,
            "financialInfo.liabilities",
            "Liabilities",
        ),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedSubmission {
        amount,
        purpose,
        business_plan: form
            .business_plan
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        financial,
    })
}

/// Rebuild a form from a stored draft so draft submission runs through the
/// same validation as a direct submission. An empty stored purpose counts as
/// missing again.
pub fn form_from_model(app: &application::Model) -> ApplicationForm {
    ApplicationForm {
        amount: Some(app.amount),
        purpose: Some(app.purpose.clone()).filter(|p| !p.trim().is_empty()),
        business_plan: app.business_plan.clone(),
        financial_info: Some(FinancialInfoForm {
            income: Some(app.income),
            expenses: Some(app.expenses),
            assets: Some(app.assets),
            liabilities: Some(app.liabilities),
        }),
        save_as_draft: false,
    }
}

async fn decided_history(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<HistoryEntry>, sea_orm::DbErr> {
    let rows = Application::find()
        .filter(application::Column::UserId.eq(user_id))
        .filter(
            application::Column::Status
                .is_in(ApplicationStatus::iter().filter(|status| status.is_decided())),
        )
        .order_by_desc(application::Column::CreatedAt)
        .limit(HISTORY_LIMIT)
        .find_also_related(FundingOption)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(app, option)| {
            option.map(|option| HistoryEntry {
                funding_type: option.funding_type,
                amount: app.amount,
                status: app.status,
                date: app.created_at,
            })
        })
        .collect())
}

/// Run the credit evaluation step of a submission. Non-fatal by contract:
/// a failed history query returns `None` and the record is stored without an
/// evaluation. On a genuine model evaluation the user's running financial
/// score is folded forward.
pub async fn evaluate_for_submission(
    db: &DatabaseConnection,
    evaluator: &CreditEvaluator,
    applicant: &user::Model,
    funding_type: FundingType,
    submission: &ValidatedSubmission,
) -> Option<Evaluation> {
    // Without a credential the evaluator answers immediately; skip the
    // history query in that case.
    let history = if evaluator.has_credential() {
        match decided_history(db, applicant.id).await {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!("skipping credit evaluation, history query failed: {}", err);
                return None;
            }
        }
    } else {
        Vec::new()
    };

    let input = EvaluationInput {
        funding_type,
        amount: submission.amount,
        purpose: submission.purpose.clone(),
        business_plan: submission.business_plan.clone(),
        financial: submission.financial,
        profile: ApplicantProfile {
            is_verified: applicant.is_verified,
            financial_score: applicant.financial_score,
            account_age_days: (Utc::now() - applicant.created_at).num_days(),
        },
        history,
    };

    let evaluation = evaluator.evaluate(&input).await;
    tracing::info!(
        outcome = ?evaluation.outcome,
        score = evaluation.score,
        "credit evaluation finished"
    );

    if evaluation.outcome == EvaluationOutcome::Evaluated {
        let blended = blend_score(applicant.financial_score, evaluation.score);
        let mut active: user::ActiveModel = applicant.clone().into();
        active.financial_score = Set(Some(blended));
        if let Err(err) = active.update(db).await {
            tracing::warn!(
                "failed to update financial score for user {}: {}",
                applicant.id,
                err
            );
        }
    }

    Some(evaluation)
}

/// Apply a workflow transition to an application, stamping the timestamps the
/// target state requires. Rejects anything but a legal forward step.
pub fn apply_transition(
    app: application::Model,
    to: ApplicationStatus,
    reviewer_notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<application::ActiveModel, AppError> {
    let from = app.status;
    if !from.can_transition_to(to) {
        return Err(AppError::InvalidTransition { from, to });
    }

    let mut active: application::ActiveModel = app.into();
    active.status = Set(to);
    if to == ApplicationStatus::Submitted {
        active.submitted_at = Set(Some(now));
    }
    if to.is_decision() {
        active.decided_at = Set(Some(now));
    }
    if let Some(notes) = reviewer_notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        active.reviewer_notes = Set(Some(notes.to_string()));
    }
    active.updated_at = Set(now);
    Ok(active)
}
