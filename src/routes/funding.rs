use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AdminUser, AuthUser};
use crate::entities::funding_option::{self, FundingType};
use crate::entities::{application, Application, FundingOption, User};
use crate::error::{AppError, FieldError};
use crate::prequalify::{self, PreQualification};
use crate::routes::applications::ApplicationResponse;
use crate::status::ApplicationStatus;
use crate::workflow::{self, ApplicationForm};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptionsQuery {
    /// Restrict the catalog to one funding type.
    #[serde(default, rename = "type")]
    #[param(required = false)]
    funding_type: Option<FundingType>,
}

/// List active funding options
#[utoipa::path(
    get,
    path = "/funding/options",
    params(OptionsQuery),
    responses(
        (status = 200, description = "Active catalog entries", body = Vec<funding_option::Model>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[tracing::instrument(skip(state, _user, query))]
pub async fn list_funding_options(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<OptionsQuery>,
) -> Result<Json<Vec<funding_option::Model>>, AppError> {
    let mut select = FundingOption::find().filter(funding_option::Column::IsActive.eq(true));
    if let Some(funding_type) = query.funding_type {
        select = select.filter(funding_option::Column::FundingType.eq(funding_type));
    }
    let options = select
        .order_by_asc(funding_option::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(options))
}

/// Fetch a single funding option
#[utoipa::path(
    get,
    path = "/funding/options/{id}",
    params(("id" = i64, Path, description = "Funding option id")),
    responses(
        (status = 200, description = "The funding option", body = funding_option::Model),
        (status = 404, description = "Unknown funding option")
    )
)]
#[tracing::instrument(skip(state, _user))]
pub async fn get_funding_option(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<funding_option::Model>, AppError> {
    FundingOption::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Funding option".to_string()))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFundingOptionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub funding_type: Option<FundingType>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub eligibility_criteria: Vec<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub application_process: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

fn validate_new_option(body: &CreateFundingOptionRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if body.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push(FieldError::new("name", "Funding option name is required"));
    }
    if body
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .is_empty()
    {
        errors.push(FieldError::new("description", "Description is required"));
    }
    if body.funding_type.is_none() {
        errors.push(FieldError::new("type", "Type is required"));
    }

    let min = match body.min_amount {
        None => {
            errors.push(FieldError::new("minAmount", "Minimum amount is required"));
            None
        }
        Some(v) if !v.is_finite() || v < 0.0 => {
            errors.push(FieldError::new(
                "minAmount",
                "Minimum amount must be a non-negative number",
            ));
            None
        }
        Some(v) => Some(v),
    };
    match (body.max_amount, min) {
        (None, _) => errors.push(FieldError::new("maxAmount", "Maximum amount is required")),
        (Some(v), _) if !v.is_finite() || v < 0.0 => errors.push(FieldError::new(
            "maxAmount",
            "Maximum amount must be a non-negative number",
        )),
        (Some(max), Some(min)) if max < min => errors.push(FieldError::new(
            "maxAmount",
            "Maximum amount must not be below the minimum amount",
        )),
        _ => {}
    }

    if let Some(rate) = body.interest_rate {
        if !rate.is_finite() || rate < 0.0 {
            errors.push(FieldError::new(
                "interestRate",
                "Interest rate must be a non-negative number",
            ));
        }
    }

    errors
}

/// Register a new funding option
///
/// Admin action; new options are active immediately.
#[utoipa::path(
    post,
    path = "/funding/options",
    request_body = CreateFundingOptionRequest,
    responses(
        (status = 201, description = "Created funding option", body = funding_option::Model),
        (status = 400, description = "Validation failed; body lists every offending field"),
        (status = 403, description = "Administrator role required")
    )
)]
#[tracing::instrument(skip(state, _admin, body))]
pub async fn create_funding_option(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<CreateFundingOptionRequest>,
) -> Result<(StatusCode, Json<funding_option::Model>), AppError> {
    let errors = validate_new_option(&body);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let active = funding_option::ActiveModel {
        name: Set(body.name.unwrap_or_default().trim().to_string()),
        description: Set(body.description.unwrap_or_default().trim().to_string()),
        funding_type: Set(body.funding_type.unwrap_or(FundingType::Microloan)),
        min_amount: Set(body.min_amount.unwrap_or_default()),
        max_amount: Set(body.max_amount.unwrap_or_default()),
        interest_rate: Set(body.interest_rate.unwrap_or(0.0)),
        term: Set(body.term),
        eligibility_criteria: Set(Some(serde_json::json!(body.eligibility_criteria))),
        required_documents: Set(Some(serde_json::json!(body.required_documents))),
        application_process: Set(body.application_process),
        provider: Set(body.provider),
        is_active: Set(true),
        ..Default::default()
    };

    let created = active.insert(&state.db).await?;
    tracing::info!("funding option {} ({}) registered", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Deactivate a funding option
///
/// Soft delete: the option disappears from the catalog but existing
/// applications keep a valid reference.
#[utoipa::path(
    delete,
    path = "/funding/options/{id}",
    params(("id" = i64, Path, description = "Funding option id")),
    responses(
        (status = 200, description = "Deactivated funding option", body = funding_option::Model),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Unknown funding option")
    )
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn deactivate_funding_option(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<funding_option::Model>, AppError> {
    let option = FundingOption::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding option".to_string()))?;

    let mut active: funding_option::ActiveModel = option.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    Ok(Json(active.update(&state.db).await?))
}

/// Apply for a funding option
///
/// Validates the form against the option's amount range, creates the
/// application in `submitted` state and runs the credit evaluation; with
/// `saveAsDraft` the form is stored as an editable draft instead.
#[utoipa::path(
    post,
    path = "/funding/apply/{id}",
    params(("id" = i64, Path, description = "Funding option id")),
    request_body = ApplicationForm,
    responses(
        (status = 201, description = "Created application", body = ApplicationResponse),
        (status = 400, description = "Validation failed; body lists every offending field"),
        (status = 404, description = "Unknown funding option")
    )
)]
#[tracing::instrument(skip(state, user, form), fields(user_id = user.id, funding_option_id = id))]
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(form): Json<ApplicationForm>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let option = FundingOption::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding option".to_string()))?;
    let applicant = User::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

    if form.save_as_draft {
        let info = form.financial_info;
        let draft = application::ActiveModel {
            user_id: Set(applicant.id),
            funding_option_id: Set(option.id),
            amount: Set(form.amount.unwrap_or(0.0)),
            purpose: Set(form.purpose.clone().unwrap_or_default()),
            business_plan: Set(form.business_plan.clone()),
            income: Set(info.and_then(|i| i.income).unwrap_or(0.0)),
            expenses: Set(info.and_then(|i| i.expenses).unwrap_or(0.0)),
            assets: Set(info.and_then(|i| i.assets).unwrap_or(0.0)),
            liabilities: Set(info.and_then(|i| i.liabilities).unwrap_or(0.0)),
            documents: Set(Some(serde_json::json!([]))),
            status: Set(ApplicationStatus::Draft),
            ..Default::default()
        };
        let saved = draft.insert(&state.db).await?;
        return Ok((StatusCode::CREATED, Json(saved.into())));
    }

    let submission = workflow::validate_submission(&form, &option).map_err(AppError::Validation)?;
    let evaluation = workflow::evaluate_for_submission(
        &state.db,
        &state.evaluator,
        &applicant,
        option.funding_type,
        &submission,
    )
    .await;

    let now = Utc::now();
    let mut active = application::ActiveModel {
        user_id: Set(applicant.id),
        funding_option_id: Set(option.id),
        amount: Set(submission.amount),
        purpose: Set(submission.purpose.clone()),
        business_plan: Set(submission.business_plan.clone()),
        income: Set(submission.financial.income),
        expenses: Set(submission.financial.expenses),
        assets: Set(submission.financial.assets),
        liabilities: Set(submission.financial.liabilities),
        documents: Set(Some(serde_json::json!([]))),
        status: Set(ApplicationStatus::Submitted),
        submitted_at: Set(Some(now)),
        ..Default::default()
    };
    if let Some(evaluation) = evaluation {
        active.ai_score = Set(Some(evaluation.score));
        active.ai_feedback = Set(Some(evaluation.feedback));
        active.ai_evaluated_at = Set(Some(now));
    }

    let saved = active.insert(&state.db).await?;
    tracing::info!("application {} submitted for option {}", saved.id, option.id);
    Ok((StatusCode::CREATED, Json(saved.into())))
}

async fn compute_prequalification(
    state: &AppState,
    user_id: i64,
) -> Result<PreQualification, AppError> {
    let applicant = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

    let successes = Application::find()
        .filter(application::Column::UserId.eq(user_id))
        .filter(application::Column::Status.is_in([
            ApplicationStatus::Approved,
            ApplicationStatus::Funded,
        ]))
        .count(&state.db)
        .await?;

    Ok(prequalify::prequalify(applicant.financial_score, successes))
}

/// Pre-qualification estimate for the caller
///
/// Never fails: any internal error degrades to the conservative default.
#[utoipa::path(
    get,
    path = "/funding/prequalify",
    responses(
        (status = 200, description = "Eligibility flags and recommended amount", body = PreQualification),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_prequalification(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<PreQualification> {
    match compute_prequalification(&state, user.id).await {
        Ok(result) => Json(result),
        Err(err) => {
            tracing::error!(
                "pre-qualification failed, returning conservative default: {}",
                err
            );
            Json(PreQualification::conservative_default())
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationsResponse {
    pub score: i32,
    pub recommendations: Vec<String>,
}

/// Advice for improving the caller's financial score
#[utoipa::path(
    get,
    path = "/funding/recommendations",
    responses(
        (status = 200, description = "Score bracket advice", body = RecommendationsResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let applicant = User::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

    let score = applicant
        .financial_score
        .unwrap_or(prequalify::DEFAULT_FINANCIAL_SCORE);
    Ok(Json(RecommendationsResponse {
        score,
        recommendations: prequalify::score_recommendations(score)
            .into_iter()
            .map(String::from)
            .collect(),
    }))
}
