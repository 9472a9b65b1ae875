use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AdminUser, AuthUser};
use crate::entities::{application, Application, FundingOption, User};
use crate::error::AppError;
use crate::evaluation::FinancialSnapshot;
use crate::status::{self, ApplicationStatus, StatusDisplay};
use crate::workflow::{self, ApplicationForm};
use crate::AppState;

/// AI evaluation stored on an application, present only when the evaluation
/// step ran for the submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiEvaluation {
    pub score: i32,
    pub feedback: String,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: i64,
    pub user_id: i64,
    pub funding_option_id: i64,
    pub amount: f64,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_plan: Option<String>,
    pub financial_info: FinancialSnapshot,
    pub documents: serde_json::Value,
    pub status: ApplicationStatus,
    /// Badge metadata derived from `status`; purely presentational.
    pub status_display: StatusDisplay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_evaluation: Option<AiEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(model: application::Model) -> Self {
        let ai_evaluation = match (model.ai_score, model.ai_feedback, model.ai_evaluated_at) {
            (Some(score), Some(feedback), Some(evaluated_at)) => Some(AiEvaluation {
                score,
                feedback,
                evaluated_at,
            }),
            _ => None,
        };

        ApplicationResponse {
            id: model.id,
            user_id: model.user_id,
            funding_option_id: model.funding_option_id,
            amount: model.amount,
            purpose: model.purpose,
            business_plan: model.business_plan,
            financial_info: FinancialSnapshot {
                income: model.income,
                expenses: model.expenses,
                assets: model.assets,
                liabilities: model.liabilities,
            },
            documents: model.documents.unwrap_or_else(|| serde_json::json!([])),
            status: model.status,
            status_display: status::display(model.status),
            ai_evaluation,
            reviewer_notes: model.reviewer_notes,
            submitted_at: model.submitted_at,
            decided_at: model.decided_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Admins may pass `all=true` to list every application.
    #[serde(default)]
    all: bool,
}

async fn load_application(
    state: &AppState,
    id: i64,
) -> Result<application::Model, AppError> {
    Application::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))
}

fn require_owner(app: &application::Model, user: &AuthUser) -> Result<(), AppError> {
    if app.user_id != user.id {
        return Err(AppError::Forbidden(
            "you do not have access to this application".to_string(),
        ));
    }
    Ok(())
}

/// List the caller's applications, newest first
#[utoipa::path(
    get,
    path = "/applications",
    params(ListQuery),
    responses(
        (status = 200, description = "Applications for the caller (or all, for admins)", body = Vec<ApplicationResponse>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[tracing::instrument(skip(state, user, query), fields(user_id = user.id))]
pub async fn list_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    let mut select = Application::find();
    if !(query.all && user.is_admin()) {
        select = select.filter(application::Column::UserId.eq(user.id));
    }
    let applications = select
        .order_by_desc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// Fetch a single application
#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "The application", body = ApplicationResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown application")
    )
)]
#[tracing::instrument(skip(state, user), fields(user_id = user.id, application_id = id))]
pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let app = load_application(&state, id).await?;
    if !user.is_admin() {
        require_owner(&app, &user)?;
    }
    Ok(Json(app.into()))
}

/// Update a draft application
#[utoipa::path(
    put,
    path = "/applications/{id}",
    params(("id" = i64, Path, description = "Application id")),
    request_body = ApplicationForm,
    responses(
        (status = 200, description = "Updated draft", body = ApplicationResponse),
        (status = 403, description = "Not the owner, or the record left draft state"),
        (status = 404, description = "Unknown application")
    )
)]
#[tracing::instrument(skip(state, user, form), fields(user_id = user.id, application_id = id))]
pub async fn update_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(form): Json<ApplicationForm>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let app = load_application(&state, id).await?;
    require_owner(&app, &user)?;
    if app.status != ApplicationStatus::Draft {
        return Err(AppError::Forbidden(
            "only draft applications can be edited".to_string(),
        ));
    }

    let mut active: application::ActiveModel = app.into();
    if let Some(amount) = form.amount {
        active.amount = Set(amount);
    }
    if let Some(purpose) = &form.purpose {
        active.purpose = Set(purpose.clone());
    }
    if form.business_plan.is_some() {
        active.business_plan = Set(form.business_plan.clone());
    }
    if let Some(info) = form.financial_info {
        if let Some(income) = info.income {
            active.income = Set(income);
        }
        if let Some(expenses) = info.expenses {
            active.expenses = Set(expenses);
        }
        if let Some(assets) = info.assets {
            active.assets = Set(assets);
        }
        if let Some(liabilities) = info.liabilities {
            active.liabilities = Set(liabilities);
        }
    }
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

/// Delete a draft application
#[utoipa::path(
    delete,
    path = "/applications/{id}",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 204, description = "Draft deleted"),
        (status = 403, description = "Not the owner, or already submitted"),
        (status = 404, description = "Unknown application")
    )
)]
#[tracing::instrument(skip(state, user), fields(user_id = user.id, application_id = id))]
pub async fn delete_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let app = load_application(&state, id).await?;
    require_owner(&app, &user)?;
    if app.status != ApplicationStatus::Draft {
        return Err(AppError::Forbidden(
            "submitted applications cannot be deleted".to_string(),
        ));
    }

    app.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a draft for review
///
/// Runs the same validation and credit evaluation as a direct submission.
#[utoipa::path(
    post,
    path = "/applications/{id}/submit",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "Submitted application", body = ApplicationResponse),
        (status = 400, description = "Validation failed; body lists every offending field"),
        (status = 404, description = "Unknown application or funding option"),
        (status = 409, description = "Not in draft state")
    )
)]
#[tracing::instrument(skip(state, user), fields(user_id = user.id, application_id = id))]
pub async fn submit_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let app = load_application(&state, id).await?;
    require_owner(&app, &user)?;
    if !app.status.can_transition_to(ApplicationStatus::Submitted) {
        return Err(AppError::InvalidTransition {
            from: app.status,
            to: ApplicationStatus::Submitted,
        });
    }

    let option = FundingOption::find_by_id(app.funding_option_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding option".to_string()))?;
    let applicant = User::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

    let form = workflow::form_from_model(&app);
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
    let mut active = workflow::apply_transition(app, ApplicationStatus::Submitted, None, now)?;
    if let Some(evaluation) = evaluation {
        active.ai_score = Set(Some(evaluation.score));
        active.ai_feedback = Set(Some(evaluation.feedback));
        active.ai_evaluated_at = Set(Some(now));
    }

    Ok(Json(active.update(&state.db).await?.into()))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
}

/// Move an application through the review workflow
///
/// Admin action. Only forward transitions are accepted; decisions stamp
/// `decidedAt` and trigger a best-effort email notification to the owner.
#[utoipa::path(
    patch,
    path = "/applications/{id}/status",
    params(("id" = i64, Path, description = "Application id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Application after the transition", body = ApplicationResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Unknown application"),
        (status = 409, description = "Illegal status transition")
    )
)]
#[tracing::instrument(skip(state, admin, body), fields(application_id = id, to = body.status.as_str()))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let app = load_application(&state, id).await?;
    let owner_id = app.user_id;

    let active = workflow::apply_transition(app, body.status, body.reviewer_notes, Utc::now())?;
    let updated = active.update(&state.db).await?;
    tracing::info!(
        admin_id = admin.0.id,
        status = updated.status.as_str(),
        "application {} moved by review action",
        updated.id
    );

    if let Some(mailer) = &state.mailer {
        match User::find_by_id(owner_id).one(&state.db).await {
            Ok(Some(owner)) => {
                mailer.send_status_change(&owner.email, &owner.first_name, updated.id, updated.status)
            }
            Ok(None) => tracing::warn!(
                "owner {} of application {} not found, skipping notification",
                owner_id,
                updated.id
            ),
            Err(err) => tracing::warn!("could not load owner for notification: {}", err),
        }
    }

    Ok(Json(updated.into()))
}
