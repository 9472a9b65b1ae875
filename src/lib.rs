use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::env;
use std::sync::Arc;
use utoipa::OpenApi;

// Conditionally import SwaggerUi only when needed (not test)
#[cfg(not(test))]
use utoipa_swagger_ui::SwaggerUi;
// Conditionally import CORS only when needed (not test)
#[cfg(not(test))]
use tower_http::cors::{Any, CorsLayer};
// Conditionally import Governor only when needed (not test)
#[cfg(not(test))]
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
#[cfg(not(test))]
use std::num::NonZeroU32;

pub mod auth;
pub mod entities;
pub mod error;
pub mod evaluation;
pub mod notify;
pub mod prequalify;
pub mod routes;
pub mod status;
pub mod workflow;

use crate::evaluation::CreditEvaluator;
use crate::notify::Mailer;

/// Outbound SMTP settings for status-change notifications.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Environment-configured collaborators, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Absent key switches the credit evaluator to its default payload.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// Read configuration from the environment. Panics on missing required
    /// variables so a misconfigured deployment fails at boot, not mid-request.
    pub fn from_env() -> Self {
        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
            env::var("SMTP_FROM"),
        ) {
            (Ok(host), Ok(username), Ok(password), Ok(from)) => Some(SmtpConfig {
                host,
                username,
                password,
                from,
            }),
            _ => {
                tracing::info!("SMTP not fully configured; notifications will be logged only");
                None
            }
        };

        AppConfig {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            smtp,
        }
    }
}

/// Shared application state. All clients are constructed at the composition
/// root and injected here; no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub evaluator: Arc<CreditEvaluator>,
    pub mailer: Option<Arc<Mailer>>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FemFund API",
        version = "0.1.0",
        description = "Funding catalog, application workflow, credit evaluation and learning resources"
    ),
    paths(
        health_check,
        routes::funding::list_funding_options,
        routes::funding::get_funding_option,
        routes::funding::create_funding_option,
        routes::funding::deactivate_funding_option,
        routes::funding::apply,
        routes::funding::get_prequalification,
        routes::funding::get_recommendations,
        routes::applications::list_applications,
        routes::applications::get_application,
        routes::applications::update_draft,
        routes::applications::delete_draft,
        routes::applications::submit_draft,
        routes::applications::update_status,
        routes::learning::list_resources,
        routes::learning::get_resource,
    ),
    components(schemas(
        entities::funding_option::Model,
        entities::funding_option::FundingType,
        entities::learning_resource::Model,
        entities::learning_resource::ResourceCategory,
        entities::learning_resource::ResourceKind,
        error::FieldError,
        evaluation::FinancialSnapshot,
        prequalify::PreQualification,
        routes::applications::AiEvaluation,
        routes::applications::ApplicationResponse,
        routes::applications::StatusUpdateRequest,
        routes::funding::CreateFundingOptionRequest,
        routes::funding::RecommendationsResponse,
        status::ApplicationStatus,
        status::StatusDisplay,
        workflow::ApplicationForm,
        workflow::FinancialInfoForm,
    ))
)]
struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // Build our API documentation (needed regardless for ApiDoc::openapi())
    let api_doc = ApiDoc::openapi();

    // --- Define API routes separately ---
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/funding/options",
            get(routes::funding::list_funding_options).post(routes::funding::create_funding_option),
        )
        .route(
            "/funding/options/{id}",
            get(routes::funding::get_funding_option)
                .delete(routes::funding::deactivate_funding_option),
        )
        .route("/funding/apply/{id}", post(routes::funding::apply))
        .route(
            "/funding/prequalify",
            get(routes::funding::get_prequalification),
        )
        .route(
            "/funding/recommendations",
            get(routes::funding::get_recommendations),
        )
        .route(
            "/applications",
            get(routes::applications::list_applications),
        )
        .route(
            "/applications/{id}",
            get(routes::applications::get_application)
                .put(routes::applications::update_draft)
                .delete(routes::applications::delete_draft),
        )
        .route(
            "/applications/{id}/submit",
            post(routes::applications::submit_draft),
        )
        .route(
            "/applications/{id}/status",
            patch(routes::applications::update_status),
        )
        .route("/learning/resources", get(routes::learning::list_resources))
        .route(
            "/learning/resources/{id}",
            get(routes::learning::get_resource),
        )
        .with_state(state);

    // --- Conditionally apply layers and Swagger UI only when NOT running tests ---
    #[cfg(not(test))]
    let (docs_router, rate_limited_api_routes) = {
        // Create Swagger UI router
        let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc);

        // Configure Rate Limiting
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .period(std::time::Duration::from_secs(60))
                .burst_size(NonZeroU32::new(30).unwrap().into())
                .finish()
                .unwrap(),
        );
        // Apply Governor layer ONLY to the api_routes defined above
        let rate_limited_api_routes = api_routes.layer(GovernorLayer {
            config: governor_conf,
        });

        (docs_router, rate_limited_api_routes)
    };

    // For test builds, use the original api_routes and an empty router for docs
    #[cfg(test)]
    let (docs_router, rate_limited_api_routes) = {
        let _ = api_doc;
        (Router::new(), api_routes)
    };

    // --- Build the final application router ---
    #[allow(unused_mut)]
    let mut app = Router::new()
        .merge(rate_limited_api_routes)
        .merge(docs_router);

    // --- Apply CORS to the whole app (both API and docs) if needed ---
    #[cfg(not(test))]
    {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    // Return the final router
    app
}
