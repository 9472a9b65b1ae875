use std::sync::Arc;

use femfund::evaluation::CreditEvaluator;
use femfund::notify::Mailer;
use femfund::{create_app, AppConfig, AppState};

#[tokio::main]
async fn main() {
    // Load .env (if present) before reading configuration
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    let db = sea_orm::Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Composition root: every external client is built here and injected.
    let evaluator = CreditEvaluator::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    );
    let mailer = config.smtp.as_ref().and_then(|smtp| match Mailer::new(smtp) {
        Ok(mailer) => Some(Arc::new(mailer)),
        Err(err) => {
            tracing::warn!("failed to build SMTP transport, notifications disabled: {}", err);
            None
        }
    });

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        db,
        evaluator: Arc::new(evaluator),
        mailer,
        config: Arc::new(config),
    };

    // Run our server
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    tracing::info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await.unwrap();
}
