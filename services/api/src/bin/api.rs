//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        Argon2JwtCredentials, DbAdapter, DocumentExporter, FileTextExtractor,
        OpenAiSummaryAdapter, SmtpMailer,
    },
    config::Config,
    error::ApiError,
    web::{build_router, rest::ApiDoc, Adapters, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    let openai_client = Client::with_config(openai_config);

    let adapters = Adapters {
        db: db_adapter,
        credentials: Arc::new(Argon2JwtCredentials::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours),
        )),
        generator: Arc::new(OpenAiSummaryAdapter::new(
            openai_client,
            config.summary_model.clone(),
        )),
        renderer: Arc::new(DocumentExporter::from_font_files(
            &config.pdf_fonts.regular,
            &config.pdf_fonts.bold,
        )?),
        notifier: Arc::new(SmtpMailer::new(&config.smtp)?),
        extractor: Arc::new(FileTextExtractor::new()),
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), adapters));

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(build_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
