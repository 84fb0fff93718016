use std::sync::Arc;

use axum::routing::get;
use axum::{Json, extract::State, http::StatusCode};
use axum_helpers::server::{HealthCheckFuture, create_app, create_router, health_router, run_health_checks};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{DatabaseConnection, check_health, connect_from_config_with_retry, run_migrations};
use domain_campaigns::{
    ApiDoc, CampaignService, MailTransport, PgCampaignRepository, ResendTransport, handlers,
};
use tracing::info;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = connect_from_config_with_retry(&config.database, None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    run_migrations::<migration::Migrator>(&db)
        .await
        .map_err(|e| eyre::eyre!("Database migration failed: {}", e))?;

    // Transport credentials are required up front: a campaign must never
    // reach `sending` without a usable transport.
    let transport = Arc::new(ResendTransport::from_env()?);

    let repository = PgCampaignRepository::new(db.clone());
    let service = Arc::new(CampaignService::new(
        repository,
        Arc::clone(&transport),
        config.dispatch.clone(),
    )?);

    let campaigns = handlers::router(service);
    let api_router = create_router::<ApiDoc>(axum::Router::new().nest("/campaigns", campaigns))
        .await?
        .merge(health_router())
        .route("/ready", get(ready).with_state(ReadyState { db, transport }));

    create_app(api_router, &config.server).await?;

    Ok(())
}

#[derive(Clone)]
struct ReadyState {
    db: DatabaseConnection,
    transport: Arc<ResendTransport>,
}

/// Readiness probe: checks the database connection and the mail transport
async fn ready(
    State(state): State<ReadyState>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    let ReadyState { db, transport } = state;
    let checks: Vec<(&str, HealthCheckFuture)> = vec![
        (
            "database",
            Box::pin(async move { check_health(&db).await.map_err(|e| e.to_string()) }),
        ),
        (
            "transport",
            Box::pin(async move { transport.health_check().await.map_err(|e| e.to_string()) }),
        ),
    ];

    run_health_checks(checks).await
}
