//! Backoffice API Server
//!
//! Main entry point for the entitlement back-office service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use backoffice_api::{AppState, create_router};
use backoffice_core::entitlement::TierModuleMap;
use backoffice_core::tier::PlanTier;
use backoffice_db::{CatalogRepository, connect_with};
use backoffice_shared::{AppConfig, EmailService, JwtService, LogNotifier, Notifier};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "backoffice=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    PlanTier::validate_ranks().context("Tier order is inconsistent")?;
    let tier_map = TierModuleMap::from_config(&config.entitlement)
        .context("Invalid [entitlement] configuration")?;

    let db = connect_with(&config.database.url, config.database.max_connections).await?;
    info!("Connected to database");

    let report = CatalogRepository::new(db.clone())
        .validate_catalog(&tier_map)
        .await
        .context("Plan catalog failed validation")?;
    info!(
        plans = report.plan_count,
        tiers = ?report.tiers,
        unmatched_module_types = report.unmatched_module_types.len(),
        "Plan catalog validated"
    );

    let notifier: Arc<dyn Notifier> = if config.email.enabled {
        info!(
            smtp_host = %config.email.smtp_host,
            smtp_port = %config.email.smtp_port,
            "Email notifications enabled"
        );
        Arc::new(EmailService::new(config.email.clone()))
    } else {
        warn!("Email disabled; notifications will only be logged");
        Arc::new(LogNotifier)
    };

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
        notifier,
        tier_map: Arc::new(tier_map),
    };

    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
