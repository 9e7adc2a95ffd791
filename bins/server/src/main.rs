//! Veritax API Server
//!
//! Main entry point for the Veritax document service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veritax_api::{AppState, create_router};
use veritax_core::storage::{StorageConfig, StorageProvider, StorageService};
use veritax_db::connect;
use veritax_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veritax=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expiry_secs: config.jwt.access_token_expiry_secs,
    });

    // Create storage gateway when configured
    let storage = build_storage(&config);

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the object storage gateway from configuration.
///
/// Absent or invalid settings leave the server running without storage;
/// uploads are then rejected until storage is configured.
fn build_storage(config: &AppConfig) -> Option<Arc<StorageService>> {
    let Some(settings) = &config.storage else {
        warn!("Object storage not configured, uploads will be rejected");
        return None;
    };

    let provider = StorageProvider::s3(
        settings.bucket.clone(),
        settings.region.clone(),
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        settings.endpoint.clone(),
    );
    let storage_config = StorageConfig::new(provider).with_presign_ttl(settings.presign_ttl_secs);

    match StorageService::from_config(storage_config) {
        Ok(service) => {
            info!(
                provider = service.provider_name(),
                bucket = %settings.bucket,
                "Object storage configured"
            );
            Some(Arc::new(service))
        }
        Err(error) => {
            warn!(%error, "Failed to initialize object storage, uploads will be rejected");
            None
        }
    }
}
