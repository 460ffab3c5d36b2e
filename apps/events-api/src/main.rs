use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.url());

    // Connect to MongoDB with retry
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    // Get the database
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Initialize indexes
    api::events::init_indexes(&db).await?;

    // Initialize the application state
    let state = AppState {
        config,
        mongo_client,
        db,
    };

    // Start the status sweeper on its own schedule
    let sweeper = api::events::sweeper(&state);
    let sweeper_handle = sweeper
        .start(&state.config.sweep_cron)
        .await
        .map_err(|e| eyre::eyre!("Failed to start status sweeper: {}", e))?;

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    let AppState {
        config,
        mongo_client,
        db: _,
    } = state;

    // Merge health endpoints
    let app = router.merge(health_router(config.app));

    info!("Starting events API with production-ready shutdown (30s timeout)");

    // Production-ready server with graceful shutdown
    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: stopping sweeper and closing MongoDB connections");
        if let Err(e) = sweeper_handle.shutdown().await {
            warn!("Sweeper shutdown reported an error: {}", e);
        }
        // MongoDB client closes automatically on drop
        drop(mongo_client);
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Events API shutdown complete");
    Ok(())
}
