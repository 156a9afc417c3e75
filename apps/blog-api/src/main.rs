use axum_helpers::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment, Some(config.log_file.as_path()));

    info!("Connecting to MongoDB at {}", config.mongodb.url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());
    info!("Connected to MongoDB database: {}", config.mongodb.database());

    domain_blogs::init_collection(&db)
        .await
        .map_err(|e| eyre::eyre!("collection init failed: {e}"))?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let api_routes = api::routes(&state);
    let router = create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::health::router(state.clone()));

    info!(
        "Starting blog API on {} ({:?})",
        state.config.server.address(),
        state.config.environment
    );
    create_app(app, &state.config.server).await?;

    info!("Blog API shutdown complete");
    Ok(())
}
