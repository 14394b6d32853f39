mod auth;
mod config;
mod doc;
mod dtos;
mod error;
mod extract;
mod report;
mod routes;
mod state;
mod utils;

use anyhow::Context;
use config::Config;
use database::db::create_connection;
use log::info;
use migration::{Migrator, MigratorTrait};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utils::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::load().context("Invalid configuration")?;

    let db = create_connection(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    if config.run_migrations {
        info!("Running pending migrations");
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
    }

    let bind_address = config.bind_address.clone();
    let state = AppState::new(db, config).context("Invalid JWT_SECRET")?;
    let app = routes::router(state)
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Listening on http://{bind_address} (docs at /api/docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
