//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_files::Files;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod test_support;

use config::{AppConfig, UPLOADS_PATH};
use middleware::cors::cors;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry_config = TelemetryConfig::from_env();
    init_telemetry(&telemetry_config);

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let state = AppState::new(&config).await?;

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    tracing::info!(
        "Starting {} on {}:{}",
        telemetry_config.service_name,
        config.host,
        config.port
    );

    let cors_origin = config.cors_origin.clone();
    let upload_dir = config.upload_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_origin))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .service(Files::new(UPLOADS_PATH, upload_dir.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
