mod config;
mod db;
mod middleware;
mod models;
mod permissions;
mod routes;
mod services;
mod utils;
mod validators;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    if config.debug {
        tracing::warn!("debug mode enabled");
    }
    if let Some(host) = &config.email.host {
        tracing::info!(
            port = config.email.port,
            tls = config.email.use_tls,
            user = config.email.user.as_deref(),
            has_password = config.email.password.is_some(),
            "email transport configured: {}",
            host
        );
    }
    if config.stripe_api_key.is_some() {
        tracing::debug!("stripe api key loaded");
    }

    tracing::info!("connecting to database...");
    // Arc because DatabaseConnection is only Clone without the mock feature
    let db = Arc::new(
        db::establish_connection(&config.database_url)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()))?,
    );
    tracing::info!("database connected");

    let notifier = services::notifier::Notifier::start(db.clone());
    services::housekeeping::spawn(db.clone(), config.check_interval_secs);

    let bind_addr = (config.host.clone(), config.port);
    tracing::info!("starting server on http://{}:{}", bind_addr.0, bind_addr.1);

    let app_config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(db.clone()))
            .app_data(app_config.clone())
            .app_data(web::Data::new(notifier.clone()))
            .configure(routes::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
