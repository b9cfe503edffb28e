mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_support;

use std::io;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::auth_service::AuthService;
use crate::services::mail::create_mail_client;
use crate::utils::jwt::JwtManager;
use crate::utils::reset_token::ResetTokenGenerator;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().map_err(io::Error::other)?;

    info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    if config.auto_create_schema {
        db::create_schema(&db).await.map_err(io::Error::other)?;
        info!("schema created");
    }

    let secret = config.jwt_secret.as_bytes();
    let mailer = create_mail_client(config.smtp.as_ref()).map_err(io::Error::other)?;
    let auth = web::Data::new(AuthService::new(
        JwtManager::new(secret, config.access_token_ttl_secs, config.refresh_token_ttl_secs),
        ResetTokenGenerator::new(secret, config.reset_granularity_secs, config.reset_max_steps),
        mailer,
        config.mail_from.clone(),
        config.public_base_url.clone(),
    ));
    let db = web::Data::new(db);

    info!(host = %config.host, port = config.port, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .app_data(db.clone())
            .app_data(auth.clone())
            .configure(routes::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
