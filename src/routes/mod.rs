pub mod auth;
pub mod health;
pub mod platforms;
pub mod reviews;
pub mod users;
pub mod watchlist;

use actix_web::web;

use crate::errors::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Corps JSON ou paramètre de chemin illisible: même format d'erreur que le reste de l'API
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::Validation(err.to_string()).into()
    }));

    cfg.service(health::health_check)
        .service(health::homepage)
        .configure(auth::auth_routes)
        .configure(users::user_routes)
        .configure(watchlist::watchlist_routes)
        // /stream/review/{id} et /stream/{id}/review avant /stream/{id}
        .configure(reviews::review_routes)
        .configure(platforms::platform_routes);
}
