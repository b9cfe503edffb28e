// Données de test partagées (BD SQLite en mémoire, voir db::test_connection)

use chrono::Utc;
use sea_orm::*;

use crate::middleware::AuthUser;
use crate::models::{stream_platform, users, watchlist};
use crate::services::auth_service::AuthService;
use crate::services::mail::DynMailClient;
use crate::utils::jwt::JwtManager;
use crate::utils::password;
use crate::utils::reset_token::ResetTokenGenerator;

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const TEST_BASE_URL: &str = "http://localhost:8080";

pub fn test_auth_service(mailer: DynMailClient) -> AuthService {
    AuthService::new(
        JwtManager::new(b"test-jwt-secret", 300, 86_400),
        ResetTokenGenerator::new(b"test-jwt-secret", 3_600, 72),
        mailer,
        "noreply@example.com",
        TEST_BASE_URL,
    )
}

/// Utilisateur actif avec TEST_PASSWORD
pub async fn seed_user(db: &DatabaseConnection, email: &str, is_staff: bool) -> users::Model {
    let username = email.split('@').next().unwrap_or(email).to_string();
    users::ActiveModel {
        email: Set(email.to_string()),
        username: Set(username),
        password_hash: Set(password::hash_password(TEST_PASSWORD).unwrap()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        is_active: Set(true),
        is_staff: Set(is_staff),
        is_superuser: Set(false),
        last_login: Set(None),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_platform(db: &DatabaseConnection) -> stream_platform::Model {
    stream_platform::ActiveModel {
        name: Set("Netflix".to_string()),
        about: Set("Streaming service".to_string()),
        website: Set("https://www.netflix.com".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_title(db: &DatabaseConnection, platform_id: i32) -> watchlist::Model {
    watchlist::ActiveModel {
        title: Set("The Wire".to_string()),
        description: Set("Baltimore".to_string()),
        platform_id: Set(platform_id),
        active: Set(true),
        avg_rating: Set(0.0),
        number_rating: Set(0),
        rating_sum: Set(0),
        created: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn auth_user(user: &users::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        username: user.username.clone(),
        is_staff: user.is_staff,
    }
}

/// Header "Authorization" avec un access token valide pour `user`
pub fn bearer(auth: &AuthService, user: &users::Model) -> (&'static str, String) {
    let pair = auth
        .jwt()
        .issue_pair(user.id, &user.username, user.is_staff)
        .unwrap();
    ("Authorization", format!("Bearer {}", pair.access))
}

/// Service d'auth prêt pour App::app_data + le client mail qui enregistre les envois
pub fn test_auth_data() -> (
    actix_web::web::Data<AuthService>,
    std::sync::Arc<crate::services::mail::RecordingMailClient>,
) {
    let mailer = std::sync::Arc::new(crate::services::mail::RecordingMailClient::default());
    let auth = actix_web::web::Data::new(test_auth_service(mailer.clone()));
    (auth, mailer)
}

/// App complète (toutes les routes) sur la BD et le service d'auth donnés
macro_rules! test_app {
    ($db:expr, $auth:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data($auth.clone())
                .configure(crate::routes::configure_routes),
        )
        .await
    };
}

pub(crate) use test_app;
