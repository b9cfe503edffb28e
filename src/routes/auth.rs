use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    AccessResponse, LoginRequest, LoginResponse, PasswordResetConfirmRequest, PasswordResetRequest,
    RefreshRequest, RegisterRequest, TokenPairResponse, UserResponse,
};
use crate::services::auth_service::AuthService;

/// POST /signup - Créer un compte (PUBLIC)
#[post("/signup")]
pub async fn signup(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let user = auth.register(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// POST /login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let (user, tokens) = auth.login(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        email: user.email,
        tokens: TokenPairResponse {
            refresh: tokens.refresh,
            access: tokens.access,
        },
    }))
}

/// POST /auth/login - Paire de tokens seule (PUBLIC)
#[post("/auth/login")]
pub async fn obtain_token_pair(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let (_, tokens) = auth.login(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        refresh: tokens.refresh,
        access: tokens.access,
    }))
}

/// POST /auth/login/refresh - Nouveau token d'accès (PUBLIC)
#[post("/auth/login/refresh")]
pub async fn refresh_token(
    body: web::Json<RefreshRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let access = auth.refresh(db.get_ref(), &body.refresh).await?;
    Ok(HttpResponse::Ok().json(AccessResponse { access }))
}

/// POST /logout - Révoquer le refresh token (PROTÉGÉE)
#[post("/logout")]
pub async fn logout(
    _auth_user: AuthUser,
    body: web::Json<RefreshRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    auth.logout(db.get_ref(), &body.refresh).await?;
    Ok(HttpResponse::ResetContent().finish())
}

/// POST /auth/password-reset - Envoyer le lien de reset (PUBLIC)
#[post("/auth/password-reset")]
pub async fn password_reset(
    body: web::Json<PasswordResetRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    auth.request_reset(db.get_ref(), &body.email).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "detail": "Password reset link sent." })))
}

/// POST /auth/password-reset-confirm/{uidb64}/{token} - Nouveau mot de passe (PUBLIC)
#[post("/auth/password-reset-confirm/{uidb64}/{token}")]
pub async fn password_reset_confirm(
    path: web::Path<(String, String)>,
    body: web::Json<PasswordResetConfirmRequest>,
    db: web::Data<DatabaseConnection>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let (uidb64, token) = path.into_inner();

    auth.confirm_reset(db.get_ref(), &uidb64, &token, &body.new_password).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "detail": "Password has been reset." })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(logout)
        .service(obtain_token_pair)
        .service(refresh_token)
        .service(password_reset)
        .service(password_reset_confirm);
}
