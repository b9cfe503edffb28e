use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::services::auth_service::AuthService;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub is_staff: bool,
}

/// Implémentation de FromRequest pour AuthUser
/// Actix-Web extrait automatiquement AuthUser du header "Authorization: Bearer <token>"
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| ApiError::Internal("AuthService not configured".to_string()))?;

    // 1. Extraire le header Authorization
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    // 2. Convertir le header en string
    let header = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 4. Vérifier le JWT (un refresh token n'ouvre pas l'accès aux routes)
    let claims = auth.jwt().verify(token).map_err(ApiError::Unauthorized)?;
    if !claims.is_access() {
        return Err(ApiError::Unauthorized("Token has wrong type".to_string()));
    }

    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.username,
        is_staff: claims.is_staff,
    })
}
