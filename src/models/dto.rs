// Requêtes et réponses de l'API
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{review, stream_platform, users, watchlist};

// ---------------------------------------------------------------- catalogue

#[derive(Debug, Deserialize, Validate)]
pub struct PlatformRequest {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[validate(length(max = 150))]
    pub about: String,
    #[validate(url, length(max = 100))]
    pub website: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WatchlistRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(max = 200))]
    pub description: String,
    pub platform: i32,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlatformDetail {
    #[serde(flatten)]
    pub platform: stream_platform::Model,
    pub watchlist: Vec<watchlist::Model>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistDetail {
    #[serde(flatten)]
    pub watchlist: watchlist::Model,
    pub reviews: Vec<review::Model>,
}

// ------------------------------------------------------------------ reviews

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 200))]
    pub description: String,
    pub active: Option<bool>,
}

// --------------------------------------------------------------------- auth

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub tokens: TokenPairResponse,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
        }
    }
}

/// Politique de mot de passe: au moins 8 caractères, pas uniquement des chiffres
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        let mut err = ValidationError::new("password_too_short");
        err.message = Some("This password is too short. It must contain at least 8 characters.".into());
        return Err(err);
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("password_entirely_numeric");
        err.message = Some("This password is entirely numeric.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_rating_bounds() {
        let ok = ReviewRequest { rating: 5, description: "great".into(), active: None };
        assert!(ok.validate().is_ok());

        let zero = ReviewRequest { rating: 0, ..ok.clone() };
        assert!(zero.validate().is_err());

        let six = ReviewRequest { rating: 6, ..ok.clone() };
        assert!(six.validate().is_err());
    }

    #[test]
    fn test_review_description_max_length() {
        let at_limit = ReviewRequest { rating: 3, description: "a".repeat(200), active: None };
        assert!(at_limit.validate().is_ok());

        let too_long = ReviewRequest { rating: 3, description: "a".repeat(201), active: None };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("12345678901").is_err());
        assert!(validate_password_strength("correct horse").is_ok());
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let request = RegisterRequest {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "sufficiently-long".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
